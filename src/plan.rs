//! Terraform plan parsing
//!
//! Loads a Terraform plan JSON file and extracts the resources that are being
//! created or updated. Each change is normalized into a flat
//! [`ResourceConfig`] carrying the common Azure attributes plus the complete
//! raw `after` state for type-specific pricing rules.

use crate::error::{Result, TerracostError};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One planned resource, extracted from a `resource_changes` entry.
///
/// Common attributes are pulled out of the `change.after` map when present;
/// absent attributes stay `None` rather than being defaulted. The full raw
/// `after` map is retained for rules that need type-specific fields
/// (`os_disk`, `disk_size_gb`, `sku_name`, ...).
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub resource_type: String,
    pub name: String,
    pub address: String,
    pub location: Option<String>,
    pub sku: Option<String>,
    pub size: Option<String>,
    pub tier: Option<String>,
    pub capacity: Option<i64>,
    pub account_type: Option<String>,
    pub account_replication_type: Option<String>,
    pub raw_values: Map<String, Value>,
}

impl ResourceConfig {
    /// Non-empty string attribute from the raw `after` state.
    pub fn raw_str(&self, key: &str) -> Option<&str> {
        self.raw_values
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Resource location, preferring the raw `after` value over the
    /// extracted field.
    pub fn location(&self) -> Option<&str> {
        self.raw_str("location")
            .or(self.location.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Parser for Terraform plan JSON files.
///
/// `load()` must be called before any of the query methods; querying an
/// unloaded parser returns [`TerracostError::PlanNotLoaded`].
pub struct PlanParser {
    plan_file: PathBuf,
    plan_data: Option<Value>,
}

impl PlanParser {
    pub fn new(plan_file: impl Into<PathBuf>) -> Self {
        Self {
            plan_file: plan_file.into(),
            plan_data: None,
        }
    }

    /// Load and parse the plan file.
    ///
    /// Tolerates a UTF-8 byte-order-mark prefix (Terraform on Windows emits
    /// one), falling back to plain UTF-8.
    pub fn load(&mut self) -> Result<()> {
        let bytes = std::fs::read(&self.plan_file).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TerracostError::PlanNotFound {
                    path: self.plan_file.display().to_string(),
                }
            } else {
                TerracostError::Io(e)
            }
        })?;

        let text = String::from_utf8(bytes).map_err(|e| TerracostError::MalformedPlan {
            reason: format!("invalid UTF-8: {}", e),
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let data: Value =
            serde_json::from_str(text).map_err(|e| TerracostError::MalformedPlan {
                reason: e.to_string(),
            })?;

        self.plan_data = Some(data);
        Ok(())
    }

    fn plan_data(&self) -> Result<&Value> {
        self.plan_data.as_ref().ok_or(TerracostError::PlanNotLoaded)
    }

    /// Resources being created or updated, in plan order.
    ///
    /// Only changes whose action set is exactly `["create"]` or exactly
    /// `["update"]` are included; destroys, reads, no-ops and replacements
    /// are excluded.
    pub fn resource_changes(&self) -> Result<Vec<ResourceConfig>> {
        let data = self.plan_data()?;

        let mut changes = Vec::new();
        if let Some(entries) = data.get("resource_changes").and_then(Value::as_array) {
            for change in entries {
                if is_create_or_update(change.pointer("/change/actions")) {
                    changes.push(extract_resource_config(change));
                }
            }
        }
        Ok(changes)
    }

    /// Number of resources being created or updated.
    pub fn resource_count(&self) -> Result<usize> {
        Ok(self.resource_changes()?.len())
    }

    /// Distinct resource types among the created/updated resources.
    pub fn resource_types(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .resource_changes()?
            .into_iter()
            .map(|c| c.resource_type)
            .collect())
    }
}

fn is_create_or_update(actions: Option<&Value>) -> bool {
    match actions.and_then(Value::as_array) {
        Some(actions) if actions.len() == 1 => {
            matches!(actions[0].as_str(), Some("create") | Some("update"))
        }
        _ => false,
    }
}

fn extract_resource_config(change: &Value) -> ResourceConfig {
    let str_of = |v: &Value, key: &str| {
        v.get(key)
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_default()
    };

    // "after" values represent the planned state
    let after = change
        .pointer("/change/after")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let after_str = |key: &str| {
        after
            .get(key)
            .and_then(Value::as_str)
            .map(String::from)
    };

    ResourceConfig {
        resource_type: str_of(change, "type"),
        name: str_of(change, "name"),
        address: str_of(change, "address"),
        location: after_str("location"),
        sku: after_str("sku"),
        size: after_str("size"),
        tier: after_str("tier"),
        capacity: after.get("capacity").and_then(Value::as_i64),
        account_type: after_str("account_type"),
        account_replication_type: after_str("account_replication_type"),
        raw_values: after,
    }
}
