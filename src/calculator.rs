//! Cost aggregation
//!
//! Runs every planned resource through its pricing rule, collects known
//! costs and unknowns, and produces a [`CostBreakdown`]. One resource
//! failing to price never aborts the run; the report is always produced.

use crate::error::Result;
use crate::plan::{PlanParser, ResourceConfig};
use crate::pricing::PricingClient;
use crate::rules::CostRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// One priced resource.
///
/// `monthly_cost` is `None` only for hand-built breakdowns; resources the
/// aggregator could not price go to `CostBreakdown::unknown_costs` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCost {
    pub address: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub monthly_cost: Option<f64>,
    pub details: BTreeMap<String, String>,
}

/// Aggregate result of pricing a plan.
///
/// `resources` preserves plan order; `unknown_costs` preserves encounter
/// order. Every analyzed resource appears in exactly one of the two.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub resources: Vec<ResourceCost>,
    pub total_monthly_cost: f64,
    pub unknown_costs: Vec<String>,
}

/// Calculator for Azure resource costs from Terraform plans.
pub struct CostCalculator {
    parser: PlanParser,
    pricing: PricingClient,
    cost_threshold: Option<f64>,
}

impl CostCalculator {
    pub fn new(plan_file: impl Into<PathBuf>) -> Self {
        Self::with_pricing_client(plan_file, PricingClient::new())
    }

    /// Calculator with an injected pricing client (alternate endpoint,
    /// custom cache TTL).
    pub fn with_pricing_client(plan_file: impl Into<PathBuf>, pricing: PricingClient) -> Self {
        Self {
            parser: PlanParser::new(plan_file),
            pricing,
            cost_threshold: None,
        }
    }

    /// Set the maximum allowed monthly cost in USD.
    pub fn set_cost_threshold(&mut self, threshold: f64) {
        self.cost_threshold = Some(threshold);
    }

    pub fn cost_threshold(&self) -> Option<f64> {
        self.cost_threshold
    }

    /// Load the plan and price every created/updated resource.
    ///
    /// A resource with no rule, or whose rule cannot price it, is recorded
    /// under `unknown_costs` and contributes nothing to the total. A cost of
    /// exactly zero is a known cost, not an unknown.
    pub async fn calculate_costs(&mut self) -> Result<CostBreakdown> {
        info!("Loading Terraform plan...");
        self.parser.load()?;

        let resource_changes = self.parser.resource_changes()?;
        info!(
            "Found {} resource changes to analyze",
            resource_changes.len()
        );

        let mut resources: Vec<ResourceCost> = Vec::new();
        let mut unknown_costs: Vec<String> = Vec::new();
        let mut total_cost = 0.0;

        for resource in &resource_changes {
            let Some(rule) = CostRule::for_type(&resource.resource_type) else {
                warn!(
                    "No cost rule available for resource type: {}",
                    resource.resource_type
                );
                unknown_costs.push(resource.address.clone());
                continue;
            };

            match rule.compute(resource, &self.pricing).await {
                Some(monthly_cost) => {
                    total_cost += monthly_cost;
                    resources.push(ResourceCost {
                        address: resource.address.clone(),
                        resource_type: resource.resource_type.clone(),
                        name: resource.name.clone(),
                        monthly_cost: Some(monthly_cost),
                        details: cost_details(resource),
                    });
                }
                None => {
                    warn!("Could not determine cost for resource: {}", resource.address);
                    unknown_costs.push(resource.address.clone());
                }
            }
        }

        Ok(CostBreakdown {
            resources,
            total_monthly_cost: total_cost,
            unknown_costs,
        })
    }

    /// Check the total against the configured threshold.
    ///
    /// Returns `true` if no threshold is set, or if the total is at or below
    /// it.
    pub fn validate_cost_threshold(&self, breakdown: &CostBreakdown) -> bool {
        match self.cost_threshold {
            None => true,
            Some(threshold) => breakdown.total_monthly_cost <= threshold,
        }
    }
}

/// Display details for cost reporting; absent fields are omitted.
fn cost_details(resource: &ResourceConfig) -> BTreeMap<String, String> {
    let mut details = BTreeMap::new();
    let mut insert = |key: &str, value: &Option<String>| {
        if let Some(v) = value {
            details.insert(key.to_string(), v.clone());
        }
    };
    insert("location", &resource.location);
    insert("size", &resource.size);
    insert("sku", &resource.sku);
    insert("tier", &resource.tier);
    details
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_details_omits_absent_fields() {
        let resource = ResourceConfig {
            resource_type: "azurerm_linux_virtual_machine".to_string(),
            name: "web".to_string(),
            address: "azurerm_linux_virtual_machine.web".to_string(),
            location: Some("eastus".to_string()),
            sku: None,
            size: Some("Standard_D2s_v3".to_string()),
            tier: None,
            capacity: None,
            account_type: None,
            account_replication_type: None,
            raw_values: serde_json::Map::new(),
        };
        let details = cost_details(&resource);
        assert_eq!(details.len(), 2);
        assert_eq!(details.get("location").map(String::as_str), Some("eastus"));
        assert_eq!(
            details.get("size").map(String::as_str),
            Some("Standard_D2s_v3")
        );
        assert!(!details.contains_key("sku"));
        assert!(!details.contains_key("tier"));
    }
}
