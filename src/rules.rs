//! Pricing rules
//!
//! Maps a Terraform resource type to the rule that computes its estimated
//! monthly cost. The registry is a closed enum with per-variant compute
//! logic; unrecognized types are a normal outcome (`None`), not an error.
//!
//! A rule returning `None` means "could not price" - the aggregator records
//! the resource as unknown and the run continues. A rule returning
//! `Some(0.0)` is a legitimate known cost (free resources exist).

use crate::plan::ResourceConfig;
use crate::pricing::PricingClient;
use serde_json::Value;
use tracing::{info, warn};

/// Average hours in a month, used to normalize hourly rates.
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Assumed OS disk size for VM estimates (GB).
const DEFAULT_OS_DISK_GB: u64 = 128;

/// Assumed storage account usage for estimates (GB).
const STORAGE_ESTIMATED_GB: f64 = 100.0;

/// Logic App estimate: standard connector executions per month and the
/// per-execution rate.
const LOGIC_APP_EXECUTIONS: f64 = 100_000.0;
const LOGIC_APP_RATE_PER_EXECUTION: f64 = 0.000125;

// Basic App Service Plan tiers, flat monthly
const APP_SERVICE_PLAN_PRICING: &[(&str, f64)] = &[
    ("B1", 54.75),
    ("B2", 109.50),
    ("B3", 218.99),
];

/// Cost-calculation rule for a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostRule {
    VirtualMachine,
    StorageAccount,
    ManagedDisk,
    /// Resource kinds with no direct billable unit.
    NoCharge,
    LogicAppWorkflow,
    AppServicePlan,
}

impl CostRule {
    /// Rule for a Terraform resource type, or `None` if the type is
    /// unrecognized.
    pub fn for_type(resource_type: &str) -> Option<CostRule> {
        match resource_type {
            "azurerm_virtual_machine"
            | "azurerm_windows_virtual_machine"
            | "azurerm_linux_virtual_machine" => Some(CostRule::VirtualMachine),
            "azurerm_storage_account" => Some(CostRule::StorageAccount),
            "azurerm_managed_disk" => Some(CostRule::ManagedDisk),
            "azurerm_network_interface"
            | "azurerm_virtual_network"
            | "azurerm_subnet"
            | "azurerm_resource_group"
            | "azurerm_logic_app_action_custom"
            | "azurerm_logic_app_trigger_custom" => Some(CostRule::NoCharge),
            "azurerm_logic_app_workflow" => Some(CostRule::LogicAppWorkflow),
            "azurerm_service_plan" | "azurerm_app_service_plan" => {
                Some(CostRule::AppServicePlan)
            }
            _ => None,
        }
    }

    /// Estimated monthly cost for the resource, or `None` if it cannot be
    /// priced.
    pub async fn compute(&self, config: &ResourceConfig, pricing: &PricingClient) -> Option<f64> {
        match self {
            CostRule::VirtualMachine => vm_cost(config, pricing).await,
            CostRule::StorageAccount => storage_account_cost(config, pricing).await,
            CostRule::ManagedDisk => managed_disk_cost(config, pricing).await,
            CostRule::NoCharge => {
                info!("{} has no direct cost", config.resource_type);
                Some(0.0)
            }
            CostRule::LogicAppWorkflow => {
                // Standard connector actions at an assumed execution volume;
                // built-in actions are free.
                let monthly = LOGIC_APP_EXECUTIONS * LOGIC_APP_RATE_PER_EXECUTION;
                info!(
                    "Logic App cost: ${:.2}/month (estimated {} executions)",
                    monthly, LOGIC_APP_EXECUTIONS
                );
                Some(monthly)
            }
            CostRule::AppServicePlan => app_service_plan_cost(config),
        }
    }
}

/// Monthly VM cost: hourly rate x 730, plus the OS disk when one is
/// declared. Fails as a whole if the base VM price cannot be resolved.
async fn vm_cost(config: &ResourceConfig, pricing: &PricingClient) -> Option<f64> {
    let (Some(size), Some(location)) = (config.raw_str("size"), config.location()) else {
        warn!(
            "Missing required VM parameters: size={:?}, location={:?}",
            config.raw_str("size"),
            config.location()
        );
        return None;
    };

    let Some(quote) = pricing.vm_price(size, location).await else {
        warn!("Could not determine base VM cost for size={}", size);
        return None;
    };
    let mut monthly_cost = quote.retail_price * HOURS_PER_MONTH;
    info!("Base VM cost: ${:.2}/month", monthly_cost);

    // os_disk is a list-of-one block in the plan
    let disk_type = config
        .raw_values
        .get("os_disk")
        .and_then(Value::as_array)
        .and_then(|blocks| blocks.first())
        .and_then(|disk| disk.get("storage_account_type"))
        .and_then(Value::as_str);

    if let Some(disk_type) = disk_type {
        match pricing
            .managed_disk_price(disk_type, DEFAULT_OS_DISK_GB, location)
            .await
        {
            Some(disk_quote) => {
                info!("OS disk cost: ${:.2}/month", disk_quote.retail_price);
                monthly_cost += disk_quote.retail_price;
            }
            None => warn!("Could not determine OS disk cost for type={}", disk_type),
        }
    }

    info!("Total VM cost: ${:.2}/month", monthly_cost);
    Some(monthly_cost)
}

/// Monthly storage account cost: per-GB rate for `{tier}_{replication}`
/// times an assumed 100 GB of usage.
async fn storage_account_cost(config: &ResourceConfig, pricing: &PricingClient) -> Option<f64> {
    let (Some(account_tier), Some(replication_type), Some(location)) = (
        config.raw_str("account_tier"),
        config.raw_str("account_replication_type"),
        config.location(),
    ) else {
        warn!(
            "Missing required storage parameters: tier={:?}, replication={:?}, location={:?}",
            config.raw_str("account_tier"),
            config.raw_str("account_replication_type"),
            config.location()
        );
        return None;
    };

    let account_type = format!("{}_{}", account_tier, replication_type);

    let Some(quote) = pricing.storage_price(&account_type, location).await else {
        warn!(
            "No pricing data found for storage type={}, location={}",
            account_type, location
        );
        return None;
    };

    let monthly_cost = quote.retail_price * STORAGE_ESTIMATED_GB;
    info!(
        "Storage cost: ${:.2}/month (estimated {}GB)",
        monthly_cost, STORAGE_ESTIMATED_GB
    );
    Some(monthly_cost)
}

/// Monthly managed disk cost: the tiered price is already a flat monthly
/// figure, returned verbatim.
async fn managed_disk_cost(config: &ResourceConfig, pricing: &PricingClient) -> Option<f64> {
    let storage_type = config.raw_str("storage_account_type");
    let disk_size_gb = disk_size_gb(config);
    let location = config.location();

    let (Some(storage_type), Some(size_gb), Some(location)) =
        (storage_type, disk_size_gb.filter(|&s| s > 0), location)
    else {
        warn!(
            "Missing required disk parameters: type={:?}, size={:?}, location={:?}",
            storage_type, disk_size_gb, location
        );
        return None;
    };

    let Some(quote) = pricing
        .managed_disk_price(storage_type, size_gb, location)
        .await
    else {
        warn!(
            "No pricing data found for disk type={}, size={}GB, location={}",
            storage_type, size_gb, location
        );
        return None;
    };

    info!("Managed disk cost: ${:.2}/month", quote.retail_price);
    Some(quote.retail_price)
}

fn disk_size_gb(config: &ResourceConfig) -> Option<u64> {
    match config.raw_values.get("disk_size_gb") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

/// Monthly App Service Plan cost from the fixed basic-tier table.
///
/// The sku is read from `sku_name` or from a nested `sku` block (list-of-one
/// or single object, `size` before `name`) depending on the resource
/// version. The table lookup is an explicit presence check, so a tier priced
/// at zero would still count as a known cost.
fn app_service_plan_cost(config: &ResourceConfig) -> Option<f64> {
    let sku = resolve_app_service_sku(config);

    let (Some(sku), Some(_location)) = (sku, config.location()) else {
        warn!(
            "Missing required App Service Plan parameters: sku={:?}, location={:?}",
            resolve_app_service_sku(config),
            config.location()
        );
        return None;
    };

    match APP_SERVICE_PLAN_PRICING
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&sku))
    {
        Some((_, monthly_cost)) => {
            info!("App Service Plan cost: ${:.2}/month", monthly_cost);
            Some(*monthly_cost)
        }
        None => {
            warn!("Could not determine App Service Plan cost for SKU={}", sku);
            None
        }
    }
}

fn resolve_app_service_sku(config: &ResourceConfig) -> Option<String> {
    if let Some(sku_name) = config.raw_str("sku_name") {
        return Some(sku_name.to_string());
    }

    let mut sku_info = config.raw_values.get("sku")?;
    if let Some(blocks) = sku_info.as_array() {
        sku_info = blocks.first()?;
    }
    let block = sku_info.as_object()?;
    block
        .get("size")
        .or_else(|| block.get("name"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
