//! terracost library
//!
//! Core pipeline for estimating monthly Azure costs from a Terraform plan:
//! parse the plan, dispatch each resource to its pricing rule, aggregate
//! into a breakdown, render a report.

pub mod calculator;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod notify;
pub mod plan;
pub mod pricing;
pub mod report;
pub mod rules;
pub mod utils;

// Re-export commonly used types
pub use calculator::{CostBreakdown, CostCalculator, ResourceCost};
pub use plan::{PlanParser, ResourceConfig};
pub use pricing::{PriceQuote, PricingClient};
pub use report::ReportFormat;
pub use rules::CostRule;
