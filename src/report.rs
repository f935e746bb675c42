//! Report rendering
//!
//! Pure functions from a [`CostBreakdown`] to text, markdown, or JSON. All
//! three formats carry every priced resource, every unknown resource, and
//! the total. Rendering the same breakdown twice yields identical output.
//!
//! The boxed console table is a cosmetic variant for interactive terminal
//! use; long values are elided there to keep rows readable.

use crate::calculator::CostBreakdown;
use crate::error::{ConfigError, Result};
use crate::utils::{details_inline, format_usd, truncate_with_ellipsis};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::fmt;
use std::str::FromStr;

const MAX_CELL_WIDTH: usize = 60;

/// Output format for cost reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Text => "text",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Json => "json",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ReportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "markdown" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            other => Err(ConfigError::InvalidValue {
                field: "output_format".to_string(),
                reason: format!("expected text, markdown or json, got '{}'", other),
            }),
        }
    }
}

/// Format the cost breakdown into a report string.
pub fn format_report(breakdown: &CostBreakdown, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(text_report(breakdown)),
        ReportFormat::Markdown => Ok(markdown_report(breakdown)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(breakdown)?),
    }
}

fn text_report(breakdown: &CostBreakdown) -> String {
    let mut lines = vec![
        "Azure Resource Cost Estimation Report".to_string(),
        "=".repeat(35),
        String::new(),
    ];

    lines.push("Resource Costs:".to_string());
    lines.push("-".repeat(15));
    for resource in &breakdown.resources {
        lines.push(format!(
            "{}: {}/month",
            resource.address,
            format_usd(resource.monthly_cost)
        ));
        for (key, value) in &resource.details {
            lines.push(format!("  {}: {}", key, value));
        }
        lines.push(String::new());
    }

    if !breakdown.unknown_costs.is_empty() {
        lines.push("Resources with Unknown Costs:".to_string());
        lines.push("-".repeat(28));
        for address in &breakdown.unknown_costs {
            lines.push(format!("- {}", address));
        }
        lines.push(String::new());
    }

    lines.push("=".repeat(35));
    lines.push(format!(
        "Total Estimated Monthly Cost: ${:.2}",
        breakdown.total_monthly_cost
    ));

    if !breakdown.unknown_costs.is_empty() {
        lines.push("(Note: Some resource costs could not be determined)".to_string());
    }

    lines.join("\n")
}

fn markdown_report(breakdown: &CostBreakdown) -> String {
    let mut lines = vec![
        "# Azure Resource Cost Estimation Report".to_string(),
        String::new(),
        "## Resource Costs".to_string(),
        String::new(),
        "| Resource | Type | Monthly Cost | Details |".to_string(),
        "|----------|------|--------------|----------|".to_string(),
    ];

    for resource in &breakdown.resources {
        let details = details_inline(&resource.details);
        lines.push(format!(
            "| {} | {} | {} | {} |",
            resource.address,
            resource.resource_type,
            format_usd(resource.monthly_cost),
            details
        ));
    }
    lines.push(String::new());

    if !breakdown.unknown_costs.is_empty() {
        lines.push("## Resources with Unknown Costs".to_string());
        lines.push(String::new());
        for address in &breakdown.unknown_costs {
            lines.push(format!("* {}", address));
        }
        lines.push(String::new());
    }

    lines.push("## Summary".to_string());
    lines.push(String::new());
    lines.push(format!(
        "**Total Estimated Monthly Cost:** ${:.2}",
        breakdown.total_monthly_cost
    ));

    if !breakdown.unknown_costs.is_empty() {
        lines.push(String::new());
        lines.push("*Note: Some resource costs could not be determined*".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Boxed table view for interactive terminal output.
///
/// Carries the same information as the text report plus the threshold
/// verdict; long cells are truncated for fixed-width display.
pub fn render_console_table(breakdown: &CostBreakdown, within_threshold: bool) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Resource", "Type", "Monthly Cost", "Details"]);

    for resource in &breakdown.resources {
        let details = details_inline(&resource.details);
        table.add_row(vec![
            truncate_with_ellipsis(&resource.address, MAX_CELL_WIDTH),
            truncate_with_ellipsis(&resource.resource_type, 25),
            format_usd(resource.monthly_cost),
            truncate_with_ellipsis(&details, MAX_CELL_WIDTH),
        ]);
    }
    for address in &breakdown.unknown_costs {
        table.add_row(vec![
            truncate_with_ellipsis(address, MAX_CELL_WIDTH),
            String::new(),
            "Unknown".to_string(),
            String::new(),
        ]);
    }

    let status = if within_threshold {
        "Cost is within threshold!"
    } else {
        "Warning: Cost exceeds threshold!"
    };

    format!(
        "Azure Resource Cost Estimation\n\n{}\n\nTotal Estimated Monthly Cost: ${:.2}\n{}",
        table, breakdown.total_monthly_cost, status
    )
}
