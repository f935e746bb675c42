use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use terracost::config::Config;
use terracost::error::Result;
use terracost::exit_codes::{codes, exit_code_for_error};
use terracost::{notify, report, CostCalculator, PricingClient, ReportFormat};

#[derive(Parser)]
#[command(name = "terracost")]
#[command(
    about = "Calculate estimated Azure costs from Terraform plans",
    long_about = "terracost estimates the monthly Azure spend implied by a Terraform plan.\n\nIt parses the plan's resource changes, prices each resource against static\ntables and the Azure Retail Prices API, and renders a cost report in text,\nmarkdown or JSON - optionally gated by a cost threshold and posted to Slack."
)]
#[command(version)]
struct Cli {
    /// Path to Terraform plan JSON file
    #[arg(long, default_value = "plan.json")]
    plan_file: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    output_format: Option<ReportFormat>,

    /// Maximum allowed monthly cost threshold in USD
    #[arg(long)]
    cost_threshold: Option<f64>,

    /// Write report to file instead of stdout
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Slack webhook URL for notifications
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    slack_webhook: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Suppress per-resource info chatter by default; --debug opens it up
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}", e);
            std::process::exit(exit_code_for_error(&e));
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = Config::load(cli.config.as_deref())?;

    // CLI flags win over config values
    let settings =
        config.resolve_settings(cli.output_format, cli.cost_threshold, cli.slack_webhook)?;
    let format = settings.format;
    let threshold = settings.cost_threshold;
    let webhook = settings.slack_webhook;

    let pricing = PricingClient::with_settings(
        config.pricing.api_base_url.clone(),
        Duration::from_secs(config.pricing.cache_ttl_secs),
    );
    let mut calculator = CostCalculator::with_pricing_client(&cli.plan_file, pricing);
    if let Some(threshold) = threshold {
        calculator.set_cost_threshold(threshold);
    }

    let breakdown = calculator.calculate_costs().await?;
    let within_threshold = calculator.validate_cost_threshold(&breakdown);
    let report_text = report::format_report(&breakdown, format)?;

    if let Some(path) = &cli.output_file {
        std::fs::write(path, &report_text)?;
        info!("Cost report written to {}", path.display());
    } else if format == ReportFormat::Text && std::io::stdout().is_terminal() {
        // Interactive terminals get the boxed table view
        println!(
            "{}",
            report::render_console_table(&breakdown, within_threshold)
        );
    } else {
        println!("{}", report_text);
    }

    if let Some(webhook) = webhook {
        // Slack renders markdown; failure is logged, never fatal
        let slack_report = report::format_report(&breakdown, ReportFormat::Markdown)?;
        if let Err(e) = notify::send_slack_notification(&webhook, &slack_report).await {
            error!("Failed to send Slack notification: {}", e);
        }
    }

    if !within_threshold {
        error!(
            "Total cost ${:.2} exceeds threshold ${:.2}",
            breakdown.total_monthly_cost,
            threshold.unwrap_or_default()
        );
        return Ok(codes::USER_ERROR);
    }

    Ok(codes::SUCCESS)
}
