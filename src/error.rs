//! Error types for terracost
//!
//! There are two error types: `TerracostError` (main error enum) and
//! `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `TerracostError`.
//! The CLI keeps the structured type all the way to its boundary so that
//! `exit_codes::exit_code_for_error` can map each variant to a stable exit
//! code; errors are only displayed, never downcast.
//!
//! ## Fatal vs. Recovered
//!
//! Plan-level errors (`PlanNotFound`, `MalformedPlan`, `PlanNotLoaded`) are
//! fatal: the run cannot produce a breakdown without a plan. Pricing errors
//! are recovered inside `PricingClient` - a failed remote lookup marks the
//! resource as unknown and the run continues. `PricingUnavailable` therefore
//! only travels between `fetch_price` and the public lookup methods; it never
//! escapes the pricing module.
//!
//! Exceeding the cost threshold is not an error. It is a validation outcome
//! that the CLI maps to a non-zero exit code.

use thiserror::Error;

/// Main error type for terracost
#[derive(Error, Debug)]
pub enum TerracostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plan file not found: {path}")]
    PlanNotFound { path: String },

    #[error("Malformed plan: {reason}")]
    MalformedPlan { reason: String },

    #[error("Plan data not loaded. Call load() first")]
    PlanNotLoaded,

    #[error("Pricing lookup failed: {0}")]
    PricingUnavailable(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TerracostError>;
