//! Exit code standardization for terracost
//!
//! Provides consistent exit codes for different error types to enable
//! reliable programmatic error detection by CI pipelines and scripts.
//!
//! ## Exit Code Convention
//!
//! - `0` = Success (plan priced, total within threshold)
//! - `1` = User error (plan file missing, malformed plan, threshold exceeded)
//! - `2` = System error (network failure, I/O error)
//! - `3` = Configuration error (config parse error, invalid config value)

use crate::error::TerracostError;

/// Standard exit codes for terracost
pub mod codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// User error (bad input, threshold exceeded)
    pub const USER_ERROR: i32 = 1;
    /// System error (network, I/O)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a TerracostError to an appropriate exit code
pub fn exit_code_for_error(error: &TerracostError) -> i32 {
    use TerracostError::*;
    match error {
        // Configuration errors
        Config(_) => codes::CONFIG_ERROR,

        // User errors (bad plan input, misuse of the parser API)
        PlanNotFound { .. } => codes::USER_ERROR,
        MalformedPlan { .. } => codes::USER_ERROR,
        PlanNotLoaded => codes::USER_ERROR,

        // System errors (network, I/O, serialization)
        PricingUnavailable(_) => codes::SYSTEM_ERROR,
        Notification(_) => codes::SYSTEM_ERROR,
        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
    }
}
