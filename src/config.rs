//! Configuration file support
//!
//! Optional TOML config providing defaults for the CLI flags. Lookup order:
//! `.terracost.toml` in the current directory, then
//! `~/.config/terracost/config.toml`. A missing file yields the defaults;
//! CLI flags always win over config values.

use crate::error::ConfigError;
use crate::pricing::{AZURE_PRICES_URL, DEFAULT_CACHE_TTL};
use crate::report::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
    pub pricing: PricingConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Default output format: text, markdown or json
    pub output_format: String,
    /// Maximum allowed monthly cost in USD
    pub cost_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Retail prices API endpoint
    pub api_base_url: String,
    /// Cache window for remote price lookups, in seconds
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Slack incoming webhook URL
    pub slack_webhook: Option<String>,
}

/// Effective run settings after merging CLI flags over config values.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub format: ReportFormat,
    pub cost_threshold: Option<f64>,
    pub slack_webhook: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report: ReportConfig::default(),
            pricing: PricingConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_format: "text".to_string(),
            cost_threshold: None,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            api_base_url: AZURE_PRICES_URL.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

impl Config {
    /// Load the config from an explicit path or the default locations.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// location just yields `Config::default()`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.display().to_string()));
                }
                p.to_path_buf()
            }
            None => {
                let local = PathBuf::from(".terracost.toml");
                if local.exists() {
                    local
                } else {
                    match dirs::config_dir().map(|d| d.join("terracost").join("config.toml")) {
                        Some(p) if p.exists() => p,
                        _ => return Ok(Config::default()),
                    }
                }
            }
        };

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to read {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to parse {}: {}",
                config_path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge CLI flags over this config's values. Any flag that was given
    /// wins; absent flags fall back to the config.
    pub fn resolve_settings(
        &self,
        format: Option<ReportFormat>,
        cost_threshold: Option<f64>,
        slack_webhook: Option<String>,
    ) -> Result<RunSettings, ConfigError> {
        let format = match format {
            Some(format) => format,
            None => self.report.output_format.parse()?,
        };
        Ok(RunSettings {
            format,
            cost_threshold: cost_threshold.or(self.report.cost_threshold),
            slack_webhook: slack_webhook.or_else(|| self.notifications.slack_webhook.clone()),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.report
            .output_format
            .parse::<crate::report::ReportFormat>()
            .map_err(|_| ConfigError::InvalidValue {
                field: "report.output_format".to_string(),
                reason: format!(
                    "expected text, markdown or json, got '{}'",
                    self.report.output_format
                ),
            })?;

        if let Some(threshold) = self.report.cost_threshold {
            if threshold < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "report.cost_threshold".to_string(),
                    reason: "threshold must be non-negative".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report.output_format, "text");
        assert_eq!(config.pricing.cache_ttl_secs, 3600);
        assert!(config.notifications.slack_webhook.is_none());
    }

    #[test]
    fn test_partial_config_parses_with_defaults() {
        let config: Config =
            toml::from_str("[report]\ncost_threshold = 250.0\n").expect("parse config");
        assert_eq!(config.report.cost_threshold, Some(250.0));
        assert_eq!(config.report.output_format, "text");
        assert_eq!(config.pricing.api_base_url, AZURE_PRICES_URL);
    }

    #[test]
    fn test_invalid_format_rejected() {
        let config: Config =
            toml::from_str("[report]\noutput_format = \"yaml\"\n").expect("parse config");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config: Config =
            toml::from_str("[report]\ncost_threshold = -1.0\n").expect("parse config");
        assert!(config.validate().is_err());
    }

    fn config_with_values() -> Config {
        toml::from_str(
            "[report]\n\
             output_format = \"markdown\"\n\
             cost_threshold = 250.0\n\
             [notifications]\n\
             slack_webhook = \"https://hooks.slack.com/services/from-config\"\n",
        )
        .expect("parse config")
    }

    #[test]
    fn test_resolve_settings_flags_beat_config() {
        let config = config_with_values();
        let settings = config
            .resolve_settings(
                Some(ReportFormat::Json),
                Some(10.0),
                Some("https://hooks.slack.com/services/from-flag".to_string()),
            )
            .unwrap();
        assert_eq!(settings.format, ReportFormat::Json);
        assert_eq!(settings.cost_threshold, Some(10.0));
        assert_eq!(
            settings.slack_webhook.as_deref(),
            Some("https://hooks.slack.com/services/from-flag")
        );
    }

    #[test]
    fn test_resolve_settings_falls_back_to_config() {
        let config = config_with_values();
        let settings = config.resolve_settings(None, None, None).unwrap();
        assert_eq!(settings.format, ReportFormat::Markdown);
        assert_eq!(settings.cost_threshold, Some(250.0));
        assert_eq!(
            settings.slack_webhook.as_deref(),
            Some("https://hooks.slack.com/services/from-config")
        );
    }

    #[test]
    fn test_resolve_settings_defaults_when_nothing_set() {
        let settings = Config::default().resolve_settings(None, None, None).unwrap();
        assert_eq!(settings.format, ReportFormat::Text);
        assert_eq!(settings.cost_threshold, None);
        assert_eq!(settings.slack_webhook, None);
    }
}
