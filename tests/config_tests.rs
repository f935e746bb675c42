//! Config file loading tests

use terracost::config::Config;
use terracost::error::ConfigError;
use terracost::ReportFormat;

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("terracost.toml");
    std::fs::write(&path, content).expect("write config file");
    path
}

#[test]
fn test_load_explicit_path_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[report]
output_format = "markdown"
cost_threshold = 500.0

[pricing]
api_base_url = "http://127.0.0.1:8080"
cache_ttl_secs = 60

[notifications]
slack_webhook = "https://hooks.slack.com/services/test"
"#,
    );

    let config = Config::load(Some(&path)).expect("load config");
    assert_eq!(config.report.output_format, "markdown");
    assert_eq!(config.report.cost_threshold, Some(500.0));
    assert_eq!(config.pricing.api_base_url, "http://127.0.0.1:8080");
    assert_eq!(config.pricing.cache_ttl_secs, 60);
    assert_eq!(
        config.notifications.slack_webhook.as_deref(),
        Some("https://hooks.slack.com/services/test")
    );
}

#[test]
fn test_load_missing_explicit_path_fails() {
    let err = Config::load(Some(std::path::Path::new("/nonexistent/terracost.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn test_load_invalid_toml_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[report\noutput_format = ");
    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_load_rejects_invalid_format_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[report]\noutput_format = \"yaml\"\n");
    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_cli_flag_overrides_loaded_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "[report]\noutput_format = \"markdown\"\ncost_threshold = 500.0\n",
    );

    let config = Config::load(Some(&path)).unwrap();
    let settings = config
        .resolve_settings(Some(ReportFormat::Json), Some(25.0), None)
        .unwrap();
    assert_eq!(settings.format, ReportFormat::Json);
    assert_eq!(settings.cost_threshold, Some(25.0));
}
