//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read configuration from a TOML file without validating it.
///
/// Used when further overrides are applied before validation.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ProxyConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            [origin]
            base_url = "http://127.0.0.1:9000/data"

            [timeouts]
            request_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.origin.base_url, "http://127.0.0.1:9000/data");
        assert_eq!(config.timeouts.request_secs, 10);
        assert_eq!(config.timeouts.connect_secs, 5);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.origin.user_agent.starts_with("calendar-proxy/"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let (path, mut file) = temp_config_file("invalid.toml");
        writeln!(file, "[timeouts]\nrequest_secs = 0").unwrap();

        let err = load_config(&path).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {other}"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_config_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/calendar-proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    fn temp_config_file(name: &str) -> (std::path::PathBuf, fs::File) {
        let path = std::env::temp_dir().join(format!("calendar-proxy-{}-{name}", std::process::id()));
        let file = fs::File::create(&path).unwrap();
        (path, file)
    }
}
