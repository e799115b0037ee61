//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{join_errors, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.rate_limit.max_calls, 100);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.audit.capacity, 1000);
        assert_eq!(config.performance.history_capacity, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[rate_limit]\nmax_calls = 5\nwindow_secs = 1\n\n[audit]\ncapacity = 10"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.rate_limit.max_calls, 5);
        assert_eq!(config.rate_limit.window_secs, 1);
        assert_eq!(config.audit.capacity, 10);
        assert_eq!(config.audit.top_blocked, 10);
    }

    #[test]
    fn test_semantic_errors_surface() {
        let err = parse_config("[audit]\ncapacity = 0").unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors[0].field, "audit.capacity"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[rate_limit\nmax_calls = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
