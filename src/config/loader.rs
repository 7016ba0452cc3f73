//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse TOML configuration without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::Strategy;
    use std::io::Write;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.load_balancing.strategy, Strategy::RoundRobin);
        assert_eq!(config.discovery.service, "cats-api");
        assert!(config.backends.is_empty());
    }

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [load_balancing]
            strategy = "WRR"

            [discovery]
            enabled = false

            [[backends]]
            address = "http://10.0.0.1:8080"
            weight = 3

            [[backends]]
            address = "http://10.0.0.2:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.load_balancing.strategy, Strategy::WeightedRoundRobin);
        assert!(!config.discovery.enabled);
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.backends[0].weight, 3);
        assert_eq!(config.backends[1].weight, 1);
    }

    #[test]
    fn test_unknown_strategy_in_file_defaults() {
        let config = parse_config("[load_balancing]\nstrategy = \"fastest\"\n").unwrap();
        assert_eq!(config.load_balancing.strategy, Strategy::RoundRobin);
    }

    #[test]
    fn test_load_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[load_balancing]\nstrategy = \"iphash\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.load_balancing.strategy, Strategy::IpHash);
    }

    #[test]
    fn test_load_config_reports_validation_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nrequest_secs = 0").unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::Zero("timeouts.request_secs")]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
