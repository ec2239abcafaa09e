//! Loads the declarative logging configuration from TOML.

use super::{ConfigError, LoggingConfig};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct RawConfig {
    logging: LoggingConfig,
}

impl LoggingConfig {
    /// Parse a configuration document of the form:
    ///
    /// ```toml
    /// [logging]
    /// default_provider = "forwarder"
    ///
    /// [[logging.providers]]
    /// name = "forwarder"
    /// kind = "composite"
    /// attributes = { provider1 = "memory" }
    ///
    /// [[logging.providers]]
    /// name = "memory"
    /// kind = "memory"
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(input)?;
        Ok(raw.logging)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_providers_in_declaration_order() {
        let config = LoggingConfig::from_toml_str(
            r#"
            [logging]
            default_provider = "forwarder"

            [[logging.providers]]
            name = "forwarder"
            kind = "composite"
            attributes = { provider1 = "memory", description = "Fan-out" }

            [[logging.providers]]
            name = "memory"
            kind = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_provider, "forwarder");
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].name, "forwarder");
        assert_eq!(config.providers[0].kind, "composite");
        assert_eq!(
            config.providers[0].attributes.get("provider1").map(String::as_str),
            Some("memory")
        );
        assert_eq!(config.providers[1].name, "memory");
        assert!(config.providers[1].attributes.is_empty());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let error = LoggingConfig::from_toml_str("[logging").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }
}
