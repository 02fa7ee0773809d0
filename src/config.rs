// src/config.rs
//! Registry configuration.
//!
//! Values are layered as:
//! 1. Built-in defaults
//! 2. Variables from a `.env` file in the working directory, if present
//! 3. Process environment variables prefixed with `VC_REGISTRY_`
//!
//! ## Environment Variables
//! - `VC_REGISTRY_DATA_DIR`: directory holding the table files (default: `./data`)
//! - `VC_REGISTRY_ISSUER_CAPACITY_BYTES`: byte budget of the issuer table
//! - `VC_REGISTRY_CREDENTIAL_CAPACITY_BYTES`: byte budget of the credential table
//! - `VC_REGISTRY_MAX_KEY_BYTES`: largest encoded key in either table
//! - `VC_REGISTRY_MAX_ISSUER_VALUE_BYTES`: largest encoded issuer entry value
//! - `VC_REGISTRY_MAX_CREDENTIAL_VALUE_BYTES`: largest encoded credential record

use crate::error::ConfigError;
use crate::storage::MapLimits;
use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "VC_REGISTRY";

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_MAX_KEY_BYTES: usize = 50;
pub const DEFAULT_MAX_ISSUER_VALUE_BYTES: usize = 100;
pub const DEFAULT_MAX_CREDENTIAL_VALUE_BYTES: usize = 5000;
pub const DEFAULT_ISSUER_CAPACITY_BYTES: usize = 64 * 1024;
pub const DEFAULT_CREDENTIAL_CAPACITY_BYTES: usize = 64 * 1024 * 1024;

/// Deployment settings for the two registry tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    pub data_dir: PathBuf,
    pub issuer_capacity_bytes: usize,
    pub credential_capacity_bytes: usize,
    pub max_key_bytes: usize,
    pub max_issuer_value_bytes: usize,
    pub max_credential_value_bytes: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            issuer_capacity_bytes: DEFAULT_ISSUER_CAPACITY_BYTES,
            credential_capacity_bytes: DEFAULT_CREDENTIAL_CAPACITY_BYTES,
            max_key_bytes: DEFAULT_MAX_KEY_BYTES,
            max_issuer_value_bytes: DEFAULT_MAX_ISSUER_VALUE_BYTES,
            max_credential_value_bytes: DEFAULT_MAX_CREDENTIAL_VALUE_BYTES,
        }
    }
}

impl RegistryConfig {
    /// Loads configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Layers `source` over the defaults.
    ///
    /// # Errors
    /// - `ConfigError::Load` if a value cannot be parsed
    /// - `ConfigError::Invalid` if a size setting is zero
    pub fn from_source(source: Environment) -> Result<Self, ConfigError> {
        let defaults = RegistryConfig::default();
        let settings = Config::builder()
            .set_default("data_dir", DEFAULT_DATA_DIR)?
            .set_default("issuer_capacity_bytes", defaults.issuer_capacity_bytes as i64)?
            .set_default(
                "credential_capacity_bytes",
                defaults.credential_capacity_bytes as i64,
            )?
            .set_default("max_key_bytes", defaults.max_key_bytes as i64)?
            .set_default("max_issuer_value_bytes", defaults.max_issuer_value_bytes as i64)?
            .set_default(
                "max_credential_value_bytes",
                defaults.max_credential_value_bytes as i64,
            )?
            .add_source(source)
            .build()?;

        let config: RegistryConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("issuer_capacity_bytes", self.issuer_capacity_bytes),
            ("credential_capacity_bytes", self.credential_capacity_bytes),
            ("max_key_bytes", self.max_key_bytes),
            ("max_issuer_value_bytes", self.max_issuer_value_bytes),
            ("max_credential_value_bytes", self.max_credential_value_bytes),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{} must be greater than zero", name)));
        }
        Ok(())
    }

    pub fn issuer_limits(&self) -> MapLimits {
        MapLimits::new(
            self.max_key_bytes,
            self.max_issuer_value_bytes,
            self.issuer_capacity_bytes,
        )
    }

    pub fn credential_limits(&self) -> MapLimits {
        MapLimits::new(
            self.max_key_bytes,
            self.max_credential_value_bytes,
            self.credential_capacity_bytes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(map))
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = RegistryConfig::from_source(source(&[])).unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.issuer_limits(), MapLimits::new(50, 100, 64 * 1024));
    }

    #[test]
    fn test_environment_overrides() {
        let config = RegistryConfig::from_source(source(&[
            ("VC_REGISTRY_DATA_DIR", "/var/lib/vc"),
            ("VC_REGISTRY_CREDENTIAL_CAPACITY_BYTES", "2048"),
            ("VC_REGISTRY_MAX_KEY_BYTES", "64"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/vc"));
        assert_eq!(config.credential_limits(), MapLimits::new(64, 5000, 2048));
        assert_eq!(config.issuer_capacity_bytes, DEFAULT_ISSUER_CAPACITY_BYTES);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = RegistryConfig::from_source(source(&[(
            "VC_REGISTRY_ISSUER_CAPACITY_BYTES",
            "0",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unparseable_value_is_rejected() {
        let result = RegistryConfig::from_source(source(&[("VC_REGISTRY_MAX_KEY_BYTES", "lots")]));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
