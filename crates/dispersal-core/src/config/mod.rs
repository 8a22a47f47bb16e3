//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: `Default` implementations and `#[serde(default)]` fields
//! 2. **Config file**: TOML file named by the `DISPERSAL_CONFIG` env var
//! 3. **Environment variables**: `DISPERSAL__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`MultiplexerConfig`]: backend sets, reputation dynamics, selection strategy
//! - [`LoggingConfig`]: log level and format
//!
//! # Example
//!
//! ```toml
//! [multiplexer]
//! additional_backends = [4]
//! blacklisted_backends = [2]
//! selection_strategy = "highest_score"
//! use_secure_connection = true
//!
//! [multiplexer.reputation]
//! failure_update_rate = 0.2
//! forgiveness_half_life_seconds = 600
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use crate::{errors::ConfigError, multiplexer::MultiplexerConfig};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level for this crate when `RUST_LOG` is unset. Defaults to `info`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`. Defaults to `pretty`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub multiplexer: MultiplexerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `DISPERSAL__` prefix override any value, using `__`
    /// between nested fields (e.g. `DISPERSAL__MULTIPLEXER__CONNECTION_COUNT=4`). A missing
    /// file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or the result fails validation.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("DISPERSAL").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `config/dispersal.toml`.
    ///
    /// The path can be overridden with the `DISPERSAL_CONFIG` environment variable.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("DISPERSAL_CONFIG")
            .unwrap_or_else(|_| "config/dispersal.toml".to_string());
        Self::from_file(&config_path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.multiplexer.validate()
    }
}
