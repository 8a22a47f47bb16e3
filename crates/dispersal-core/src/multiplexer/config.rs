use crate::{
    errors::ConfigError, reputation::ReputationConfig, selector::SelectorConfig, types::BackendId,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the multiplexer picks among eligible backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Always the eligible backend with the strictly highest reputation.
    #[default]
    HighestScore,
    /// Weighted-random draw after low-performer filtering, spreading load across
    /// healthy backends.
    Weighted,
}

/// Static configuration for a [`BackendMultiplexer`](super::BackendMultiplexer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplexerConfig {
    /// Backends eligible in addition to the registry's default set
    #[serde(default)]
    pub additional_backends: Vec<BackendId>,

    /// Backends never selected, regardless of membership or reputation
    #[serde(default)]
    pub blacklisted_backends: Vec<BackendId>,

    #[serde(default)]
    pub reputation: ReputationConfig,

    /// Filtering and weighting for [`SelectionStrategy::Weighted`]
    #[serde(default)]
    pub selector: SelectorConfig,

    #[serde(default)]
    pub selection_strategy: SelectionStrategy,

    /// Forwarded to the client factory (default: true)
    #[serde(default = "default_use_secure_connection")]
    pub use_secure_connection: bool,

    /// Connections per client, forwarded to the client factory (default: 8)
    #[serde(default = "default_connection_count")]
    pub connection_count: u32,

    #[serde(default)]
    pub chain_id: Option<u64>,

    /// Upper bound on each registry call in milliseconds; 0 disables it (default: 5000)
    #[serde(default = "default_registry_timeout_ms")]
    pub registry_timeout_ms: u64,
}

fn default_use_secure_connection() -> bool {
    true
}
fn default_connection_count() -> u32 {
    8
}
fn default_registry_timeout_ms() -> u64 {
    5000
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self {
            additional_backends: Vec::new(),
            blacklisted_backends: Vec::new(),
            reputation: ReputationConfig::default(),
            selector: SelectorConfig::default(),
            selection_strategy: SelectionStrategy::default(),
            use_secure_connection: default_use_secure_connection(),
            connection_count: default_connection_count(),
            chain_id: None,
            registry_timeout_ms: default_registry_timeout_ms(),
        }
    }
}

impl MultiplexerConfig {
    /// Returns the registry call timeout, or `None` when disabled.
    #[must_use]
    pub fn registry_timeout(&self) -> Option<Duration> {
        (self.registry_timeout_ms > 0).then(|| Duration::from_millis(self.registry_timeout_ms))
    }

    #[must_use]
    pub fn is_blacklisted(&self, backend_id: BackendId) -> bool {
        self.blacklisted_backends.contains(&backend_id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reputation.validate()?;
        self.selector.validate()?;
        if self.connection_count == 0 {
            return Err(ConfigError::InvalidMultiplexer(
                "connection_count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
