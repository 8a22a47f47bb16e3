//! Builder pattern for constructing `BackendMultiplexer` with flexible configuration.

use super::{BackendMultiplexer, MultiplexerConfig, SelectionStrategy};
use crate::{
    client::ClientFactory,
    errors::ConfigError,
    registry::BackendRegistry,
    reputation::ReputationConfig,
    selector::SelectorConfig,
    types::BackendId,
};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during multiplexer construction.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// `BackendRegistry` is required but was not provided
    #[error("`BackendRegistry` is required but was not provided")]
    MissingRegistry,

    /// `ClientFactory` is required but was not provided
    #[error("`ClientFactory` is required but was not provided")]
    MissingClientFactory,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Builder for constructing a [`BackendMultiplexer`].
///
/// # Examples
///
/// ```no_run
/// # use dispersal_core::{
/// #     client::ClientFactory, multiplexer::MultiplexerBuilder, registry::StaticBackendRegistry,
/// # };
/// # use std::sync::Arc;
/// # fn example(factory: Arc<dyn ClientFactory>) -> Result<(), Box<dyn std::error::Error>> {
/// let registry = Arc::new(StaticBackendRegistry::new());
///
/// let multiplexer = MultiplexerBuilder::new()
///     .registry(registry)
///     .client_factory(factory)
///     .additional_backends(vec![4])
///     .blacklisted_backends(vec![2])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MultiplexerBuilder {
    config: MultiplexerConfig,
    registry: Option<Arc<dyn BackendRegistry>>,
    factory: Option<Arc<dyn ClientFactory>>,
    seed: Option<u64>,
}

impl MultiplexerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: MultiplexerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn BackendRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn client_factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    #[must_use]
    pub fn additional_backends(mut self, backends: Vec<BackendId>) -> Self {
        self.config.additional_backends = backends;
        self
    }

    #[must_use]
    pub fn blacklisted_backends(mut self, backends: Vec<BackendId>) -> Self {
        self.config.blacklisted_backends = backends;
        self
    }

    #[must_use]
    pub fn reputation_config(mut self, config: ReputationConfig) -> Self {
        self.config.reputation = config;
        self
    }

    #[must_use]
    pub fn selector_config(mut self, config: SelectorConfig) -> Self {
        self.config.selector = config;
        self
    }

    #[must_use]
    pub fn selection_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.config.selection_strategy = strategy;
        self
    }

    #[must_use]
    pub fn use_secure_connection(mut self, secure: bool) -> Self {
        self.config.use_secure_connection = secure;
        self
    }

    /// Seeds the weighted selector's random source (default: seeded from the OS).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the `BackendMultiplexer`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::MissingRegistry`] or [`BuilderError::MissingClientFactory`] if a
    /// collaborator was not supplied, and [`BuilderError::Config`] if validation fails.
    pub fn build(self) -> Result<BackendMultiplexer, BuilderError> {
        let registry = self.registry.ok_or(BuilderError::MissingRegistry)?;
        let factory = self.factory.ok_or(BuilderError::MissingClientFactory)?;
        let rng = self.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        Ok(BackendMultiplexer::with_rng(self.config, registry, factory, rng)?)
    }
}
