//! Test Helper Functions and Utilities
//!
//! Common helpers for building registries and multiplexers.

use super::MockClientFactory;
use dispersal_core::{
    BackendAddress, BackendId, BackendMultiplexer, BackendRegistry, MultiplexerBuilder,
    MultiplexerConfig, StaticBackendRegistry,
};
use std::sync::Arc;

/// Port every test backend listens on.
pub const TEST_PORT: u16 = 32005;

/// Address a backend is registered at by [`registry_with_backends`].
#[must_use]
pub fn test_address(backend_id: BackendId) -> BackendAddress {
    BackendAddress::new(format!("disperser-{backend_id}.test"), TEST_PORT)
}

/// Registry whose default set is `backends`, each registered at [`test_address`].
#[must_use]
pub fn registry_with_backends(backends: &[BackendId]) -> StaticBackendRegistry {
    let registry = StaticBackendRegistry::new();
    registry.set_default_backends(backends.to_vec());
    for &backend_id in backends {
        registry.set_address(backend_id, test_address(backend_id));
    }
    registry
}

/// Builds a multiplexer with a fixed seed.
///
/// # Panics
///
/// Panics if `config` is invalid.
#[must_use]
pub fn multiplexer(
    registry: Arc<dyn BackendRegistry>,
    factory: Arc<MockClientFactory>,
    config: MultiplexerConfig,
) -> BackendMultiplexer {
    MultiplexerBuilder::new()
        .config(config)
        .registry(registry)
        .client_factory(factory)
        .seed(7)
        .build()
        .expect("valid multiplexer config")
}
