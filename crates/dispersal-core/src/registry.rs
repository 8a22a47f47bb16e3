//! Backend registry: resolves backend identifiers to addresses and membership lists.
//!
//! The multiplexer consumes a [`BackendRegistry`]; production deployments back it with
//! an on-chain or service-discovery lookup. [`StaticBackendRegistry`] is an in-memory
//! implementation whose contents can be changed at runtime.

use crate::{
    errors::RegistryError,
    types::{BackendAddress, BackendId},
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

/// Source of backend membership and addresses.
///
/// Implementations are called with the multiplexer's lock held, so they should not call
/// back into the multiplexer.
#[async_trait]
pub trait BackendRegistry: Send + Sync {
    /// Backends eligible by default.
    async fn get_default_backends(&self) -> Result<Vec<BackendId>, RegistryError>;

    /// Backends that accept on-demand (pay-per-use) dispersals.
    async fn get_on_demand_backends(&self) -> Result<Vec<BackendId>, RegistryError>;

    /// Current network address of a backend.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownBackend`] if the identifier is not registered.
    async fn get_connection_info(
        &self,
        backend_id: BackendId,
    ) -> Result<BackendAddress, RegistryError>;
}

#[derive(Debug, Default)]
struct StaticRegistryState {
    default_backends: Vec<BackendId>,
    on_demand_backends: Vec<BackendId>,
    addresses: HashMap<BackendId, BackendAddress>,
}

/// In-memory registry.
#[derive(Debug, Default)]
pub struct StaticBackendRegistry {
    state: RwLock<StaticRegistryState>,
}

impl StaticBackendRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default backend set.
    pub fn set_default_backends(&self, backends: Vec<BackendId>) {
        debug!(count = backends.len(), "updated default backends");
        self.state.write().default_backends = backends;
    }

    /// Replaces the on-demand backend set.
    pub fn set_on_demand_backends(&self, backends: Vec<BackendId>) {
        debug!(count = backends.len(), "updated on-demand backends");
        self.state.write().on_demand_backends = backends;
    }

    /// Registers or moves a backend.
    pub fn set_address(&self, backend_id: BackendId, address: BackendAddress) {
        info!(backend_id, address = %address, "registered backend address");
        self.state.write().addresses.insert(backend_id, address);
    }

    /// Removes a backend from every list and forgets its address.
    ///
    /// Returns the address it had, if any.
    pub fn remove_backend(&self, backend_id: BackendId) -> Option<BackendAddress> {
        let mut state = self.state.write();
        state.default_backends.retain(|id| *id != backend_id);
        state.on_demand_backends.retain(|id| *id != backend_id);
        let removed = state.addresses.remove(&backend_id);
        if removed.is_some() {
            info!(backend_id, "removed backend from registry");
        }
        removed
    }
}

#[async_trait]
impl BackendRegistry for StaticBackendRegistry {
    async fn get_default_backends(&self) -> Result<Vec<BackendId>, RegistryError> {
        Ok(self.state.read().default_backends.clone())
    }

    async fn get_on_demand_backends(&self) -> Result<Vec<BackendId>, RegistryError> {
        Ok(self.state.read().on_demand_backends.clone())
    }

    async fn get_connection_info(
        &self,
        backend_id: BackendId,
    ) -> Result<BackendAddress, RegistryError> {
        self.state
            .read()
            .addresses
            .get(&backend_id)
            .cloned()
            .ok_or(RegistryError::UnknownBackend(backend_id))
    }
}
