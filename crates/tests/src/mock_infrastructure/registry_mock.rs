//! Registry mock with switchable failures.

use async_trait::async_trait;
use dispersal_core::{
    BackendAddress, BackendId, BackendRegistry, RegistryError, StaticBackendRegistry,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Delegates to an inner [`StaticBackendRegistry`] unless a failure switch is set.
#[derive(Debug, Default)]
pub struct FlakyRegistry {
    pub inner: StaticBackendRegistry,
    fail_default: AtomicBool,
    fail_on_demand: AtomicBool,
    fail_connection_info: AtomicBool,
    on_demand_calls: AtomicUsize,
}

impl FlakyRegistry {
    #[must_use]
    pub fn new(inner: StaticBackendRegistry) -> Self {
        Self { inner, ..Self::default() }
    }

    pub fn set_fail_default(&self, fail: bool) {
        self.fail_default.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_on_demand(&self, fail: bool) {
        self.fail_on_demand.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_connection_info(&self, fail: bool) {
        self.fail_connection_info.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn on_demand_calls(&self) -> usize {
        self.on_demand_calls.load(Ordering::SeqCst)
    }
}

fn unavailable(operation: &str) -> RegistryError {
    RegistryError::Unavailable(format!("injected {operation} failure"))
}

#[async_trait]
impl BackendRegistry for FlakyRegistry {
    async fn get_default_backends(&self) -> Result<Vec<BackendId>, RegistryError> {
        if self.fail_default.load(Ordering::SeqCst) {
            return Err(unavailable("default backends"));
        }
        self.inner.get_default_backends().await
    }

    async fn get_on_demand_backends(&self) -> Result<Vec<BackendId>, RegistryError> {
        self.on_demand_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_demand.load(Ordering::SeqCst) {
            return Err(unavailable("on-demand backends"));
        }
        self.inner.get_on_demand_backends().await
    }

    async fn get_connection_info(
        &self,
        backend_id: BackendId,
    ) -> Result<BackendAddress, RegistryError> {
        if self.fail_connection_info.load(Ordering::SeqCst) {
            return Err(unavailable("connection info"));
        }
        self.inner.get_connection_info(backend_id).await
    }
}
