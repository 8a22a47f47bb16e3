//! Connection clients and the factory that builds them.
//!
//! The wire protocol, request signing, and commitment computation live behind these
//! traits. A concrete [`ClientFactory`] owns whatever signer, commitment engine, and
//! metrics sink its clients need; the multiplexer only hands it a [`ClientConfig`].

use crate::{
    errors::ClientError,
    types::{BackendAddress, BackendId},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Connection settings baked into a client at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub backend_id: BackendId,
    pub address: BackendAddress,
    pub use_secure_connection: bool,
    /// Number of underlying connections the client keeps open
    pub connection_count: u32,
    pub chain_id: Option<u64>,
}

/// A live connection to one backend.
pub trait ConnectionClient: Send + Sync + fmt::Debug {
    /// Configuration the client was created with.
    fn config(&self) -> &ClientConfig;

    /// Releases the client's connections. Safe to call more than once.
    fn close(&self) -> Result<(), ClientError>;
}

/// Builds connection clients.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn create(&self, config: ClientConfig) -> Result<Arc<dyn ConnectionClient>, ClientError>;
}
