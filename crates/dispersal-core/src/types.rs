//! Shared identifiers and addresses.
//!
//! A [`BackendId`] is the join key across the registry's membership lists, the
//! reputation map, and the connection-client cache.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical identifier of a disperser backend.
pub type BackendId = u32;

/// Network address of a backend as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendAddress {
    pub host: String,
    pub port: u16,
}

impl BackendAddress {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl fmt::Display for BackendAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
