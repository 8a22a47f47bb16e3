//! Error types for backend selection and connection multiplexing.
//!
//! Configuration errors are fatal at construction time. Everything the
//! multiplexer returns at runtime is a [`MultiplexerError`] carrying the failed
//! operation and, where one exists, the backend identifier involved.

use crate::types::{BackendAddress, BackendId};
use thiserror::Error;

/// Invalid configuration, detected when a component is constructed or a config is loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid reputation config: {0}")]
    InvalidReputation(String),

    #[error("invalid selector config: {0}")]
    InvalidSelector(String),

    #[error("invalid multiplexer config: {0}")]
    InvalidMultiplexer(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors returned by [`WeightedCandidateSelector::select`].
///
/// [`WeightedCandidateSelector::select`]: crate::selector::WeightedCandidateSelector::select
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("cannot select from an empty candidate list")]
    EmptyInput,

    /// The summed candidate weight was infinite or NaN. Scores must be finite and non-negative.
    #[error("total candidate weight is not finite")]
    NonFiniteWeight,
}

/// Errors surfaced by a [`BackendRegistry`](crate::registry::BackendRegistry).
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("backend {0} is not known to the registry")]
    UnknownBackend(BackendId),

    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by connection clients and their factory.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("failed to connect to backend {backend_id} at {address}: {reason}")]
    Connect { backend_id: BackendId, address: BackendAddress, reason: String },

    #[error("failed to close client for backend {backend_id}: {reason}")]
    Close { backend_id: BackendId, reason: String },
}

/// Errors returned by [`BackendMultiplexer`](crate::multiplexer::BackendMultiplexer).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MultiplexerError {
    #[error("backend multiplexer is closed")]
    Closed,

    #[error("no eligible backends")]
    NoEligibleBackends,

    /// An outcome was reported for a backend never observed as eligible.
    #[error("backend {0} not found in reputation system")]
    UnknownBackend(BackendId),

    #[error("{operation}: {source}")]
    Registry {
        operation: &'static str,
        #[source]
        source: RegistryError,
    },

    #[error("resolve address for backend {backend_id}: {source}")]
    ResolveAddress {
        backend_id: BackendId,
        #[source]
        source: RegistryError,
    },

    #[error("create client for backend {backend_id}: {source}")]
    CreateClient {
        backend_id: BackendId,
        #[source]
        source: ClientError,
    },

    #[error("{operation}: timed out")]
    Timeout { operation: &'static str },

    #[error("select backend: {0}")]
    Select(#[from] SelectorError),

    #[error("close connection clients: {}", join_errors(.0))]
    CloseClients(Vec<ClientError>),
}

fn join_errors(errors: &[ClientError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
