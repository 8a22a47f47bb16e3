//! # Dispersal Core
//!
//! Client-side routing layer for submitting blobs to a data-availability network through
//! one of several interchangeable disperser backends.
//!
//! This crate provides:
//!
//! - **[`reputation`]**: Per-backend reliability scores, an exponential moving average of
//!   dispersal outcomes with time-based forgiveness toward a neutral target.
//!
//! - **[`selector`]**: Generic weighted-random selection that filters chronic low performers.
//!
//! - **[`multiplexer`]**: Eligibility computation, reputation-based choice, and a cache of
//!   live connection clients that heals itself when a backend's address changes.
//!
//! - **[`registry`]** and **[`client`]**: The seams to the backend registry and the
//!   connection-client factory.
//!
//! - **[`config`]**, **[`logging`]**, **[`metrics`]**: Layered configuration, tracing setup,
//!   and instrumentation.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    BackendMultiplexer                     │
//! │  ┌────────────────┐  ┌──────────────────┐  ┌───────────┐  │
//! │  │  reputations   │  │ WeightedCandidate│  │  clients  │  │
//! │  │ (per backend)  │  │     Selector     │  │  (cache)  │  │
//! │  └────────────────┘  └──────────────────┘  └─────┬─────┘  │
//! └──────────┬─────────────────────────────────────────┼──────┘
//!            │                                         │
//!            ▼                                         ▼
//!   ┌─────────────────┐                       ┌────────────────┐
//!   │ BackendRegistry │                       │ ClientFactory  │
//!   └─────────────────┘                       └────────────────┘
//! ```
//!
//! Time is never read internally: every operation that decays reputation takes `now`
//! from the caller.

pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod multiplexer;
pub mod registry;
pub mod reputation;
pub mod selector;
pub mod types;

pub use client::{ClientConfig, ClientFactory, ConnectionClient};
pub use errors::{ClientError, ConfigError, MultiplexerError, RegistryError, SelectorError};
pub use multiplexer::{
    BackendMultiplexer, BuilderError, MultiplexerBuilder, MultiplexerConfig, SelectionStrategy,
};
pub use registry::{BackendRegistry, StaticBackendRegistry};
pub use reputation::{ReputationConfig, ReputationScore};
pub use selector::{SelectorConfig, WeightedCandidateSelector};
pub use types::{BackendAddress, BackendId};
