//! Reputation-based backend selection with a cache of live connection clients.
//!
//! # Selection Flow
//!
//! ```text
//! get_connection_client(now, on_demand_only)
//!           │
//!           ▼
//! ┌──────────────────────┐
//! │ default ∪ additional │ ── new id ──► ReputationScore at forgiveness target
//! │   − blacklisted      │
//! │   ∩ on-demand?       │
//! └──────────┬───────────┘
//!            │ empty ──► NoEligibleBackends
//!            ▼
//! ┌──────────────────────┐
//! │ forgive(now) on all  │
//! │ eligible scores      │
//! └──────────┬───────────┘
//!            ▼
//!   HighestScore / Weighted
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │ resolve address      │ ── changed ──► close + evict cached client
//! └──────────┬───────────┘
//!            ▼
//!   cached client or ClientFactory::create
//! ```
//!
//! # Locking
//!
//! One `tokio::sync::Mutex` guards the client cache, the reputation map, and the closed
//! flag, and is held across registry and factory calls. Two concurrent selections are
//! fully serialized, so a client is never built twice for the same backend. State is only
//! mutated after the awaited calls succeed; dropping the future mid-call leaves the cache
//! untouched.

pub mod builder;
pub mod config;

pub use builder::{BuilderError, MultiplexerBuilder};
pub use config::{MultiplexerConfig, SelectionStrategy};

use crate::{
    client::{ClientConfig, ClientFactory, ConnectionClient},
    errors::{ConfigError, MultiplexerError, RegistryError},
    metrics,
    registry::BackendRegistry,
    reputation::{ReputationConfig, ReputationScore},
    selector::WeightedCandidateSelector,
    types::{BackendAddress, BackendId},
};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    collections::{HashMap, HashSet},
    future::Future,
    sync::Arc,
    time::Instant,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// An eligible backend and its score at selection time.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    backend_id: BackendId,
    score: f64,
}

struct MultiplexerState {
    /// At most one live client per backend.
    clients: HashMap<BackendId, Arc<dyn ConnectionClient>>,
    /// Grows monotonically; entries outlive blacklisting and address changes.
    reputations: HashMap<BackendId, ReputationScore>,
    selector: WeightedCandidateSelector<Candidate>,
    closed: bool,
}

impl MultiplexerState {
    fn forgive_all(
        &mut self,
        eligible: &[BackendId],
        now: Instant,
        config: ReputationConfig,
    ) -> Vec<Candidate> {
        eligible
            .iter()
            .map(|&backend_id| {
                let reputation = self
                    .reputations
                    .entry(backend_id)
                    .or_insert_with(|| ReputationScore::new(config));
                reputation.forgive(now);
                let score = reputation.score();
                metrics::record_reputation_score(backend_id, score);
                Candidate { backend_id, score }
            })
            .collect()
    }

    /// Drops the cached client for `backend_id` if it was built for a different address.
    ///
    /// Callers still holding the old client will see its in-flight calls fail.
    fn evict_stale_client(&mut self, backend_id: BackendId, address: &BackendAddress) {
        let stale = self
            .clients
            .get(&backend_id)
            .is_some_and(|client| client.config().address != *address);
        if !stale {
            return;
        }

        if let Some(client) = self.clients.remove(&backend_id) {
            warn!(
                backend_id,
                old_address = %client.config().address,
                new_address = %address,
                "backend address changed, evicting cached client"
            );
            if let Err(e) = client.close() {
                error!(backend_id, error = %e, "failed to close outdated connection client");
            }
            metrics::record_client_evicted(backend_id);
        }
    }
}

/// Supplies connection clients for the best available backend.
///
/// Safe to share across tasks behind an `Arc`.
pub struct BackendMultiplexer {
    config: MultiplexerConfig,
    registry: Arc<dyn BackendRegistry>,
    factory: Arc<dyn ClientFactory>,
    state: Mutex<MultiplexerState>,
}

impl BackendMultiplexer {
    /// Creates a multiplexer whose weighted selector is seeded from the operating system.
    ///
    /// Use [`MultiplexerBuilder`] for a deterministic seed.
    pub fn new(
        config: MultiplexerConfig,
        registry: Arc<dyn BackendRegistry>,
        factory: Arc<dyn ClientFactory>,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(config, registry, factory, StdRng::from_os_rng())
    }

    fn with_rng(
        config: MultiplexerConfig,
        registry: Arc<dyn BackendRegistry>,
        factory: Arc<dyn ClientFactory>,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let selector =
            WeightedCandidateSelector::new(config.selector, rng, |c: &Candidate| c.score)?;

        Ok(Self {
            config,
            registry,
            factory,
            state: Mutex::new(MultiplexerState {
                clients: HashMap::new(),
                reputations: HashMap::new(),
                selector,
                closed: false,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &MultiplexerConfig {
        &self.config
    }

    /// Returns a client for the best eligible backend, creating it if needed.
    ///
    /// Every eligible backend's reputation is forgiven up to `now` before the choice is
    /// made. When `on_demand_only` is set, only backends the registry lists as on-demand
    /// are considered.
    ///
    /// # Errors
    ///
    /// - [`MultiplexerError::Closed`] after [`close`](Self::close)
    /// - [`MultiplexerError::NoEligibleBackends`] if filtering leaves nothing
    /// - [`MultiplexerError::Registry`], [`MultiplexerError::ResolveAddress`], or
    ///   [`MultiplexerError::Timeout`] if a registry call fails
    /// - [`MultiplexerError::CreateClient`] if the factory fails; nothing is cached
    pub async fn get_connection_client(
        &self,
        now: Instant,
        on_demand_only: bool,
    ) -> Result<Arc<dyn ConnectionClient>, MultiplexerError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(MultiplexerError::Closed);
        }

        let eligible = self.eligible_backends(&mut state, on_demand_only).await?;
        if eligible.is_empty() {
            return Err(MultiplexerError::NoEligibleBackends);
        }

        let candidates = state.forgive_all(&eligible, now, self.config.reputation);
        let backend_id = self.choose(&mut state, &candidates)?;
        metrics::record_backend_selected(backend_id);

        let address = self.resolve_address(backend_id).await?;
        state.evict_stale_client(backend_id, &address);

        if let Some(client) = state.clients.get(&backend_id) {
            return Ok(Arc::clone(client));
        }

        let client_config = ClientConfig {
            backend_id,
            address,
            use_secure_connection: self.config.use_secure_connection,
            connection_count: self.config.connection_count,
            chain_id: self.config.chain_id,
        };
        let client = self
            .factory
            .create(client_config)
            .await
            .map_err(|source| MultiplexerError::CreateClient { backend_id, source })?;

        info!(backend_id, address = %client.config().address, "created connection client");
        metrics::record_client_created(backend_id);
        state.clients.insert(backend_id, Arc::clone(&client));
        Ok(client)
    }

    /// Feeds a dispersal outcome into the backend's reputation.
    ///
    /// The score is forgiven up to `now` before the outcome is applied, so idle time
    /// between the last selection and the report is credited first.
    ///
    /// # Errors
    ///
    /// Returns [`MultiplexerError::Closed`] after [`close`](Self::close), and
    /// [`MultiplexerError::UnknownBackend`] if the backend was never observed as eligible.
    pub async fn report_outcome(
        &self,
        backend_id: BackendId,
        success: bool,
        now: Instant,
    ) -> Result<(), MultiplexerError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(MultiplexerError::Closed);
        }

        let reputation = state
            .reputations
            .get_mut(&backend_id)
            .ok_or(MultiplexerError::UnknownBackend(backend_id))?;

        reputation.forgive(now);
        if success {
            reputation.success();
        } else {
            reputation.failure();
        }
        debug!(backend_id, success, score = reputation.score(), "recorded dispersal outcome");
        metrics::record_dispersal_outcome(backend_id, success);
        Ok(())
    }

    /// Closes every cached client. Idempotent; only the first call does any work.
    ///
    /// # Errors
    ///
    /// Returns [`MultiplexerError::CloseClients`] with every client close failure. The
    /// multiplexer is closed either way.
    pub async fn close(&self) -> Result<(), MultiplexerError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Ok(());
        }
        state.closed = true;

        let client_count = state.clients.len();
        let errors: Vec<_> = state
            .clients
            .drain()
            .filter_map(|(backend_id, client)| {
                client.close().err().inspect(|e| {
                    warn!(backend_id, error = %e, "failed to close connection client");
                })
            })
            .collect();

        info!(clients = client_count, failures = errors.len(), "backend multiplexer closed");
        if errors.is_empty() {
            Ok(())
        } else {
            Err(MultiplexerError::CloseClients(errors))
        }
    }

    /// Current reputation of a backend, if it has ever been eligible.
    pub async fn reputation_score(&self, backend_id: BackendId) -> Option<f64> {
        self.state.lock().await.reputations.get(&backend_id).map(ReputationScore::score)
    }

    pub async fn cached_client_count(&self) -> usize {
        self.state.lock().await.clients.len()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Computes `(default ∪ additional) − blacklisted`, intersected with the on-demand set
    /// when requested. Every identifier seen gets a reputation entry, blacklisted or not.
    async fn eligible_backends(
        &self,
        state: &mut MultiplexerState,
        on_demand_only: bool,
    ) -> Result<Vec<BackendId>, MultiplexerError> {
        const GET_DEFAULT: &str = "get default backends";
        let defaults = self
            .bounded(GET_DEFAULT, self.registry.get_default_backends())
            .await?
            .map_err(|source| MultiplexerError::Registry { operation: GET_DEFAULT, source })?;

        let mut seen = HashSet::new();
        let additional = self.config.additional_backends.iter().copied();
        let mut eligible = Vec::with_capacity(defaults.len() + additional.len());
        for backend_id in defaults.into_iter().chain(additional) {
            if !seen.insert(backend_id) {
                continue;
            }
            state
                .reputations
                .entry(backend_id)
                .or_insert_with(|| ReputationScore::new(self.config.reputation));
            if !self.config.is_blacklisted(backend_id) {
                eligible.push(backend_id);
            }
        }

        if on_demand_only {
            const GET_ON_DEMAND: &str = "get on-demand backends";
            let on_demand: HashSet<BackendId> = self
                .bounded(GET_ON_DEMAND, self.registry.get_on_demand_backends())
                .await?
                .map_err(|source| MultiplexerError::Registry { operation: GET_ON_DEMAND, source })?
                .into_iter()
                .collect();
            eligible.retain(|backend_id| on_demand.contains(backend_id));
        }

        debug!(eligible = ?eligible, on_demand_only, "computed eligible backends");
        Ok(eligible)
    }

    fn choose(
        &self,
        state: &mut MultiplexerState,
        candidates: &[Candidate],
    ) -> Result<BackendId, MultiplexerError> {
        let backend_id = match self.config.selection_strategy {
            SelectionStrategy::HighestScore => {
                highest_score(candidates).ok_or(MultiplexerError::NoEligibleBackends)?
            }
            SelectionStrategy::Weighted => state.selector.select(candidates)?.backend_id,
        };
        debug!(backend_id, strategy = ?self.config.selection_strategy, "selected backend");
        Ok(backend_id)
    }

    async fn resolve_address(
        &self,
        backend_id: BackendId,
    ) -> Result<BackendAddress, MultiplexerError> {
        self.bounded("get connection info", self.registry.get_connection_info(backend_id))
            .await?
            .map_err(|source| MultiplexerError::ResolveAddress { backend_id, source })
    }

    /// Applies the configured registry timeout to `call`.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, RegistryError>>,
    ) -> Result<Result<T, RegistryError>, MultiplexerError> {
        match self.config.registry_timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| MultiplexerError::Timeout { operation }),
            None => Ok(call.await),
        }
    }
}

/// Arg-max over scores; the earliest candidate wins ties.
fn highest_score(candidates: &[Candidate]) -> Option<BackendId> {
    candidates
        .iter()
        .fold(None::<&Candidate>, |best, candidate| match best {
            Some(best) if best.score >= candidate.score => Some(best),
            _ => Some(candidate),
        })
        .map(|candidate| candidate.backend_id)
}
