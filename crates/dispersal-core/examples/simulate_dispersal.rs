//! Example: Simulated dispersal loop against three backends of varying reliability
//!
//! Loads `AppConfig` (file + `DISPERSAL__*` overrides), installs logging, and drives a
//! `BackendMultiplexer` with a fake clock. Backend 3 fails most requests and should lose
//! traffic within a few rounds, then regain a share once the failures stop and
//! forgiveness catches up. Odd rounds restrict selection to the on-demand set.
//!
//! Run with: cargo run --example simulate_dispersal

use anyhow::Result;
use async_trait::async_trait;
use dispersal_core::{
    config::AppConfig, logging::init_logging, BackendAddress, BackendId, ClientConfig,
    ClientError, ClientFactory, ConnectionClient, MultiplexerBuilder, StaticBackendRegistry,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::BTreeMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::info;

#[derive(Debug)]
struct SimulatedClient {
    config: ClientConfig,
}

impl ConnectionClient for SimulatedClient {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn close(&self) -> Result<(), ClientError> {
        Ok(())
    }
}

struct SimulatedFactory;

#[async_trait]
impl ClientFactory for SimulatedFactory {
    async fn create(&self, config: ClientConfig) -> Result<Arc<dyn ConnectionClient>, ClientError> {
        Ok(Arc::new(SimulatedClient { config }))
    }
}

fn success_rate(backend_id: BackendId, round: usize) -> f64 {
    match backend_id {
        3 if round < 2 => 0.1,
        2 => 0.9,
        _ => 0.99,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("logging setup failed: {e}"))?;

    let registry = Arc::new(StaticBackendRegistry::new());
    registry.set_default_backends(vec![1, 2, 3]);
    registry.set_on_demand_backends(vec![1, 3]);
    for backend_id in 1..=3 {
        let address = BackendAddress::new(format!("disperser-{backend_id}"), 32005);
        registry.set_address(backend_id, address);
    }

    let multiplexer = MultiplexerBuilder::new()
        .config(config.multiplexer)
        .registry(registry)
        .client_factory(Arc::new(SimulatedFactory))
        .seed(2024)
        .build()?;

    let mut rng = StdRng::seed_from_u64(7);
    let mut now = Instant::now();

    for round in 0..4 {
        // odd rounds only draw from the on-demand set, which excludes backend 2
        let on_demand_only = round % 2 == 1;
        let mut picks: BTreeMap<BackendId, usize> = BTreeMap::new();
        for _ in 0..250 {
            now += Duration::from_secs(1);
            let client = multiplexer.get_connection_client(now, on_demand_only).await?;
            let backend_id = client.config().backend_id;
            *picks.entry(backend_id).or_default() += 1;

            let success = rng.random_bool(success_rate(backend_id, round));
            multiplexer.report_outcome(backend_id, success, now).await?;
        }

        let mut scores = BTreeMap::new();
        for backend_id in 1..=3 {
            scores.insert(backend_id, multiplexer.reputation_score(backend_id).await);
        }
        info!(round, on_demand_only, ?picks, ?scores, "round complete");
    }

    multiplexer.close().await?;
    info!("simulation finished");
    Ok(())
}
