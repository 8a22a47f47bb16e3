//! Concurrency tests for a shared `BackendMultiplexer`.
//!
//! These tests spawn many tasks against one `Arc<BackendMultiplexer>` and check that the
//! cache and reputation state stay consistent:
//! - Concurrent first requests build exactly one client per backend
//! - Concurrent outcome reports are never lost
//! - Close racing with selection leaves no live clients behind

use crate::mock_infrastructure::{multiplexer, registry_with_backends, MockClientFactory};
use dispersal_core::{MultiplexerConfig, MultiplexerError, ReputationConfig};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_create_one_client() {
    let factory = Arc::new(MockClientFactory::new());
    factory.set_create_delay(Duration::from_millis(20));
    let mux = Arc::new(multiplexer(
        Arc::new(registry_with_backends(&[1])),
        factory.clone(),
        MultiplexerConfig::default(),
    ));
    let now = Instant::now();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let mux = Arc::clone(&mux);
            tokio::spawn(async move { mux.get_connection_client(now, false).await })
        })
        .collect();

    for handle in handles {
        let client = handle.await.unwrap().unwrap();
        assert_eq!(client.config().backend_id, 1);
    }
    assert_eq!(factory.created_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reports_are_all_applied() {
    const REPORTS: i32 = 40;

    let mux = Arc::new(multiplexer(
        Arc::new(registry_with_backends(&[1])),
        Arc::new(MockClientFactory::new()),
        MultiplexerConfig::default(),
    ));
    let now = Instant::now();
    mux.get_connection_client(now, false).await.unwrap();

    let handles: Vec<_> = (0..REPORTS)
        .map(|_| {
            let mux = Arc::clone(&mux);
            tokio::spawn(async move { mux.report_outcome(1, true, now).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let config = ReputationConfig::default();
    let expected = 1.0
        - (1.0 - config.success_update_rate).powi(REPORTS) * (1.0 - config.forgiveness_target);
    let actual = mux.reputation_score(1).await.unwrap();
    assert!((actual - expected).abs() < 1e-12, "expected {expected}, got {actual}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_selection_and_reporting() {
    let factory = Arc::new(MockClientFactory::new());
    let mux = Arc::new(multiplexer(
        Arc::new(registry_with_backends(&[1, 2, 3])),
        factory.clone(),
        MultiplexerConfig::default(),
    ));
    let start = Instant::now();

    let handles: Vec<_> = (0..64u64)
        .map(|i| {
            let mux = Arc::clone(&mux);
            tokio::spawn(async move {
                let now = start + Duration::from_millis(i * 10);
                let client = mux.get_connection_client(now, false).await?;
                mux.report_outcome(client.config().backend_id, i % 3 != 0, now).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // at most one client per backend, none ever replaced
    assert!(factory.created_count() <= 3);
    assert!(factory.created().iter().all(|client| !client.is_closed()));
    for backend_id in 1..=3 {
        let score = mux.reputation_score(backend_id).await.unwrap();
        assert!((0.0..=1.0).contains(&score));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_racing_with_selection() {
    let factory = Arc::new(MockClientFactory::new());
    factory.set_create_delay(Duration::from_millis(5));
    let mux = Arc::new(multiplexer(
        Arc::new(registry_with_backends(&[1, 2])),
        factory.clone(),
        MultiplexerConfig::default(),
    ));
    let now = Instant::now();

    let selectors: Vec<_> = (0..8)
        .map(|_| {
            let mux = Arc::clone(&mux);
            tokio::spawn(async move { mux.get_connection_client(now, false).await })
        })
        .collect();
    let closer = {
        let mux = Arc::clone(&mux);
        tokio::spawn(async move { mux.close().await })
    };

    closer.await.unwrap().unwrap();
    for handle in selectors {
        match handle.await.unwrap() {
            Ok(_) | Err(MultiplexerError::Closed) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert!(mux.is_closed().await);
    assert_eq!(mux.cached_client_count().await, 0);
    for client in factory.created() {
        assert_eq!(client.close_calls(), 1);
    }
}
