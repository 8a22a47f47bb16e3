//! Instrumentation for backend selection.
//!
//! Recorded through the `metrics` facade; without an installed recorder every call is a
//! no-op. Backend identifiers are emitted as the `backend` label.
//!
//! | Metric | Kind | Recorded when |
//! |--------|------|---------------|
//! | `disperser_reputation_score` | gauge | every eligible backend, on each selection |
//! | `disperser_selected_total` | counter | a backend is chosen |
//! | `disperser_dispersal_outcomes_total` | counter | an outcome is reported (`outcome` label) |
//! | `disperser_clients_created_total` | counter | a connection client is built |
//! | `disperser_clients_evicted_total` | counter | a cached client is dropped after an address change |

use crate::types::BackendId;
use metrics::{counter, gauge};

pub fn record_reputation_score(backend_id: BackendId, score: f64) {
    gauge!("disperser_reputation_score", "backend" => backend_id.to_string()).set(score);
}

pub fn record_backend_selected(backend_id: BackendId) {
    counter!("disperser_selected_total", "backend" => backend_id.to_string()).increment(1);
}

pub fn record_dispersal_outcome(backend_id: BackendId, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "disperser_dispersal_outcomes_total",
        "backend" => backend_id.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_client_created(backend_id: BackendId) {
    counter!("disperser_clients_created_total", "backend" => backend_id.to_string()).increment(1);
}

pub fn record_client_evicted(backend_id: BackendId) {
    counter!("disperser_clients_evicted_total", "backend" => backend_id.to_string()).increment(1);
}
