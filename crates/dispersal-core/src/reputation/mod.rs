//! Per-backend reliability tracking.
//!
//! Each backend carries a [`ReputationScore`]: an exponential moving average of
//! dispersal outcomes that drifts back toward a neutral target while idle.
//!
//! # Forgiveness
//!
//! A score below [`ReputationConfig::forgiveness_target`] closes half of its remaining
//! gap to the target every `forgiveness_half_life_seconds`. Scores at or above the target
//! are never lowered by forgiveness, so a healthy backend keeps its lead.
//!
//! # Example Configuration
//!
//! ```toml
//! [multiplexer.reputation]
//! success_update_rate = 0.05
//! failure_update_rate = 0.2
//! forgiveness_half_life_seconds = 600
//! forgiveness_target = 0.5
//! ```

pub mod config;
pub mod score;

pub use config::ReputationConfig;
pub use score::ReputationScore;
