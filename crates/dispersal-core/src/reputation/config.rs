use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters for reputation updates and forgiveness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Weight given to a success event, in `[0, 1]` (default: 0.05)
    #[serde(default = "default_success_update_rate")]
    pub success_update_rate: f64,

    /// Weight given to a failure event, in `[0, 1]` (default: 0.2)
    #[serde(default = "default_failure_update_rate")]
    pub failure_update_rate: f64,

    /// Seconds for a below-target score to close half the gap to the target (default: 600)
    #[serde(default = "default_forgiveness_half_life_seconds")]
    pub forgiveness_half_life_seconds: u64,

    /// Score that forgiveness pulls toward, in `(0, 1]` (default: 0.5)
    #[serde(default = "default_forgiveness_target")]
    pub forgiveness_target: f64,
}

fn default_success_update_rate() -> f64 {
    0.05
}
fn default_failure_update_rate() -> f64 {
    0.2
}
fn default_forgiveness_half_life_seconds() -> u64 {
    600
}
fn default_forgiveness_target() -> f64 {
    0.5
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            success_update_rate: default_success_update_rate(),
            failure_update_rate: default_failure_update_rate(),
            forgiveness_half_life_seconds: default_forgiveness_half_life_seconds(),
            forgiveness_target: default_forgiveness_target(),
        }
    }
}

impl ReputationConfig {
    /// Returns the forgiveness half-life as a [`Duration`].
    #[must_use]
    pub fn forgiveness_half_life(&self) -> Duration {
        Duration::from_secs(self.forgiveness_half_life_seconds)
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.success_update_rate) {
            return Err(ConfigError::InvalidReputation(format!(
                "success_update_rate must be in [0, 1], got {}",
                self.success_update_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.failure_update_rate) {
            return Err(ConfigError::InvalidReputation(format!(
                "failure_update_rate must be in [0, 1], got {}",
                self.failure_update_rate
            )));
        }
        if self.forgiveness_half_life_seconds == 0 {
            return Err(ConfigError::InvalidReputation(
                "forgiveness_half_life_seconds must be greater than 0".to_string(),
            ));
        }
        if !(self.forgiveness_target > 0.0 && self.forgiveness_target <= 1.0) {
            return Err(ConfigError::InvalidReputation(format!(
                "forgiveness_target must be in (0, 1], got {}",
                self.forgiveness_target
            )));
        }
        Ok(())
    }
}
