use super::config::ReputationConfig;
use std::{f64::consts::LN_2, time::Instant};

/// Reliability estimate for a single backend.
///
/// Not internally synchronized. The owning multiplexer holds its lock around every
/// read and write.
#[derive(Debug, Clone)]
pub struct ReputationScore {
    config: ReputationConfig,
    score: f64,
    /// `None` until the first call to [`forgive`](Self::forgive).
    last_forgiveness_time: Option<Instant>,
}

impl ReputationScore {
    /// Creates a score starting at the configured forgiveness target.
    #[must_use]
    pub fn new(config: ReputationConfig) -> Self {
        Self { score: config.forgiveness_target, config, last_forgiveness_time: None }
    }

    /// Current reliability estimate.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Moves the score toward 1 by `success_update_rate`.
    pub fn success(&mut self) {
        let rate = self.config.success_update_rate;
        self.score = (1.0 - rate) * self.score + rate;
    }

    /// Moves the score toward 0 by `failure_update_rate`.
    pub fn failure(&mut self) {
        self.score *= 1.0 - self.config.failure_update_rate;
    }

    /// Pulls a below-target score toward the target based on time elapsed since the last
    /// recorded forgiveness.
    ///
    /// The first call only records `now`. A score at or above the target is left as is and
    /// keeps its old timestamp, so time spent healthy counts once the score drops. Any score
    /// is also left as is when `now` is not after the recorded time.
    pub fn forgive(&mut self, now: Instant) {
        let Some(last) = self.last_forgiveness_time else {
            self.last_forgiveness_time = Some(now);
            return;
        };

        let target = self.config.forgiveness_target;
        if self.score >= target {
            return;
        }

        let elapsed = match now.checked_duration_since(last) {
            Some(elapsed) if !elapsed.is_zero() => elapsed.as_secs_f64(),
            _ => return,
        };

        let decay_rate = LN_2 / self.config.forgiveness_half_life().as_secs_f64();
        // 1 - e^(-λt), computed via exp_m1 to keep precision for short intervals
        let fraction = -(-decay_rate * elapsed).exp_m1();

        self.score = (1.0 - fraction) * self.score + fraction * target;
        self.last_forgiveness_time = Some(now);
    }
}
