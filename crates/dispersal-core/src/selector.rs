//! Weighted-random candidate selection with low-performer filtering.
//!
//! [`WeightedCandidateSelector`] is generic over the candidate type; the caller supplies
//! a scoring function mapping each candidate to a non-negative score.
//!
//! # Algorithm
//!
//! 1. Rank a copy of the candidates by ascending score.
//! 2. Exclude candidates in the bottom `low_performer_fraction` (by count, rounded down)
//!    whose score is also below `score_threshold`. If that would exclude everyone, keep
//!    all candidates.
//! 3. Draw one survivor with probability proportional to `max(score, 0.001)`.
//!
//! Each call re-sorts and re-scans, which is fine for tens of candidates.

use crate::errors::{ConfigError, SelectorError};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selection weight floor, so zero-scored candidates keep a nonzero chance.
const MIN_WEIGHT: f64 = 0.001;

/// Configuration for low-performer filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Fraction of worst-ranked candidates considered for exclusion, in `[0, 1]` (default: 0.5)
    #[serde(default = "default_low_performer_fraction")]
    pub low_performer_fraction: f64,

    /// Candidates scoring at or above this are never excluded (default: 0.4)
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
}

fn default_low_performer_fraction() -> f64 {
    0.5
}
fn default_score_threshold() -> f64 {
    0.4
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            low_performer_fraction: default_low_performer_fraction(),
            score_threshold: default_score_threshold(),
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.low_performer_fraction) {
            return Err(ConfigError::InvalidSelector(format!(
                "low_performer_fraction must be in [0, 1], got {}",
                self.low_performer_fraction
            )));
        }
        if !(self.score_threshold >= 0.0 && self.score_threshold.is_finite()) {
            return Err(ConfigError::InvalidSelector(format!(
                "score_threshold must be a finite value >= 0, got {}",
                self.score_threshold
            )));
        }
        Ok(())
    }
}

type ScoreFn<T> = Box<dyn Fn(&T) -> f64 + Send + Sync>;

/// Picks one candidate at random, weighted by score, after dropping chronic low performers.
pub struct WeightedCandidateSelector<T, R = StdRng> {
    config: SelectorConfig,
    rng: R,
    score_fn: ScoreFn<T>,
}

impl<T> WeightedCandidateSelector<T, StdRng> {
    /// Creates a selector seeded from the operating system.
    pub fn from_os_rng<F>(config: SelectorConfig, score_fn: F) -> Result<Self, ConfigError>
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        Self::new(config, StdRng::from_os_rng(), score_fn)
    }
}

impl<T, R: Rng> WeightedCandidateSelector<T, R> {
    /// Creates a selector with an explicit random source.
    ///
    /// Scores returned by `score_fn` must be finite and non-negative.
    pub fn new<F>(config: SelectorConfig, rng: R, score_fn: F) -> Result<Self, ConfigError>
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self { config, rng, score_fn: Box::new(score_fn) })
    }

    #[must_use]
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Selects one candidate.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::EmptyInput`] if `candidates` is empty and
    /// [`SelectorError::NonFiniteWeight`] if the scores sum to a non-finite weight.
    pub fn select<'a>(&mut self, candidates: &'a [T]) -> Result<&'a T, SelectorError> {
        if candidates.is_empty() {
            return Err(SelectorError::EmptyInput);
        }

        let mut ranked: Vec<(&'a T, f64)> =
            candidates.iter().map(|candidate| (candidate, (self.score_fn)(candidate))).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let kept = self.filter_low_performers(&ranked);
        let pool = if kept.is_empty() {
            candidates.iter().map(|candidate| (candidate, (self.score_fn)(candidate))).collect()
        } else {
            kept
        };

        self.weighted_draw(&pool)
    }

    fn filter_low_performers<'a>(&self, ranked: &[(&'a T, f64)]) -> Vec<(&'a T, f64)> {
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let low_count = (ranked.len() as f64 * self.config.low_performer_fraction).floor() as usize;

        ranked
            .iter()
            .enumerate()
            .filter(|(index, (_, score))| {
                *index >= low_count || *score >= self.config.score_threshold
            })
            .map(|(_, entry)| *entry)
            .collect()
    }

    fn weighted_draw<'a>(&mut self, pool: &[(&'a T, f64)]) -> Result<&'a T, SelectorError> {
        let weight = |score: f64| score.max(MIN_WEIGHT);

        let total: f64 = pool.iter().map(|(_, score)| weight(*score)).sum();
        if !total.is_finite() {
            return Err(SelectorError::NonFiniteWeight);
        }

        let target = self.rng.random_range(0.0..total);
        let mut cumulative = 0.0;
        for (candidate, score) in pool {
            cumulative += weight(*score);
            if cumulative >= target {
                return Ok(*candidate);
            }
        }

        // unreachable in exact arithmetic; rounding can leave cumulative a hair short
        pool.last().map(|(candidate, _)| *candidate).ok_or(SelectorError::EmptyInput)
    }
}

impl<T, R> fmt::Debug for WeightedCandidateSelector<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedCandidateSelector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
