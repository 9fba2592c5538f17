//! Weighted discrete sampling over a finite value set.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no weights loaded")]
    Empty,
    #[error("total weight must be greater than zero")]
    ZeroTotalWeight,
}

/// Draws values proportionally to their integer weights.
///
/// Entries keep the order they were loaded in; that order decides which value
/// owns each slice of `[0, total)`. The random source is owned by the sampler
/// and consumed once per [`sample`](Self::sample).
#[derive(Debug, Clone)]
pub struct WeightedSampler<T, R = ChaCha20Rng> {
    entries: Vec<(T, u32)>,
    rng: R,
}

impl<T: Clone> WeightedSampler<T, ChaCha20Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha20Rng::from_entropy())
    }
}

impl<T: Clone, R: Rng> WeightedSampler<T, R> {
    pub fn new(rng: R) -> Self {
        Self {
            entries: Vec::new(),
            rng,
        }
    }

    /// Store the given weights, replacing any previous ones. Never fails;
    /// degenerate tables are only rejected by [`sample`](Self::sample).
    pub fn load(&mut self, weights: impl IntoIterator<Item = (T, u32)>) {
        self.entries = weights.into_iter().collect();
    }

    pub fn with_weights(mut self, weights: impl IntoIterator<Item = (T, u32)>) -> Self {
        self.load(weights);
        self
    }

    pub fn entries(&self) -> &[(T, u32)] {
        &self.entries
    }

    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|(_, w)| u64::from(*w)).sum()
    }

    /// Map a draw in `[0, total_weight)` to its entry: the first whose cumulative
    /// weight exceeds `draw`. Out-of-range draws resolve to the last entry.
    pub fn select(&self, draw: u64) -> Option<&T> {
        let mut cumulative = 0u64;
        for (value, weight) in &self.entries {
            cumulative += u64::from(*weight);
            if draw < cumulative {
                return Some(value);
            }
        }
        self.entries.last().map(|(v, _)| v)
    }

    pub fn sample(&mut self) -> Result<T, ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::Empty);
        }
        let total = self.total_weight();
        if total == 0 {
            return Err(ConfigError::ZeroTotalWeight);
        }
        let draw = self.rng.gen_range(0..total);
        self.select(draw).cloned().ok_or(ConfigError::Empty)
    }
}
