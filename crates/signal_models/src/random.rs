//! Injectable random source
//!
//! Production instances are seeded from OS entropy, tests from a fixed `u64`.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Random source owned by a single model
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Deterministic source
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// `seeded` when a seed is given, `from_entropy` otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Replace the stream with a fresh one derived from the current state
    pub fn reroll(&mut self) {
        self.rng = StdRng::seed_from_u64(self.rng.next_u64());
    }

    /// Independent child source
    pub fn fork(&mut self) -> Self {
        Self::seeded(self.rng.next_u64())
    }

    /// Uniform in [0, 1)
    pub fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Uniform in [-1, 1)
    pub fn signed_unit(&mut self) -> f64 {
        (self.unit() - 0.5) * 2.0
    }

    /// Uniform in [low, high); returns `low` for an empty range
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            low + (high - low) * self.unit()
        } else {
            low
        }
    }

    /// True with probability `p` (values outside [0, 1] saturate)
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform index in [0, len); `len` must be non-zero
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.rng.random_range(0..len)
    }
}
