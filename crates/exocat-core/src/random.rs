//! Injectable randomness for the classification simulator.
//!
//! Every draw goes through [`RandomSource::next_unit`], so a scripted source
//! can pin each step of a classification exactly.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// A uniform draw from `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// A uniform draw from `[low, high)`, derived as `low + u * (high - low)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_unit() * (high - low)
    }
}

/// Pseudo-random source backed by `StdRng`.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of unit draws, cycling when exhausted.
///
/// An empty script always yields `0.0`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    script: Vec<f64>,
    pending: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        let script: Vec<f64> = draws.into_iter().collect();
        Self {
            pending: script.iter().copied().collect(),
            script,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if self.pending.is_empty() {
            self.pending.extend(self.script.iter().copied());
        }
        self.pending.pop_front().unwrap_or(0.0)
    }
}
