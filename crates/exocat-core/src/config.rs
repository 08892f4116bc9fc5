//! Engine configuration with environment overrides.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::query::guards::{
    clamp_limit, DEFAULT_SIMILARITY_LIMIT, DEFAULT_SIMILAR_PLANETS, MAX_SIMILARITY_LIMIT,
};

pub const SEED_VAR: &str = "EXOCAT_SEED";
pub const SIMILARITY_LIMIT_VAR: &str = "EXOCAT_SIMILARITY_LIMIT";
pub const SIMILAR_PLANETS_VAR: &str = "EXOCAT_SIMILAR_PLANETS";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub similarity_limit: usize,
    pub similar_planets: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            similarity_limit: DEFAULT_SIMILARITY_LIMIT,
            similar_planets: DEFAULT_SIMILAR_PLANETS,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = trimmed, "ignoring unparseable environment value");
            None
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `EXOCAT_SEED`, `EXOCAT_SIMILARITY_LIMIT` and
    /// `EXOCAT_SIMILAR_PLANETS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`EngineConfig::from_env`] but reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let seed = parse_var(SEED_VAR, lookup(SEED_VAR));
        let similarity_limit = parse_var(SIMILARITY_LIMIT_VAR, lookup(SIMILARITY_LIMIT_VAR))
            .map(|limit| clamp_limit(limit, MAX_SIMILARITY_LIMIT))
            .unwrap_or(defaults.similarity_limit);
        let similar_planets = parse_var(SIMILAR_PLANETS_VAR, lookup(SIMILAR_PLANETS_VAR))
            .unwrap_or(defaults.similar_planets);
        Self {
            seed,
            similarity_limit,
            similar_planets,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
