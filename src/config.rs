use log::warn;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::quantum::register::DEFAULT_MAX_OBJECTS;

/// Simulated measurements per histogram.
pub const DEFAULT_SAMPLING_BUDGET: usize = 1000;
pub const DEFAULT_START_LEVEL: u32 = 1;
/// Period of the correlation display refresh.
pub const DEFAULT_CORRELATION_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub sampling_budget: usize,
    /// Fixed seed for reproducible sampling; entropy when absent.
    pub seed: Option<u64>,
    pub levels_dir: PathBuf,
    pub start_level: u32,
    pub correlation_interval_ms: u64,
    pub max_objects: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sampling_budget: DEFAULT_SAMPLING_BUDGET,
            seed: None,
            levels_dir: PathBuf::from("./levels"),
            start_level: DEFAULT_START_LEVEL,
            correlation_interval_ms: DEFAULT_CORRELATION_INTERVAL_MS,
            max_objects: DEFAULT_MAX_OBJECTS,
        }
    }
}

impl GameConfig {
    /// Defaults overlaid with QUNGEON_* environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(budget) = parse_var(&lookup, "QUNGEON_SAMPLES") {
            config.sampling_budget = budget;
        }
        if let Some(seed) = parse_var(&lookup, "QUNGEON_SEED") {
            config.seed = Some(seed);
        }
        if let Some(dir) = lookup("QUNGEON_LEVELS_DIR") {
            config.levels_dir = PathBuf::from(dir);
        }
        if let Some(level) = parse_var(&lookup, "QUNGEON_START_LEVEL") {
            config.start_level = level;
        }
        if let Some(interval) = parse_var(&lookup, "QUNGEON_CORRELATION_INTERVAL_MS") {
            config.correlation_interval_ms = interval;
        }
        if let Some(max) = parse_var(&lookup, "QUNGEON_MAX_OBJECTS") {
            config.max_objects = max;
        }
        config.normalized()
    }

    /// Sampling budget and correlation interval must stay positive.
    pub fn normalized(mut self) -> Self {
        if self.sampling_budget == 0 {
            warn!("sampling budget of 0 requested, using {}", DEFAULT_SAMPLING_BUDGET);
            self.sampling_budget = DEFAULT_SAMPLING_BUDGET;
        }
        if self.correlation_interval_ms == 0 {
            warn!(
                "correlation interval of 0 ms requested, using {}",
                DEFAULT_CORRELATION_INTERVAL_MS
            );
            self.correlation_interval_ms = DEFAULT_CORRELATION_INTERVAL_MS;
        }
        self
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::from_lookup(|_| None);
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.sampling_budget, 1000);
        assert_eq!(config.start_level, 1);
    }

    #[test]
    fn test_env_overrides() {
        let config = GameConfig::from_lookup(lookup_from(&[
            ("QUNGEON_SAMPLES", "500"),
            ("QUNGEON_SEED", "42"),
            ("QUNGEON_LEVELS_DIR", "/tmp/levels"),
            ("QUNGEON_START_LEVEL", "3"),
            ("QUNGEON_CORRELATION_INTERVAL_MS", "250"),
        ]));
        assert_eq!(config.correlation_interval_ms, 250);
        assert_eq!(config.sampling_budget, 500);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.levels_dir, PathBuf::from("/tmp/levels"));
        assert_eq!(config.start_level, 3);
    }

    #[test]
    fn test_invalid_values_ignored() {
        let config = GameConfig::from_lookup(lookup_from(&[
            ("QUNGEON_SAMPLES", "0"),
            ("QUNGEON_SEED", "abc"),
            ("QUNGEON_CORRELATION_INTERVAL_MS", "0"),
        ]));
        assert_eq!(config.sampling_budget, DEFAULT_SAMPLING_BUDGET);
        assert_eq!(config.correlation_interval_ms, DEFAULT_CORRELATION_INTERVAL_MS);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_config_json() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
