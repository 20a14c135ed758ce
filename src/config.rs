//! Run configuration.
//!
//! Every field has a default, so a JSON file only needs the values it changes:
//!
//! ```rust
//! use deepq::config::{DqnConfig, NetworkDepth};
//!
//! let config = DqnConfig::from_json_str(r#"{ "episodes": 50, "depth": 5, "seed": 7 }"#).unwrap();
//! assert_eq!(config.episodes, 50);
//! assert_eq!(config.depth, NetworkDepth::Deep);
//! assert_eq!(config.gamma, 0.95);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};

/// How many hidden layers the bundled Q-network gets.
///
/// Also accepts the numeric selectors `3` (standard) and `5` (deep) when deserializing.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(try_from = "DepthSelector", rename_all = "snake_case")]
pub enum NetworkDepth {
    /// Four hidden layers
    #[default]
    Standard,
    /// Six hidden layers
    Deep,
}

impl NetworkDepth {
    pub fn from_selector(selector: u64) -> Result<Self> {
        match selector {
            3 => Ok(NetworkDepth::Standard),
            5 => Ok(NetworkDepth::Deep),
            other => Err(DqnError::invalid_config("depth", format!("selector {} is not 3 or 5", other))),
        }
    }

    pub fn hidden_layers(&self) -> usize {
        match self {
            NetworkDepth::Standard => 4,
            NetworkDepth::Deep => 6,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DepthSelector {
    Layers(u64),
    Name(String),
}

impl TryFrom<DepthSelector> for NetworkDepth {
    type Error = String;

    fn try_from(selector: DepthSelector) -> std::result::Result<Self, Self::Error> {
        match selector {
            DepthSelector::Layers(n) => NetworkDepth::from_selector(n).map_err(|e| e.to_string()),
            DepthSelector::Name(name) => match name.as_str() {
                "standard" => Ok(NetworkDepth::Standard),
                "deep" => Ok(NetworkDepth::Deep),
                other => Err(format!("unknown network depth '{}'", other)),
            },
        }
    }
}

/// Hyperparameters of a training run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DqnConfig {
    /// Discount factor
    pub gamma: f32,
    /// Initial exploration rate
    pub epsilon: f32,
    /// Floor of the exploration rate
    pub min_epsilon: f32,
    /// Multiplier applied to epsilon after every learning update
    pub epsilon_decay: f32,
    pub learning_rate: f32,
    pub replay_capacity: usize,
    /// Counted environment steps between online -> target copies
    pub target_sync_interval: usize,
    pub depth: NetworkDepth,
    pub hidden_units: usize,
    pub episodes: usize,
    pub steps_per_episode: usize,
    pub batch_size: usize,
    /// Seed for exploration, sampling and weight initialization; entropy when absent
    pub seed: Option<u64>,
}

impl Default for DqnConfig {
    fn default() -> Self {
        DqnConfig {
            gamma: 0.95,
            epsilon: 1.0,
            min_epsilon: 0.01,
            epsilon_decay: 0.995,
            learning_rate: 0.001,
            replay_capacity: 2000,
            target_sync_interval: 32,
            depth: NetworkDepth::Standard,
            hidden_units: 32,
            episodes: 1000,
            steps_per_episode: 500,
            batch_size: 32,
            seed: None,
        }
    }
}

impl DqnConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DqnError::invalid_config("gamma", format!("{} is outside [0, 1]", self.gamma)));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(DqnError::invalid_config("epsilon", format!("{} is outside [0, 1]", self.epsilon)));
        }
        if !(0.0..=1.0).contains(&self.min_epsilon) {
            return Err(DqnError::invalid_config("min_epsilon", format!("{} is outside [0, 1]", self.min_epsilon)));
        }
        if self.min_epsilon > self.epsilon {
            return Err(DqnError::invalid_config("min_epsilon", "must not exceed the initial epsilon"));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(DqnError::invalid_config("epsilon_decay", format!("{} is outside (0, 1]", self.epsilon_decay)));
        }
        if !(self.learning_rate > 0.0) {
            return Err(DqnError::invalid_config("learning_rate", "must be positive"));
        }
        let counts = [
            ("replay_capacity", self.replay_capacity),
            ("target_sync_interval", self.target_sync_interval),
            ("hidden_units", self.hidden_units),
            ("episodes", self.episodes),
            ("steps_per_episode", self.steps_per_episode),
            ("batch_size", self.batch_size),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(DqnError::invalid_config(name, "must be positive"));
            }
        }
        if self.batch_size >= self.replay_capacity {
            return Err(DqnError::invalid_config(
                "batch_size",
                format!("learning needs more than {} buffered transitions but capacity is {}", self.batch_size, self.replay_capacity),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DqnConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DqnConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_sync_interval, 32);
        assert_eq!(config.replay_capacity, 2000);
    }

    #[test]
    fn test_rejects_min_epsilon_above_epsilon() {
        let config = DqnConfig { epsilon: 0.1, min_epsilon: 0.2, ..Default::default() };
        assert!(matches!(config.validate(), Err(DqnError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_rejects_zero_counts() {
        for config in [
            DqnConfig { batch_size: 0, ..Default::default() },
            DqnConfig { episodes: 0, ..Default::default() },
            DqnConfig { replay_capacity: 0, ..Default::default() },
            DqnConfig { steps_per_episode: 0, ..Default::default() },
        ] {
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_rejects_epsilon_out_of_range() {
        let config = DqnConfig { epsilon: 1.5, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_batch_must_fit_in_buffer() {
        let config = DqnConfig { batch_size: 64, replay_capacity: 64, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_depth_selectors() {
        let deep: DqnConfig = serde_json::from_str(r#"{"depth": "deep"}"#).unwrap();
        assert_eq!(deep.depth.hidden_layers(), 6);
        let standard: DqnConfig = serde_json::from_str(r#"{"depth": 3}"#).unwrap();
        assert_eq!(standard.depth, NetworkDepth::Standard);
        assert!(serde_json::from_str::<DqnConfig>(r#"{"depth": 4}"#).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = DqnConfig { seed: Some(11), depth: NetworkDepth::Deep, ..Default::default() };
        let parsed = DqnConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"batch_size": 16, "gamma": 0.99}"#).unwrap();
        let config = DqnConfig::from_json_file(&path).unwrap();
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.gamma, 0.99);
    }
}
