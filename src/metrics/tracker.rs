use std::collections::VecDeque;
use std::path::Path;

use serde::{Serialize, Deserialize};

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    /// The environment reported `done`.
    Terminated,
    /// The step cap was reached first.
    Truncated,
}

/// Mean over the most recent `capacity` episode rewards.
#[derive(Debug, Clone)]
pub struct RewardWindow {
    rewards: VecDeque<f32>,
    capacity: usize,
}

impl RewardWindow {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(capacity: usize) -> Self {
        RewardWindow {
            rewards: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, reward: f32) {
        if self.rewards.len() >= self.capacity {
            self.rewards.pop_front();
        }
        self.rewards.push_back(reward);
    }

    pub fn mean(&self) -> Option<f32> {
        if self.rewards.is_empty() {
            return None;
        }
        Some(self.rewards.iter().sum::<f32>() / self.rewards.len() as f32)
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

impl Default for RewardWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Per-episode record kept in the training history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub index: usize,
    pub reward: f32,
    pub steps: usize,
    pub outcome: EpisodeOutcome,
    /// Exploration rate when the episode ended
    pub epsilon: f32,
}

/// Everything recorded over one training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub episodes: Vec<EpisodeRecord>,
    /// Loss of every learning update, in order
    pub losses: Vec<f32>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_episode(&mut self, record: EpisodeRecord) {
        self.episodes.push(record);
    }

    pub fn record_loss(&mut self, loss: f32) {
        self.losses.push(loss);
    }

    /// Mean loss over the last `window` updates.
    pub fn avg_loss(&self, window: usize) -> Option<f32> {
        if self.losses.is_empty() || window == 0 {
            return None;
        }
        let n = window.min(self.losses.len());
        let sum: f32 = self.losses.iter().rev().take(n).sum();
        Some(sum / n as f32)
    }

    /// Mean episode reward over the last `window` episodes.
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        if self.episodes.is_empty() || window == 0 {
            return None;
        }
        let n = window.min(self.episodes.len());
        let sum: f32 = self.episodes.iter().rev().take(n).map(|e| e.reward).sum();
        Some(sum / n as f32)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
