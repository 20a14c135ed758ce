pub mod tracker;

pub use tracker::{EpisodeOutcome, EpisodeRecord, RewardWindow, TrainingHistory};
