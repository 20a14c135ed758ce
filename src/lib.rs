//! # deepq - Deep Q-Network trainer
//!
//! A single-agent DQN trainer: an online Q-function learns from uniformly sampled
//! replay memory, TD targets come from a target Q-function that is hard-copied from
//! the online one every fixed number of steps, and exploration is epsilon-greedy
//! with a multiplicative decay applied once per learning update.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deepq::envs::CartPole;
//! use deepq::evaluation::Evaluator;
//! use deepq::trainer::TrainerBuilder;
//!
//! let mut trainer = TrainerBuilder::new(CartPole::with_seed(1))
//!     .episodes(300)
//!     .steps_per_episode(200)
//!     .seed(1)
//!     .build()
//!     .unwrap();
//! let report = trainer.train().unwrap();
//! println!("mean reward over the last 100 episodes: {:?}", report.mean_reward_last_100);
//!
//! let (mut env, online) = trainer.into_parts();
//! let rewards = Evaluator::new(false).evaluate(&mut env, &online, 5).unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`replay_buffer`] - Transitions and the bounded replay memory
//! - [`exploration`] - Epsilon-greedy action selection with decay
//! - [`learner`] - TD targets and the batched fit of the online approximator
//! - [`sync`] - Online -> target parameter copies
//! - [`trainer`] - The episode loop and its builder
//! - [`evaluation`] - Greedy evaluation episodes
//! - [`approximator`] - The `QFunction` capability trait
//! - [`network`] - Bundled feed-forward Q-network
//! - [`environment`] / [`envs`] - Environment trait and bundled environments
//! - [`config`] - Run configuration
//! - [`metrics`] / [`telemetry`] - Reward statistics and scalar sinks
//! - [`error`] - Error types and result handling

pub mod activations;
pub mod approximator;
pub mod config;
pub mod environment;
pub mod envs;
pub mod error;
pub mod evaluation;
pub mod exploration;
pub mod layers;
pub mod learner;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod sync;
pub mod telemetry;
pub mod trainer;

pub use error::{DqnError, Result};

#[cfg(test)]
mod tests;
