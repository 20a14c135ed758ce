//! The environment collaborator the trainer steps through.

use std::collections::HashMap;

use ndarray::{Array1, ArrayView1};
use rand::{Rng, RngCore};

use crate::error::{DqnError, Result};

/// Extra diagnostic values an environment may attach to a step.
pub type Info = HashMap<String, f32>;

/// Outcome of one environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub next_state: Array1<f32>,
    pub reward: f32,
    pub done: bool,
    pub info: Info,
}

impl Step {
    pub fn new(next_state: Array1<f32>, reward: f32, done: bool) -> Self {
        Step { next_state, reward, done, info: Info::new() }
    }
}

/// An episodic environment with a discrete action space.
pub trait Environment {
    /// Length of every state vector this environment produces.
    fn state_dimension(&self) -> usize;

    /// Actions are `0..num_actions()`.
    fn num_actions(&self) -> usize;

    /// Start a new episode and return its initial state.
    fn reset(&mut self) -> Result<Array1<f32>>;

    fn step(&mut self, action: usize) -> Result<Step>;

    /// Uniformly random action, used for exploration.
    fn sample_action(&mut self, rng: &mut dyn RngCore) -> usize {
        rng.gen_range(0..self.num_actions())
    }

    fn render(&self) {}

    fn close(&mut self) {}
}

/// Reject states of the wrong width or with non-finite components.
pub fn check_state(state: ArrayView1<f32>, state_dimension: usize) -> Result<()> {
    if state.len() != state_dimension {
        return Err(DqnError::EnvironmentContract(format!(
            "state has {} components, expected {}",
            state.len(),
            state_dimension
        )));
    }
    if let Some(value) = state.iter().find(|v| !v.is_finite()) {
        return Err(DqnError::EnvironmentContract(format!("state contains non-finite value {}", value)));
    }
    Ok(())
}

pub fn check_action(action: usize, num_actions: usize) -> Result<()> {
    if action >= num_actions {
        return Err(DqnError::EnvironmentContract(format!(
            "action {} outside 0..{}",
            action, num_actions
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_check_state() {
        assert!(check_state(array![0.0, 1.0].view(), 2).is_ok());
        assert!(matches!(
            check_state(array![0.0].view(), 2),
            Err(DqnError::EnvironmentContract(_))
        ));
        assert!(check_state(array![0.0, f32::INFINITY].view(), 2).is_err());
    }

    #[test]
    fn test_check_action() {
        assert!(check_action(1, 2).is_ok());
        assert!(check_action(2, 2).is_err());
    }
}
