use ndarray::{array, Array1};

use crate::environment::{check_action, Environment, Step};
use crate::error::{DqnError, Result};

/// Two-state, two-action deterministic task with a known optimal policy.
///
/// States are one-hot encoded. In the start state action 1 advances to the goal
/// state for no reward; in the goal state action 1 ends the episode with reward 1.
/// Action 0 ends the episode with reward 0 from either state. Acting greedily with
/// action 1 everywhere is optimal.
#[derive(Debug)]
pub struct TwoStateChain {
    position: usize,
    done: bool,
}

impl TwoStateChain {
    pub const ADVANCE: usize = 1;
    pub const QUIT: usize = 0;

    pub fn new() -> Self {
        TwoStateChain { position: 0, done: true }
    }

    pub fn encode(position: usize) -> Array1<f32> {
        if position == 0 {
            array![1.0, 0.0]
        } else {
            array![0.0, 1.0]
        }
    }
}

impl Default for TwoStateChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for TwoStateChain {
    fn state_dimension(&self) -> usize {
        2
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<Array1<f32>> {
        self.position = 0;
        self.done = false;
        Ok(Self::encode(0))
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        check_action(action, 2)?;
        if self.done {
            return Err(DqnError::EnvironmentContract(
                "step() called on a finished episode; call reset() first".to_string(),
            ));
        }

        let step = match (self.position, action) {
            (0, Self::ADVANCE) => {
                self.position = 1;
                Step::new(Self::encode(1), 0.0, false)
            }
            (_, Self::ADVANCE) => {
                self.done = true;
                Step::new(Self::encode(1), 1.0, true)
            }
            _ => {
                self.done = true;
                Step::new(Self::encode(self.position), 0.0, true)
            }
        };
        Ok(step)
    }
}
