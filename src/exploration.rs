use ndarray::ArrayView1;
use rand::{Rng, RngCore};

use crate::approximator::{greedy_action, QFunction};
use crate::environment::Environment;
use crate::error::{DqnError, Result};

/// Epsilon-greedy action selection with a multiplicative, floored decay.
///
/// Epsilon only ever moves down: `decay()` sets it to
/// `max(min_epsilon, epsilon * decay_rate)`.
#[derive(Clone, Debug, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f32,
    min_epsilon: f32,
    decay_rate: f32,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f32, min_epsilon: f32, decay_rate: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(DqnError::invalid_config("epsilon", format!("{} is outside [0, 1]", epsilon)));
        }
        if !(0.0..=1.0).contains(&min_epsilon) {
            return Err(DqnError::invalid_config("min_epsilon", format!("{} is outside [0, 1]", min_epsilon)));
        }
        if min_epsilon > epsilon {
            return Err(DqnError::invalid_config(
                "min_epsilon",
                format!("{} is greater than the initial epsilon {}", min_epsilon, epsilon),
            ));
        }
        if !(decay_rate > 0.0 && decay_rate <= 1.0) {
            return Err(DqnError::invalid_config("epsilon_decay", format!("{} is outside (0, 1]", decay_rate)));
        }
        Ok(EpsilonGreedy { epsilon, min_epsilon, decay_rate })
    }

    /// Always-greedy policy, used for evaluation.
    pub fn greedy() -> Self {
        EpsilonGreedy { epsilon: 0.0, min_epsilon: 0.0, decay_rate: 1.0 }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn min_epsilon(&self) -> f32 {
        self.min_epsilon
    }

    pub fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    /// With probability epsilon a random action from the environment, otherwise the
    /// action with the highest estimate (lowest index on ties).
    pub fn select_action<Q, E>(
        &self,
        state: ArrayView1<f32>,
        approximator: &Q,
        env: &mut E,
        rng: &mut dyn RngCore,
    ) -> Result<usize>
    where
        Q: QFunction,
        E: Environment + ?Sized,
    {
        let u: f32 = rng.gen();
        if u < self.epsilon {
            return Ok(env.sample_action(rng));
        }
        Self::exploit(state, approximator)
    }

    /// Greedy choice only.
    pub fn exploit<Q: QFunction>(state: ArrayView1<f32>, approximator: &Q) -> Result<usize> {
        let q_values = approximator.predict(state)?;
        greedy_action(q_values.view())
            .ok_or_else(|| DqnError::NumericalError(format!("no greedy action for estimates {}", q_values)))
    }

    pub fn decay(&mut self) {
        self.epsilon = (self.epsilon * self.decay_rate).max(self.min_epsilon);
    }
}
