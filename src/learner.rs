//! Temporal-difference targets and the batched fit of the online approximator.

use log::debug;
use ndarray::{Array2, Axis};
use rand::RngCore;

use crate::approximator::{max_value, QFunction};
use crate::error::{DqnError, Result};
use crate::exploration::EpsilonGreedy;
use crate::replay_buffer::{ReplayBuffer, Transition};

/// What a call to [`Learner::maybe_update`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpdateOutcome {
    /// The buffer does not yet hold more than `batch_size` transitions; nothing changed.
    WarmingUp { buffered: usize, batch_size: usize },
    /// One fit call covering the whole minibatch was issued.
    Updated { loss: f32 },
}

impl UpdateOutcome {
    pub fn is_update(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }
}

/// Regression label for one transition.
///
/// Terminal transitions do not bootstrap: the label is the raw reward.
pub fn td_target(reward: f32, done: bool, gamma: f32, max_next_value: f32) -> f32 {
    if done {
        reward
    } else {
        reward + gamma * max_next_value
    }
}

#[derive(Clone, Debug)]
pub struct Learner {
    gamma: f32,
    batch_size: usize,
    updates: usize,
}

impl Learner {
    pub fn new(gamma: f32, batch_size: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&gamma) {
            return Err(DqnError::invalid_config("gamma", format!("{} is outside [0, 1]", gamma)));
        }
        if batch_size == 0 {
            return Err(DqnError::invalid_config("batch_size", "must be positive"));
        }
        Ok(Learner { gamma, batch_size, updates: 0 })
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of completed updates so far.
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// The buffer must hold strictly more than `batch_size` transitions before learning starts.
    pub fn buffer_is_warm(&self, buffer: &ReplayBuffer) -> bool {
        buffer.len() > self.batch_size
    }

    /// Sample a minibatch, fit `online` towards TD targets computed with `target`,
    /// and decay the exploration rate once. A no-op while the buffer is warming up.
    #[allow(clippy::too_many_arguments)]
    pub fn maybe_update<Q: QFunction>(
        &mut self,
        buffer: &ReplayBuffer,
        online: &mut Q,
        target: &Q,
        policy: &mut EpsilonGreedy,
        epoch: usize,
        rng: &mut dyn RngCore,
    ) -> Result<UpdateOutcome> {
        if !self.buffer_is_warm(buffer) {
            debug!("replay buffer warming up ({}/{} transitions)", buffer.len(), self.batch_size + 1);
            return Ok(UpdateOutcome::WarmingUp {
                buffered: buffer.len(),
                batch_size: self.batch_size,
            });
        }

        let minibatch = buffer.sample(self.batch_size, rng)?;
        let (states, targets) = self.build_targets(&minibatch, online, target)?;
        let loss = online.fit(states.view(), targets.view(), epoch)?;

        policy.decay();
        self.updates += 1;
        Ok(UpdateOutcome::Updated { loss })
    }

    /// Stack the minibatch into `(states, target vectors)`.
    ///
    /// Each target row is the online estimate for its state with only the taken
    /// action's entry replaced by the TD target. Next-state values come from `target`.
    pub fn build_targets<Q: QFunction>(
        &self,
        minibatch: &[&Transition],
        online: &Q,
        target: &Q,
    ) -> Result<(Array2<f32>, Array2<f32>)> {
        if minibatch.is_empty() {
            return Err(DqnError::InsufficientData { requested: 1, available: 0 });
        }

        let state_dimension = online.state_dimension();
        let mut states = Array2::zeros((minibatch.len(), state_dimension));
        let mut next_states = Array2::zeros((minibatch.len(), state_dimension));
        for (i, transition) in minibatch.iter().enumerate() {
            if transition.state.len() != state_dimension || transition.next_state.len() != state_dimension {
                return Err(DqnError::dimension_mismatch(
                    format!("states of width {}", state_dimension),
                    format!("{} and {}", transition.state.len(), transition.next_state.len()),
                ));
            }
            states.row_mut(i).assign(&transition.state);
            next_states.row_mut(i).assign(&transition.next_state);
        }

        let mut targets = online.predict_batch(states.view())?;
        let next_values = target.predict_batch(next_states.view())?;

        for (i, (transition, next_row)) in minibatch.iter().zip(next_values.axis_iter(Axis(0))).enumerate() {
            if transition.action >= targets.ncols() {
                return Err(DqnError::dimension_mismatch(
                    format!("action below {}", targets.ncols()),
                    format!("action {}", transition.action),
                ));
            }
            let max_next_value = if transition.done { 0.0 } else { max_value(next_row) };
            targets[[i, transition.action]] = td_target(transition.reward, transition.done, self.gamma, max_next_value);
        }

        Ok((states, targets))
    }
}
