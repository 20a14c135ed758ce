use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::RngCore;

use crate::approximator::QFunction;
use crate::environment::{Environment, Step};
use crate::error::{DqnError, Result};
use crate::replay_buffer::Transition;

/// One recorded `fit` call.
#[derive(Clone, Debug)]
pub struct FitCall {
    pub states: Array2<f32>,
    pub targets: Array2<f32>,
    pub epoch: usize,
}

/// Returns the same estimates for every state and records fits without learning.
#[derive(Clone, Debug)]
pub struct ConstantQ {
    pub values: Array1<f32>,
    pub width: usize,
    pub fit_calls: Vec<FitCall>,
}

impl ConstantQ {
    pub fn new(values: Array1<f32>, width: usize) -> Self {
        ConstantQ { values, width, fit_calls: Vec::new() }
    }
}

impl QFunction for ConstantQ {
    type Parameters = Array1<f32>;

    fn state_dimension(&self) -> usize {
        self.width
    }

    fn num_actions(&self) -> usize {
        self.values.len()
    }

    fn predict(&self, _state: ArrayView1<f32>) -> Result<Array1<f32>> {
        Ok(self.values.clone())
    }

    fn predict_batch(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut out = Array2::zeros((states.nrows(), self.values.len()));
        for mut row in out.rows_mut() {
            row.assign(&self.values);
        }
        Ok(out)
    }

    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>, epoch: usize) -> Result<f32> {
        self.fit_calls.push(FitCall {
            states: states.to_owned(),
            targets: targets.to_owned(),
            epoch,
        });
        Ok(0.25)
    }

    fn parameters(&self) -> Array1<f32> {
        self.values.clone()
    }

    fn set_parameters(&mut self, parameters: &Array1<f32>) -> Result<()> {
        if parameters.len() != self.values.len() {
            return Err(DqnError::dimension_mismatch("same length", "other length"));
        }
        self.values.assign(parameters);
        Ok(())
    }
}

/// One-dimensional, two-action environment whose state is the step counter.
///
/// Every step pays 1. With `episode_length = Some(n)` the n-th step is terminal,
/// otherwise the episode never ends on its own.
#[derive(Debug, Default)]
pub struct ScriptedEnv {
    pub episode_length: Option<usize>,
    /// Width of the states actually produced; `state_dimension()` always reports 1
    pub emitted_width: usize,
    pub t: usize,
    pub resets: usize,
    pub steps: usize,
    pub random_actions: usize,
    pub closed: bool,
}

impl ScriptedEnv {
    pub fn terminating(episode_length: usize) -> Self {
        ScriptedEnv { episode_length: Some(episode_length), emitted_width: 1, ..Default::default() }
    }

    pub fn endless() -> Self {
        ScriptedEnv { episode_length: None, emitted_width: 1, ..Default::default() }
    }

    fn state(&self) -> Array1<f32> {
        Array1::from_elem(self.emitted_width, self.t as f32)
    }
}

impl Environment for ScriptedEnv {
    fn state_dimension(&self) -> usize {
        1
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<Array1<f32>> {
        self.t = 0;
        self.resets += 1;
        Ok(self.state())
    }

    fn step(&mut self, _action: usize) -> Result<Step> {
        self.t += 1;
        self.steps += 1;
        let done = self.episode_length == Some(self.t);
        Ok(Step::new(self.state(), 1.0, done))
    }

    fn sample_action(&mut self, _rng: &mut dyn RngCore) -> usize {
        self.random_actions += 1;
        0
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

pub fn transition(state: f32, action: usize, reward: f32, next_state: f32, done: bool) -> Transition {
    Transition {
        state: Array1::from_elem(1, state),
        action,
        reward,
        next_state: Array1::from_elem(1, next_state),
        done,
    }
}
