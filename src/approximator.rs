//! The function-approximator capability the trainer drives.
//!
//! The trainer owns two values of the same `QFunction` type: the online
//! approximator, which is fitted every learning step, and the target, which only
//! changes when the synchronizer copies the online parameters into it.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::Result;

/// Maps states to one value estimate per action.
pub trait QFunction {
    /// Opaque parameter snapshot used for online -> target copies.
    type Parameters: Clone;

    /// Width of the state vectors this approximator accepts.
    fn state_dimension(&self) -> usize;

    /// Number of value estimates produced per state.
    fn num_actions(&self) -> usize;

    /// Value estimates for one state.
    fn predict(&self, state: ArrayView1<f32>) -> Result<Array1<f32>>;

    /// Value estimates for a batch of states, one state per row.
    fn predict_batch(&self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Fit the batch of `(state, target vector)` rows. `epoch` is bookkeeping for
    /// metric sinks and must not reset optimizer state. Returns the batch loss.
    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>, epoch: usize) -> Result<f32>;

    fn parameters(&self) -> Self::Parameters;

    fn set_parameters(&mut self, parameters: &Self::Parameters) -> Result<()>;
}

/// Index of the largest value, lowest index on ties. `None` for empty input or a NaN.
pub fn greedy_action(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            return None;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Largest value of a row; `NEG_INFINITY` for an empty row.
pub fn max_value(values: ArrayView1<f32>) -> f32 {
    values.iter().fold(f32::NEG_INFINITY, |max, &val| max.max(val))
}
