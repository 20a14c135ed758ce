use ndarray::Array1;
use rand::Rng;
use rand::seq::index;
use std::collections::VecDeque;

use crate::error::{DqnError, Result};

/// One environment step: `(state, action, reward, next_state, done)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// Bounded FIFO memory of transitions with uniform sampling.
///
/// Once `capacity` transitions are stored, every append evicts the oldest one.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DqnError::invalid_config("replay_capacity", "must be positive"));
        }
        Ok(ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    pub fn append(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    ///
    /// Fails with `InsufficientData` unless `0 < batch_size <= len()`.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<&Transition>> {
        if batch_size == 0 || batch_size > self.buffer.len() {
            return Err(DqnError::InsufficientData {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        Ok(index::sample(rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }
}
