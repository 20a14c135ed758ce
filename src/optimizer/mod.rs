//! Gradient-descent optimizers for the bundled Q-network.
//!
//! Optimizer state (Adam's moment estimates and step count) lives as long as the
//! network that owns it; repeated `fit` calls continue from where the last one stopped.

use ndarray::{Array1, Array2};
use serde::{Serialize, Deserialize};

pub trait Optimizer {
    /// Called once before the per-layer updates of a training step.
    fn begin_step(&mut self) {}
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32);
    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32);
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn begin_step(&mut self) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.begin_step(),
            OptimizerWrapper::Adam(optimizer) => optimizer.begin_step(),
        }
    }

    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
        }
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Default for SGD {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, _layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(&mut self, _layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

/// Adam with one pair of moment estimates per layer, allocated on first use.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Option<Array2<f32>>>,
    v_weights: Vec<Option<Array2<f32>>>,
    m_biases: Vec<Option<Array1<f32>>>,
    v_biases: Vec<Option<Array1<f32>>>,
    pub t: usize,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            t: 0,
        }
    }

    fn ensure_layer(&mut self, layer: usize) {
        if self.m_weights.len() <= layer {
            self.m_weights.resize(layer + 1, None);
            self.v_weights.resize(layer + 1, None);
            self.m_biases.resize(layer + 1, None);
            self.v_biases.resize(layer + 1, None);
        }
    }

    fn bias_corrections(&self) -> (f32, f32) {
        let t = self.t.max(1) as i32;
        (1.0 - self.beta1.powi(t), 1.0 - self.beta2.powi(t))
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-7)
    }
}

impl Optimizer for Adam {
    fn begin_step(&mut self) {
        self.t += 1;
    }

    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        self.ensure_layer(layer);
        let (c1, c2) = self.bias_corrections();
        let (beta1, beta2, eps) = (self.beta1, self.beta2, self.epsilon);

        let m = self.m_weights[layer].get_or_insert_with(|| Array2::zeros(weights.dim()));
        m.zip_mut_with(gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        let v = self.v_weights[layer].get_or_insert_with(|| Array2::zeros(weights.dim()));
        v.zip_mut_with(gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let m = &self.m_weights[layer];
        let v = &self.v_weights[layer];
        if let (Some(m), Some(v)) = (m, v) {
            ndarray::Zip::from(weights).and(m).and(v).for_each(|w, &m, &v| {
                *w -= learning_rate * (m / c1) / ((v / c2).sqrt() + eps);
            });
        }
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        self.ensure_layer(layer);
        let (c1, c2) = self.bias_corrections();
        let (beta1, beta2, eps) = (self.beta1, self.beta2, self.epsilon);

        let m = self.m_biases[layer].get_or_insert_with(|| Array1::zeros(biases.dim()));
        m.zip_mut_with(gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        let v = self.v_biases[layer].get_or_insert_with(|| Array1::zeros(biases.dim()));
        v.zip_mut_with(gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let m = &self.m_biases[layer];
        let v = &self.v_biases[layer];
        if let (Some(m), Some(v)) = (m, v) {
            ndarray::Zip::from(biases).and(m).and(v).for_each(|b, &m, &v| {
                *b -= learning_rate * (m / c1) / ((v / c2).sqrt() + eps);
            });
        }
    }
}
