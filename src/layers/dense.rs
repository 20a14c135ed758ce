use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use super::initialization::WeightInit;

/// A fully connected (dense) layer in a neural network
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    #[serde(skip)]
    pre_activation_output: Option<Array2<f32>>,
    #[serde(skip)]
    inputs: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Create a new dense layer with the given input size, output size, and activation function.
    /// Weights are drawn with the initialization recommended for the activation; biases start at zero.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, activation: Activation, rng: &mut R) -> Self {
        Self::new_with_init(input_size, output_size, activation, WeightInit::for_activation(activation), rng)
    }

    pub fn new_with_init<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Self {
        DenseLayer {
            weights: init.initialize_weights((input_size, output_size), rng),
            biases: Array1::zeros(output_size),
            activation,
            pre_activation_output: None,
            inputs: None,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Self {
        assert_eq!(weights.dim(), self.weights.dim());
        self.weights = weights;
        self
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Self {
        assert_eq!(biases.dim(), self.biases.dim());
        self.biases = biases;
        self
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Forward pass for a batch without touching the training caches.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass that keeps inputs and pre-activations for a following `backward_batch`.
    pub fn forward_train(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        self.inputs = Some(inputs.to_owned());
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.pre_activation_output = Some(outputs.clone());
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Gradients for a batch of output errors.
    ///
    /// Returns `(adjusted_error, weight_gradients, bias_gradients)` where the adjusted error
    /// is the output error scaled by the activation derivative.
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<(Array2<f32>, Array2<f32>, Array1<f32>)> {
        let (pre_activation_output, inputs) = match (&self.pre_activation_output, &self.inputs) {
            (Some(pre), Some(inputs)) => (pre, inputs),
            _ => {
                return Err(DqnError::NumericalError(
                    "forward_train() must be called before backward_batch()".to_string(),
                ))
            }
        };

        let activation_deriv = self.activation.derivative_batch(pre_activation_output.view());
        let adjusted_error = output_errors.to_owned() * &activation_deriv;
        let weight_gradients = inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));

        Ok((adjusted_error, weight_gradients, bias_gradients))
    }

    /// Drop the cached activations once a training step is done.
    pub fn clear_cache(&mut self) {
        self.inputs = None;
        self.pre_activation_output = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_forward_batch_matches_forward_train() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut layer = DenseLayer::new(2, 3, Activation::Relu, &mut rng);
        let x = array![[0.5, -1.0], [2.0, 0.25]];
        let pure = layer.forward_batch(x.view());
        let cached = layer.forward_train(x.view());
        assert_eq!(pure, cached);
    }

    #[test]
    fn test_backward_requires_forward() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = DenseLayer::new(2, 1, Activation::Linear, &mut rng);
        assert!(layer.backward_batch(array![[1.0]].view()).is_err());
    }

    #[test]
    fn test_linear_gradients() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut layer = DenseLayer::new(2, 1, Activation::Linear, &mut rng)
            .with_weights(array![[1.0], [1.0]]);
        layer.forward_train(array![[1.0, 2.0]].view());
        let (_, wg, bg) = layer.backward_batch(array![[0.5]].view()).unwrap();
        assert_eq!(wg, array![[0.5], [1.0]]);
        assert_eq!(bg, array![0.5]);
    }
}
