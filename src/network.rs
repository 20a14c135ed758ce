use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::approximator::QFunction;
use crate::error::{DqnError, Result};
use crate::layers::DenseLayer;
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// Weights and biases of every layer, in layer order.
///
/// This is the blob that moves between the online and the target network.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NetworkParameters {
    pub weights: Vec<Array2<f32>>,
    pub biases: Vec<Array1<f32>>,
}

impl NetworkParameters {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// A feed-forward network of dense layers trained with mean squared error.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
    pub learning_rate: f32,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes, activations, and optimizer.
    ///
    /// `layer_sizes` includes the input and output sizes, so it must be one longer
    /// than `activations`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DqnError::invalid_config("layer_sizes", "must have at least input and output sizes"));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(DqnError::invalid_config(
                "activations",
                format!("expected {} activations, got {}", layer_sizes.len() - 1, activations.len()),
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(DqnError::invalid_config("layer_sizes", "every layer needs at least one unit"));
        }
        if !(learning_rate > 0.0) {
            return Err(DqnError::invalid_config("learning_rate", "must be positive"));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, &mut *rng))
            .collect::<Vec<_>>();

        Ok(NeuralNetwork { layers, optimizer, learning_rate })
    }

    /// Q-network shape: `hidden_layers` ReLU layers of `hidden_units` followed by a
    /// linear layer with one output per action.
    pub fn q_network<R: Rng + ?Sized>(
        state_dimension: usize,
        num_actions: usize,
        hidden_layers: usize,
        hidden_units: usize,
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let mut layer_sizes = vec![state_dimension];
        layer_sizes.extend(std::iter::repeat(hidden_units).take(hidden_layers));
        layer_sizes.push(num_actions);

        let mut activations = vec![Activation::Relu; hidden_layers];
        activations.push(Activation::Linear);

        Self::new(&layer_sizes, &activations, optimizer, learning_rate, rng)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.input_size()).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.output_size()).unwrap_or(0)
    }

    /// Forward pass for a single input vector.
    pub fn forward(&self, input: ArrayView1<f32>) -> Array1<f32> {
        let output = self.forward_batch(input.insert_axis(Axis(0)));
        output.index_axis_move(Axis(0), 0)
    }

    /// Forward pass for a batch of input vectors, one per row.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        current_output
    }

    /// One gradient step on the mean squared error between outputs and `targets`.
    ///
    /// Returns the loss measured before the update.
    pub fn train_minibatch(&mut self, inputs: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<f32> {
        let mut outputs = inputs.to_owned();
        for layer in &mut self.layers {
            outputs = layer.forward_train(outputs.view());
        }

        let output_errors = &outputs - &targets;
        let loss = output_errors.mapv(|e| e * e).mean().unwrap_or(0.0);
        if !loss.is_finite() {
            self.layers.iter_mut().for_each(DenseLayer::clear_cache);
            return Err(DqnError::NumericalError(format!("non-finite training loss {}", loss)));
        }

        // d(mean squared error)/d(output)
        let scale = 2.0 / output_errors.len() as f32;
        let mut current_error = output_errors * scale;

        let mut gradients = Vec::with_capacity(self.layers.len());
        for i in (0..self.layers.len()).rev() {
            let layer = &self.layers[i];
            let (adjusted_error, weight_gradients, bias_gradients) = layer.backward_batch(current_error.view())?;
            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
            gradients.push((weight_gradients, bias_gradients));
        }
        gradients.reverse();

        self.optimizer.begin_step();
        let learning_rate = self.learning_rate;
        for (index, (layer, (weight_gradients, bias_gradients))) in self.layers.iter_mut().zip(gradients).enumerate() {
            self.optimizer.update_weights(index, &mut layer.weights, &weight_gradients, learning_rate);
            self.optimizer.update_biases(index, &mut layer.biases, &bias_gradients, learning_rate);
            layer.clear_cache();
        }

        Ok(loss)
    }

    pub fn parameters(&self) -> NetworkParameters {
        NetworkParameters {
            weights: self.layers.iter().map(|l| l.weights.clone()).collect(),
            biases: self.layers.iter().map(|l| l.biases.clone()).collect(),
        }
    }

    /// Overwrite every weight and bias. Shapes must match this network exactly.
    pub fn set_parameters(&mut self, parameters: &NetworkParameters) -> Result<()> {
        if parameters.weights.len() != self.layers.len() || parameters.biases.len() != self.layers.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} layers", self.layers.len()),
                format!("{} weight and {} bias arrays", parameters.weights.len(), parameters.biases.len()),
            ));
        }
        for (layer, (w, b)) in self.layers.iter().zip(parameters.weights.iter().zip(&parameters.biases)) {
            if layer.weights.dim() != w.dim() || layer.biases.dim() != b.dim() {
                return Err(DqnError::dimension_mismatch(
                    format!("{:?}/{:?}", layer.weights.dim(), layer.biases.dim()),
                    format!("{:?}/{:?}", w.dim(), b.dim()),
                ));
            }
        }
        for (layer, (w, b)) in self.layers.iter_mut().zip(parameters.weights.iter().zip(&parameters.biases)) {
            layer.weights.assign(w);
            layer.biases.assign(b);
        }
        Ok(())
    }

    fn check_input_width(&self, width: usize) -> Result<()> {
        if width != self.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("input width {}", self.input_size()),
                format!("input width {}", width),
            ));
        }
        Ok(())
    }
}

impl QFunction for NeuralNetwork {
    type Parameters = NetworkParameters;

    fn state_dimension(&self) -> usize {
        self.input_size()
    }

    fn num_actions(&self) -> usize {
        self.output_size()
    }

    fn predict(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_input_width(state.len())?;
        Ok(self.forward(state))
    }

    fn predict_batch(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input_width(states.ncols())?;
        Ok(self.forward_batch(states))
    }

    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>, _epoch: usize) -> Result<f32> {
        self.check_input_width(states.ncols())?;
        if targets.dim() != (states.nrows(), self.output_size()) {
            return Err(DqnError::dimension_mismatch(
                format!("targets {:?}", (states.nrows(), self.output_size())),
                format!("targets {:?}", targets.dim()),
            ));
        }
        self.train_minibatch(states, targets)
    }

    fn parameters(&self) -> NetworkParameters {
        NeuralNetwork::parameters(self)
    }

    fn set_parameters(&mut self, parameters: &NetworkParameters) -> Result<()> {
        NeuralNetwork::set_parameters(self, parameters)
    }
}
