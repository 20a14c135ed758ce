use ndarray::Array2;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// He/Kaiming uniform initialization (for ReLU)
    HeUniform,

    /// Uniform distribution with custom range
    Uniform { min: f32, max: f32 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize a `(fan_in, fan_out)` weight matrix from the given generator
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f32> {
        let (fan_in, fan_out) = shape;

        match self {
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in as f32).sqrt();
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::Uniform { min, max } => {
                Array2::random_using(shape, Uniform::new_inclusive(*min, *max), rng)
            }

            WeightInit::Zeros => {
                Array2::zeros(shape)
            }
        }
    }

    /// Get the recommended initialization for an activation function
    pub fn for_activation(activation: Activation) -> Self {
        match activation {
            Activation::Relu => WeightInit::HeUniform,
            Activation::Linear | Activation::Tanh => WeightInit::XavierUniform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_xavier_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = WeightInit::XavierUniform.initialize_weights((4, 32), &mut rng);
        let limit = (6.0f32 / 36.0).sqrt();
        assert_eq!(w.dim(), (4, 32));
        assert!(w.iter().all(|&v| v.abs() <= limit));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = WeightInit::HeUniform.initialize_weights((3, 5), &mut StdRng::seed_from_u64(9));
        let b = WeightInit::HeUniform.initialize_weights((3, 5), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
