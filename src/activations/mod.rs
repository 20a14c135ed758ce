//! # Activation Functions
//!
//! Element-wise non-linearities used by the bundled Q-network.
//!
//! - **ReLU**: `max(0, x)`, the default for hidden layers
//! - **Linear**: identity, used for the Q-value output layer
//! - **Tanh**: hyperbolic tangent, for bounded hidden features

pub mod functions;

pub use functions::Activation;
