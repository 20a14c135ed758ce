//! Bundled environments.

pub mod cartpole;
pub mod chain;

pub use cartpole::CartPole;
pub use chain::TwoStateChain;
