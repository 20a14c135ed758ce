use thiserror::Error;

/// Result type for deepq operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the trainer
#[derive(Error, Debug)]
pub enum DqnError {
    /// Sampling was attempted before the replay buffer held enough transitions
    #[error("Insufficient data: requested {requested} transitions, buffer holds {available}")]
    InsufficientData {
        requested: usize,
        available: usize,
    },

    /// A constructor or configuration parameter was rejected
    #[error("Invalid configuration '{name}': {reason}")]
    InvalidConfiguration {
        name: String,
        reason: String,
    },

    /// The environment broke its contract (state shape, action range)
    #[error("Environment contract violated: {0}")]
    EnvironmentContract(String),

    /// Invalid dimensions for approximator inputs, targets or parameters
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Numerical computation errors
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DqnError {
    fn from(err: serde_json::Error) -> Self {
        DqnError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for DqnError {
    fn from(err: bincode::Error) -> Self {
        DqnError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl DqnError {
    pub fn invalid_config<S: Into<String>, R: Into<String>>(name: S, reason: R) -> Self {
        DqnError::InvalidConfiguration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn dimension_mismatch<S: Into<String>, R: Into<String>>(expected: S, actual: R) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
