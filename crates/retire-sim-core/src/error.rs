use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetireSimError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid parameter model: {field}: {reason}")]
    InvalidParameters { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Simulation cancelled after {completed} of {requested} paths")]
    Cancelled { completed: u32, requested: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RetireSimError {
    fn from(e: serde_json::Error) -> Self {
        RetireSimError::SerializationError(e.to_string())
    }
}

impl RetireSimError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        RetireSimError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameters(field: &str, reason: impl Into<String>) -> Self {
        RetireSimError::InvalidParameters {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
