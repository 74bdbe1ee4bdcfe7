use thiserror::Error;

use super::model::ModelError;

/// Every way a single prediction can fail. Both kinds are caught at the
/// handler boundary and shown to the user; none of them stop the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Prediction error: {0}")]
    Model(String),
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
}

impl From<ModelError> for PredictionError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Io { .. } | ModelError::Parse(_) | ModelError::NotConfigured => {
                PredictionError::ModelUnavailable(err.to_string())
            }
            _ => PredictionError::Model(err.to_string()),
        }
    }
}
