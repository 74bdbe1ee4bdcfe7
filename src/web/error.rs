use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::prediction::PredictionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Prediction error: {0}")]
    PredictionFailed(String),
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Template error: {0}")]
    TemplateError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PredictionFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TemplateError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::InvalidInput(msg) => AppError::InvalidInput(msg),
            PredictionError::Model(msg) => AppError::PredictionFailed(msg),
            PredictionError::ModelUnavailable(msg) => AppError::ModelUnavailable(msg),
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::TemplateError(err.to_string())
    }
}
