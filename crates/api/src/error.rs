//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_engine::ServiceError;
use serde::Serialize;
use signal_ingest::ValidationError;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// The submitted signal was rejected
    #[error("{0}")]
    Validation(String),
    /// Pipeline failure; details stay in the server log
    #[error("Error processing signal")]
    Processing,
    /// Requested resource is unavailable
    #[error("{0}")]
    NotFound(String),
    /// A server-side signal file could not be read
    #[error("{0}")]
    SourceUnavailable(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Processing | ApiError::SourceUnavailable(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label for failure metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Processing => "processing",
            ApiError::NotFound(_) => "not_found",
            ApiError::SourceUnavailable(_) => "source_unavailable",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(ValidationError::Io(msg)) => {
                error!("Signal source unreadable: {}", msg);
                ApiError::SourceUnavailable("Signal source unavailable".to_string())
            }
            ServiceError::Validation(e) => ApiError::Validation(e.to_string()),
            other => {
                error!("Error processing signal: {}", other);
                ApiError::Processing
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
