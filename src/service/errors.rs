//! # Record Service Errors
//!
//! Every failure reaching the HTTP boundary is one of three kinds.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// Result type for record service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Record service errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Bad caller input (400)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Referenced record does not exist (404)
    #[error("Record not found")]
    NotFound,

    /// Backing store failed or timed out (500)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ServiceError {
    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::NotFound => "not_found",
            ServiceError::StorageUnavailable(_) => "storage_unavailable",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        if err.is_not_found() {
            ServiceError::NotFound
        } else {
            ServiceError::StorageUnavailable(err.to_string())
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    pub code: u16,
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self {
            error: err.kind(),
            message: err.to_string(),
            code: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
