use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

use crate::db::StoreError;
use crate::models::ErrorResponse;
use crate::validation::ValidationError;

/// Application-specific error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The payload does not satisfy the lead schema.
    Validation(ValidationError),
    /// The document store is unavailable or rejected the write.
    Persistence(StoreError),
    /// The request body could not be read as JSON at all.
    BadRequest(String),
    /// The request body exceeds the configured limit.
    PayloadTooLarge(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    ///
    /// Underlying messages are passed through unchanged.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Persistence(e) => write!(f, "{}", e),
            AppError::BadRequest(msg) | AppError::PayloadTooLarge(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Validation(e) => Some(e),
            AppError::Persistence(e) => Some(e),
            AppError::BadRequest(_) | AppError::PayloadTooLarge(_) => None,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response with a `{ "detail": ... }` body.
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Persistence(err)
    }
}
