//! HTTP error handling and response conversion.
//!
//! Errors are mapped to status codes and a JSON `{ "error": ... }` body. A failed
//! pagination never carries a partial envelope.

use crate::domain::pagination::errors::PaginateError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Application-level errors returned from handlers.
#[derive(Debug)]
pub enum AppError {
    /// Unknown model or route (404).
    NotFound(String),

    /// Request body could not be parsed (400).
    BadRequest(String),

    /// Pagination arguments failed validation (400).
    InvalidArgument(String),

    /// Record store failed to fetch or count (500).
    Storage(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl AppError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-safe error message (without implementation details).
    fn user_message(&self) -> String {
        match self {
            Self::NotFound(msg) => msg.clone(),
            Self::BadRequest(msg) => msg.clone(),
            Self::InvalidArgument(msg) => msg.clone(),
            Self::Storage(_) => "Record store operation failed".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        match self {
            Self::Storage(_) => tracing::error!("error={}", self),
            Self::NotFound(_) | Self::BadRequest(_) | Self::InvalidArgument(_) => {
                tracing::warn!("error={}", self)
            }
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// === Domain Error Conversion ===

impl From<PaginateError> for AppError {
    fn from(err: PaginateError) -> Self {
        match err {
            PaginateError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            PaginateError::CollaboratorFailure(msg) => {
                tracing::error!(collaborator_failure = %msg);
                AppError::Storage(msg)
            }
        }
    }
}

// === Request Body Conversion ===

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!(json_error = %err, "Rejected pagination request body");
        AppError::BadRequest(format!("Malformed request body: {}", err))
    }
}
