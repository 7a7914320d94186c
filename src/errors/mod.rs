//! Error handling module for the Garden Guide backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const EXTERNAL_ERROR: &str = "EXTERNAL_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Validation error
    Validation(String),
    /// Hosted database error
    Database(String),
    /// Species API error (transport, status or body)
    External(String),
    /// Local key-value store error
    Storage(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::External(_) => codes::EXTERNAL_ERROR,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Database(msg)
            | AppError::External(msg)
            | AppError::Storage(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Species API error: {:?}", err);
        AppError::External(format!("Species API error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("Stored JSON error: {:?}", err);
        AppError::Storage(format!("Stored JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage I/O error: {:?}", err);
        AppError::Storage(format!("Storage error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message().to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
