// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (validation failures, password mismatch)
    BadRequest(String),

    // 409 Conflict: username already taken
    DuplicateUsername(String),

    // 404 Not Found
    NotFound(String),

    // 403 Forbidden: record may not be deleted (admin accounts)
    ProtectedRecord(String),

    // 401 Unauthorized: bad credentials or missing/invalid token
    AuthError(String),

    // 403 Forbidden: authenticated but lacking the admin role
    Forbidden(String),
}

impl AppError {
    /// Stable machine-readable kind, sent as `code` in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) => "internal",
            AppError::BadRequest(_) => "validation",
            AppError::DuplicateUsername(_) => "duplicate_username",
            AppError::NotFound(_) => "not_found",
            AppError::ProtectedRecord(_) => "protected_record",
            AppError::AuthError(_) => "authentication",
            AppError::Forbidden(_) => "authorization",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUsername(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ProtectedRecord(_) => StatusCode::FORBIDDEN,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::InternalServerError(msg)
            | AppError::BadRequest(msg)
            | AppError::DuplicateUsername(msg)
            | AppError::NotFound(msg)
            | AppError::ProtectedRecord(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "Internal Server Error".to_string()
            }
            other => {
                tracing::debug!("Request rejected: {}", other);
                other.message().to_string()
            }
        };
        let body = Json(json!({
            "error": error_message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
