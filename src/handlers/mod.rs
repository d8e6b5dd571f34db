// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod quiz;

use axum::http::Uri;

use crate::error::AppError;

/// Requests outside the known routes end up here.
pub async fn fallback(uri: Uri) -> AppError {
    tracing::debug!("No route for {}", uri);
    AppError::NotFound(format!("No route for {}", uri.path()))
}
