// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{LoginRequest, NewUser, RegisterRequest, Role, UserSummary},
    state::AppState,
    utils::token::{Session, issue_token},
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Successful login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Registers a new regular user.
///
/// Rejects a mismatched `confirm_password` and taken usernames.
/// Returns 201 Created with the user summary; the caller still has to log in.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = state
        .users
        .create_user(NewUser {
            username: payload.username,
            password: state.passwords.digest(&payload.password)?,
            role: Role::Regular,
        })
        .await?;

    tracing::info!("User registered: {}", user.username);
    Ok((StatusCode::CREATED, Json(user.summary())))
}

/// Authenticates a user and returns a session token.
///
/// Unknown usernames and wrong passwords produce the same error.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.validate().is_err() {
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    }

    let user = state
        .users
        .find_by_username(&payload.username)
        .await
        .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

    if !state.passwords.verify(&payload.password, &user.password)? {
        tracing::warn!("Failed login for {}", payload.username);
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    }

    let summary = user.summary();
    let token = issue_token(&state.config.token_scheme, &summary)?;
    tracing::info!("User {} logged in", summary.id);

    Ok(Json(LoginResponse {
        token,
        user: summary,
    }))
}

/// Returns the caller's own summary.
pub async fn me(Extension(session): Extension<Session>) -> Json<UserSummary> {
    Json(session.user)
}
