// src/utils/token.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::TokenScheme,
    error::AppError,
    models::user::{Role, UserSummary},
    state::AppState,
};

const MOCK_TOKEN_PREFIX: &str = "mock-token-";

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    pub role: Role,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// The authenticated caller, resolved once per request by `auth_middleware`
/// and handed to handlers as a request extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserSummary,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }
}

/// Mints a session token for `user` under the configured scheme.
pub fn issue_token(scheme: &TokenScheme, user: &UserSummary) -> Result<String, AppError> {
    match scheme {
        TokenScheme::Mock => Ok(format!("{}{}", MOCK_TOKEN_PREFIX, user.id)),
        TokenScheme::Jwt { secret, expiration } => sign_jwt(user.id, user.role, secret, *expiration),
    }
}

/// Recovers the user id a token was issued for.
pub fn token_subject(scheme: &TokenScheme, token: &str) -> Result<i64, AppError> {
    let invalid = || AppError::AuthError("Invalid token".to_string());
    match scheme {
        TokenScheme::Mock => token
            .strip_prefix(MOCK_TOKEN_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
            .ok_or_else(invalid),
        TokenScheme::Jwt { secret, .. } => verify_jwt(token, secret)?
            .sub
            .parse::<i64>()
            .map_err(|_| invalid()),
    }
}

/// Signs a new JWT for the user.
pub fn sign_jwt(
    id: i64,
    role: Role,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and re-reads the user,
/// so deleted accounts and role changes take effect immediately.
/// On success injects a `Session` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or_else(|| AppError::AuthError("Missing bearer token".to_string()))?;

    let user_id = token_subject(&state.config.token_scheme, &token)?;
    let user = state.users.get_user(user_id).await.ok_or_else(|| {
        tracing::warn!("Token presented for unknown user {}", user_id);
        AppError::AuthError("Invalid token".to_string())
    })?;

    req.extensions_mut().insert(Session {
        token,
        user: user.summary(),
    });
    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`. Rejects non-admin sessions with 403.
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let session = req
        .extensions()
        .get::<Session>()
        .ok_or_else(|| AppError::AuthError("Not logged in".to_string()))?;

    if !session.is_admin() {
        tracing::warn!("User {} denied admin access", session.user.id);
        return Err(AppError::Forbidden("Administrator role required".to_string()));
    }

    Ok(next.run(req).await)
}
