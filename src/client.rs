// src/client.rs

//! Session-holding client for the quiz API.
//!
//! Wraps any `tower::Service` speaking the API (the router itself when run
//! in-process) and plays the part of the browser: it keeps the token from
//! `login`, attaches it to every call and drops it when the server answers 401.

use std::fmt;

use axum::{
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tower::{Service, ServiceExt};

use crate::{
    handlers::auth::LoginResponse,
    models::{
        question::PublicQuestion,
        quiz_record::{RecordQuizRequest, RecordQuizResponse},
        user::UserSummary,
    },
};

/// What the client keeps between calls; cleared together on logout or 401.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSession {
    pub token: String,
    pub user: UserSummary,
    pub is_admin: bool,
}

/// Failures surfaced to the caller, one per error kind the server reports,
/// plus `Transport` for calls that never produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    Validation(String),
    DuplicateUsername(String),
    NotFound(String),
    ProtectedRecord(String),
    Authentication(String),
    Authorization(String),
    Server(String),
    Transport(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Validation(msg) => write!(f, "invalid request: {}", msg),
            ClientError::DuplicateUsername(msg) => write!(f, "duplicate username: {}", msg),
            ClientError::NotFound(msg) => write!(f, "not found: {}", msg),
            ClientError::ProtectedRecord(msg) => write!(f, "protected record: {}", msg),
            ClientError::Authentication(msg) => write!(f, "authentication failed: {}", msg),
            ClientError::Authorization(msg) => write!(f, "not allowed: {}", msg),
            ClientError::Server(msg) => write!(f, "server error: {}", msg),
            ClientError::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: String,
}

fn classify(status: StatusCode, body: &[u8]) -> ClientError {
    let (message, code) = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => (parsed.error, parsed.code),
        Err(_) => (String::from_utf8_lossy(body).into_owned(), String::new()),
    };

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(message),
        StatusCode::UNAUTHORIZED => ClientError::Authentication(message),
        StatusCode::FORBIDDEN if code == "protected_record" => ClientError::ProtectedRecord(message),
        StatusCode::FORBIDDEN => ClientError::Authorization(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::CONFLICT => ClientError::DuplicateUsername(message),
        _ => ClientError::Server(message),
    }
}

pub struct QuizClient<S> {
    service: S,
    session: Option<ClientSession>,
}

impl<S> QuizClient<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone,
    S::Error: fmt::Display,
{
    pub fn new(service: S) -> Self {
        Self {
            service,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&ClientSession> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_admin)
    }

    /// Sends one request. A 401 tears down the held session before the error is returned.
    pub async fn request<T: DeserializeOwned>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(session) = &self.session {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", session.token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .map_err(|e| ClientError::Transport(e.to_string()))?;

        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = classify(status, &bytes);
            if matches!(err, ClientError::Authentication(_)) && self.session.take().is_some() {
                tracing::warn!("Session rejected by server; logged out");
            }
            return Err(err);
        }

        let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(payload).map_err(|e| ClientError::Transport(e.to_string()))
    }

    /// Logs in and keeps the issued session.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<UserSummary, ClientError> {
        let response: LoginResponse = self
            .request(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "username": username, "password": password })),
            )
            .await?;

        self.session = Some(ClientSession {
            token: response.token,
            is_admin: response.user.role.is_admin(),
            user: response.user.clone(),
        });
        Ok(response.user)
    }

    /// Registers an account. Does not log in.
    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<UserSummary, ClientError> {
        if password != confirm_password {
            return Err(ClientError::Validation("Passwords do not match.".to_string()));
        }
        self.request(
            Method::POST,
            "/api/auth/register",
            Some(json!({
                "username": username,
                "password": password,
                "confirm_password": confirm_password,
            })),
        )
        .await
    }

    pub fn logout(&mut self) {
        self.session = None;
    }

    pub async fn random_questions(&mut self, limit: usize) -> Result<Vec<PublicQuestion>, ClientError> {
        self.request(
            Method::GET,
            &format!("/api/questions/random?limit={}", limit),
            None,
        )
        .await
    }

    pub async fn submit_quiz(
        &mut self,
        attempt: &RecordQuizRequest,
    ) -> Result<RecordQuizResponse, ClientError> {
        let body = serde_json::to_value(attempt).map_err(|e| ClientError::Transport(e.to_string()))?;
        self.request(Method::POST, "/api/quiz/record", Some(body)).await
    }
}
