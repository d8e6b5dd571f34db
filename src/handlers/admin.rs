// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::{CreateQuestionRequest, QuestionListParams, UpdateQuestionRequest},
        user::{
            AdminCreateUserRequest, AdminUpdateUserRequest, NewUser, UserChanges, UserListParams,
        },
    },
    state::AppState,
    store::PageRequest,
};

/// Lists users, filtered by a username substring and paginated.
/// Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, AppError> {
    let keyword = params.keyword.as_deref().filter(|k| !k.is_empty());
    let page = state
        .users
        .list_users(keyword, PageRequest::new(params.page, params.page_size))
        .await;

    Ok(Json(page))
}

/// Creates a new user with specific role.
/// Admin only.
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = state
        .users
        .create_user(NewUser {
            username: payload.username,
            password: state.passwords.digest(&payload.password)?,
            role: payload.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Updates user information. Omitted fields keep their stored values.
/// Admin only.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let password = match payload.password {
        Some(password) => Some(state.passwords.digest(&password)?),
        None => None,
    };

    let user = state
        .users
        .update_user(
            id,
            UserChanges {
                username: payload.username,
                password,
                role: payload.role,
            },
        )
        .await?;

    Ok(Json(user))
}

/// Deletes a user by ID.
/// Admin only. Administrator accounts are protected.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the question bank with keyword, type and difficulty filters.
/// Admin only.
pub async fn list_questions(
    State(state): State<AppState>,
    Query(params): Query<QuestionListParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = params.filter()?;
    let page = state
        .questions
        .list_questions(&filter, PageRequest::new(params.page, params.page_size))
        .await;

    Ok(Json(page))
}

/// Creates a new quiz question.
/// Admin only.
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = state.questions.create_question(payload.resolve()?).await;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Updates a question by ID. Omitted fields keep their stored values.
/// Admin only.
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let current = state
        .questions
        .get_question(id)
        .await
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    let updated = state
        .questions
        .update_question(id, payload.apply(&current)?)
        .await?;

    Ok(Json(updated))
}

/// Deletes a quiz question by ID.
/// Admin only.
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.questions.delete_question(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
