// src/handlers/quiz.rs

use std::collections::{HashMap, HashSet};

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    grading::grade,
    models::{
        question::{PublicQuestion, Question, RandomParams},
        quiz_record::{LeaderboardEntry, NewQuizRecord, RecordQuizRequest, RecordQuizResponse},
    },
    state::AppState,
    utils::token::Session,
};

pub const DEFAULT_QUIZ_SIZE: usize = 10;
pub const MAX_QUIZ_SIZE: usize = 100;
const LEADERBOARD_SIZE: usize = 5;

/// Draws a random quiz without replacement.
/// Returns the questions without the correct answers.
pub async fn random_questions(
    State(state): State<AppState>,
    Query(params): Query<RandomParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_QUIZ_SIZE).min(MAX_QUIZ_SIZE);
    let paper: Vec<PublicQuestion> = state
        .questions
        .random_questions(limit)
        .await
        .iter()
        .map(Question::public)
        .collect();

    Ok(Json(paper))
}

/// Grades a finished attempt and records it for the caller.
///
/// * Re-grades from the stored answer keys; a client-side score is only compared.
/// * Each question id may appear once, matching a draw without replacement.
/// * Stores a `QuizRecord`. If that fails the grade is still returned, with `record: null`.
pub async fn record_quiz(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<RecordQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.questions.is_empty() {
        return Err(AppError::BadRequest("No questions submitted".to_string()));
    }
    if req.answers.len() > req.questions.len() {
        return Err(AppError::BadRequest(format!(
            "Got {} answers for {} questions",
            req.answers.len(),
            req.questions.len()
        )));
    }

    let mut seen = HashSet::with_capacity(req.questions.len());
    if let Some(repeated) = req.questions.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::BadRequest(format!(
            "Question {} appears more than once",
            repeated
        )));
    }

    let mut questions = Vec::with_capacity(req.questions.len());
    for id in &req.questions {
        let question = state
            .questions
            .get_question(*id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?;
        questions.push(question);
    }

    let report = grade(&questions, &req.answers);

    if let Some(claimed) = req.score {
        if claimed != report.total_score {
            tracing::warn!(
                "User {} claimed score {} but graded {}",
                session.user.id,
                claimed,
                report.total_score
            );
        }
    }

    let record = match state
        .records
        .append_record(NewQuizRecord {
            user_id: session.user.id,
            score: report.total_score,
            duration: req.duration,
            date: chrono::Utc::now(),
        })
        .await
    {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::error!("Failed to save quiz record for user {}: {}", session.user.id, e);
            None
        }
    };

    Ok(Json(RecordQuizResponse {
        result: report,
        total_questions: questions.len(),
        record,
    }))
}

/// The caller's past attempts, newest first.
pub async fn my_records(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.records.records_for_user(session.user.id).await))
}

/// Retrieves the top 5 high scores from the leaderboard.
/// Attempts by since-deleted users are skipped.
pub async fn leaderboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut names: HashMap<i64, Option<String>> = HashMap::new();
    let mut entries = Vec::with_capacity(LEADERBOARD_SIZE);

    // Over-fetch so skipped records do not shrink the board.
    for record in state.records.top_records(LEADERBOARD_SIZE * 4).await {
        if entries.len() == LEADERBOARD_SIZE {
            break;
        }
        let username = match names.get(&record.user_id) {
            Some(cached) => cached.clone(),
            None => {
                let found = state.users.get_user(record.user_id).await.map(|u| u.username);
                names.insert(record.user_id, found.clone());
                found
            }
        };
        if let Some(username) = username {
            entries.push(LeaderboardEntry {
                username,
                score: record.score,
                duration: record.duration,
                date: record.date,
            });
        }
    }

    Ok(Json(entries))
}
