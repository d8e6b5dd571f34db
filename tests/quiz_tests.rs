// tests/quiz_tests.rs

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use quiz_backend::{
    config::Config,
    error::AppError,
    models::quiz_record::{NewQuizRecord, QuizRecord},
    routes,
    state::AppState,
    store::RecordRepository,
};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let state = AppState::in_memory(Config::default()).await.unwrap();
    routes::create_router(state)
}

async fn call(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// user1 is seeded with id 2, so its mock token is fixed.
const USER1: &str = "mock-token-2";

#[tokio::test]
async fn random_draw_hides_answers_and_respects_limit() {
    let app = app().await;

    let (status, body) = call(&app, "GET", "/api/questions/random?limit=5", Some(USER1), None).await;
    assert_eq!(status, StatusCode::OK);
    let questions = body.as_array().unwrap();
    assert_eq!(questions.len(), 5);
    for q in questions {
        assert!(q.get("answer").is_none());
        assert!(q["options"].is_array());
    }

    let mut ids: Vec<i64> = questions.iter().map(|q| q["id"].as_i64().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);

    let (_, body) = call(&app, "GET", "/api/questions/random", Some(USER1), None).await;
    assert_eq!(body.as_array().unwrap().len(), 10);

    let (_, body) = call(&app, "GET", "/api/questions/random?limit=50", Some(USER1), None).await;
    assert_eq!(body.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn record_grades_from_stored_keys() {
    let app = app().await;

    // Seeded keys: 1 single medium "0", 2 multi medium [0,1,2], 3 true/false easy "0", 4 single hard "3"
    let attempt = json!({
        "questions": [1, 2, 3, 4],
        "answers": ["0", ["2", "0", "1"], null, "2"],
        "score": 999,
        "duration": 95
    });
    let (status, body) = call(&app, "POST", "/api/quiz/record", Some(USER1), Some(attempt)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 30);
    assert_eq!(body["correct_count"], 2);
    assert_eq!(body["wrong_count"], 2);
    assert_eq!(body["total_questions"], 4);
    assert_eq!(body["record"]["userId"], 2);
    assert_eq!(body["record"]["score"], 30);

    let (status, history) = call(&app, "GET", "/api/quiz/records", Some(USER1), None).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    // Two seeded attempts plus this one, newest first
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["score"], 30);
    assert_eq!(history[0]["duration"], 95);
}

#[tokio::test]
async fn record_rejects_malformed_attempts() {
    let app = app().await;

    let empty = json!({"questions": [], "answers": [], "duration": 1});
    let (status, _) = call(&app, "POST", "/api/quiz/record", Some(USER1), Some(empty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let too_many = json!({"questions": [1], "answers": ["0", "1"], "duration": 1});
    let (status, _) = call(&app, "POST", "/api/quiz/record", Some(USER1), Some(too_many)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let repeated = json!({"questions": [4, 4, 4], "answers": ["3", "3", "3"], "duration": 1});
    let (status, body) = call(&app, "POST", "/api/quiz/record", Some(USER1), Some(repeated)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    let (_, board) = call(&app, "GET", "/api/quiz/leaderboard", Some(USER1), None).await;
    assert_eq!(board[0]["score"], 90);

    let unknown = json!({"questions": [404], "answers": ["0"], "duration": 1});
    let (status, body) = call(&app, "POST", "/api/quiz/record", Some(USER1), Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = call(&app, "POST", "/api/quiz/record", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn leaderboard_lists_top_scores_with_usernames() {
    let app = app().await;

    let (status, board) = call(&app, "GET", "/api/quiz/leaderboard", Some(USER1), None).await;
    assert_eq!(status, StatusCode::OK);
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 3);
    assert_eq!(board[0]["username"], "user2");
    assert_eq!(board[0]["score"], 90);
    assert_eq!(board[1]["username"], "user1");
    assert_eq!(board[1]["score"], 85);
}

struct BrokenRecords;

#[async_trait]
impl RecordRepository for BrokenRecords {
    async fn append_record(&self, _data: NewQuizRecord) -> Result<QuizRecord, AppError> {
        Err(AppError::InternalServerError("disk full".to_string()))
    }

    async fn records_for_user(&self, _user_id: i64) -> Vec<QuizRecord> {
        Vec::new()
    }

    async fn top_records(&self, _limit: usize) -> Vec<QuizRecord> {
        Vec::new()
    }
}

#[tokio::test]
async fn failed_record_still_returns_the_grade() {
    let mut state = AppState::in_memory(Config::default()).await.unwrap();
    state.records = Arc::new(BrokenRecords);
    let app = routes::create_router(state);

    let attempt = json!({"questions": [3, 6], "answers": ["0", "1"], "duration": 20});
    let (status, body) = call(&app, "POST", "/api/quiz/record", Some(USER1), Some(attempt)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 20);
    assert_eq!(body["correct_count"], 2);
    assert!(body["record"].is_null());
}
