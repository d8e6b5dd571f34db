// src/models/quiz_record.rs

use serde::{Deserialize, Serialize};

use crate::grading::{GradeReport, SubmittedAnswer};

/// One completed quiz attempt. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: i64,
    pub user_id: i64,
    pub score: u32,
    /// Elapsed seconds as measured by the client timer.
    pub duration: u64,
    pub date: chrono::DateTime<chrono::Utc>,
}

/// Field values for appending a record; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewQuizRecord {
    pub user_id: i64,
    pub score: u32,
    pub duration: u64,
    pub date: chrono::DateTime<chrono::Utc>,
}

/// Aggregated struct for displaying the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
    pub duration: u64,
    pub date: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordQuizRequest {
    /// Question ids in the order they were presented.
    pub questions: Vec<i64>,

    /// Parallel to `questions`; `null` means unanswered.
    pub answers: Vec<Option<SubmittedAnswer>>,

    /// Score as computed by the client. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,

    #[serde(default)]
    pub duration: u64,
}

/// Result of a submitted attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordQuizResponse {
    #[serde(flatten)]
    pub result: GradeReport,
    pub total_questions: usize,

    /// `None` when the attempt was graded but could not be stored.
    pub record: Option<QuizRecord>,
}
