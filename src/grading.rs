// src/grading.rs

//! Answer checking and score computation for a single quiz attempt.

use serde::{Deserialize, Serialize};

use crate::models::question::{AnswerKey, IndexToken, Question};

/// What a quiz taker submitted for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    /// A single option index, for single-choice and true/false questions.
    One(IndexToken),
    /// A set of option indices, for multi-choice questions.
    Many(Vec<IndexToken>),
}

impl SubmittedAnswer {
    pub fn one(index: usize) -> Self {
        SubmittedAnswer::One(IndexToken::Text(index.to_string()))
    }

    pub fn many<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        SubmittedAnswer::Many(
            indices
                .into_iter()
                .map(|i| IndexToken::Text(i.to_string()))
                .collect(),
        )
    }
}

/// Per-question grading result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: i64,
    pub correct: bool,
    pub points: u32,
}

/// Aggregate result of one attempt.
/// `correct_count + wrong_count` always equals the number of questions graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
    #[serde(rename = "score")]
    pub total_score: u32,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub outcomes: Vec<QuestionOutcome>,
}

/// Checks one submission against a stored answer key.
///
/// Single-valued kinds compare index strings exactly. Multi-choice compares
/// as a set: equal length and equal once both sides are sorted. There is no
/// partial credit.
pub fn is_correct(key: &AnswerKey, submitted: Option<&SubmittedAnswer>) -> bool {
    let Some(submitted) = submitted else {
        return false;
    };

    match (key, submitted) {
        (AnswerKey::SingleChoice(i) | AnswerKey::TrueFalse(i), SubmittedAnswer::One(token)) => {
            token.to_text() == i.to_string()
        }
        (AnswerKey::MultiChoice(expected), SubmittedAnswer::Many(tokens)) => {
            if tokens.len() != expected.len() {
                return false;
            }
            let mut given: Vec<String> = tokens.iter().map(IndexToken::to_text).collect();
            let mut wanted: Vec<String> = expected.iter().map(usize::to_string).collect();
            given.sort();
            wanted.sort();
            given == wanted
        }
        _ => false,
    }
}

/// Grades an attempt. `answers` is parallel to `questions`; missing trailing
/// entries count as unanswered and surplus entries are ignored.
pub fn grade(questions: &[Question], answers: &[Option<SubmittedAnswer>]) -> GradeReport {
    let mut total_score = 0;
    let mut correct_count = 0;
    let mut outcomes = Vec::with_capacity(questions.len());

    for (index, question) in questions.iter().enumerate() {
        let submitted = answers.get(index).and_then(Option::as_ref);
        let correct = is_correct(&question.answer, submitted);
        let points = if correct {
            question.difficulty.weight()
        } else {
            0
        };

        total_score += points;
        if correct {
            correct_count += 1;
        }
        outcomes.push(QuestionOutcome {
            question_id: question.id,
            correct,
            points,
        });
    }

    GradeReport {
        total_score,
        correct_count,
        wrong_count: questions.len() - correct_count,
        outcomes,
    }
}
