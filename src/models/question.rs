// src/models/question.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer};
use validator::Validate;

use crate::{error::AppError, utils::html::clean_html};

const MAX_OPTION_LEN: usize = 500;

/// Question type. Accepts the legacy numeric codes `"1"`, `"2"`, `"3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "single", alias = "1", alias = "single_choice")]
    SingleChoice,
    #[serde(rename = "multiple", alias = "2", alias = "multi_choice")]
    MultiChoice,
    #[serde(rename = "true_false", alias = "3", alias = "boolean")]
    TrueFalse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[serde(alias = "1")]
    Easy,
    #[serde(alias = "2")]
    Medium,
    #[serde(alias = "3")]
    Hard,
}

impl Difficulty {
    /// Points awarded for answering a question of this difficulty correctly.
    pub fn weight(self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 15,
            Difficulty::Hard => 20,
        }
    }
}

/// The stored answer, typed by question kind.
/// Indices always point into the question's `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    SingleChoice(usize),
    MultiChoice(BTreeSet<usize>),
    TrueFalse(usize),
}

impl AnswerKey {
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerKey::SingleChoice(_) => QuestionKind::SingleChoice,
            AnswerKey::MultiChoice(_) => QuestionKind::MultiChoice,
            AnswerKey::TrueFalse(_) => QuestionKind::TrueFalse,
        }
    }

    /// Wire form: `"2"` for single-valued kinds, `["0", "1"]` for multi-choice.
    pub fn to_payload(&self) -> AnswerPayload {
        match self {
            AnswerKey::SingleChoice(i) | AnswerKey::TrueFalse(i) => {
                AnswerPayload::One(IndexToken::Text(i.to_string()))
            }
            AnswerKey::MultiChoice(set) => AnswerPayload::Many(
                set.iter().map(|i| IndexToken::Text(i.to_string())).collect(),
            ),
        }
    }
}

/// A question in the bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub content: String,
    pub difficulty: Difficulty,
    pub options: Vec<String>,
    pub answer: AnswerKey,
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        self.answer.kind()
    }

    pub fn public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id,
            question_type: self.kind(),
            content: self.content.clone(),
            difficulty: self.difficulty,
            options: self.options.clone(),
        }
    }
}

#[derive(Serialize)]
struct QuestionWire<'a> {
    id: i64,
    content: &'a str,
    #[serde(rename = "type")]
    question_type: QuestionKind,
    difficulty: Difficulty,
    options: &'a [String],
    answer: AnswerPayload,
}

impl Serialize for Question {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        QuestionWire {
            id: self.id,
            content: &self.content,
            question_type: self.kind(),
            difficulty: self.difficulty,
            options: &self.options,
            answer: self.answer.to_payload(),
        }
        .serialize(serializer)
    }
}

/// DTO for sending a question to a quiz taker (excludes the answer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionKind,
    pub content: String,
    pub difficulty: Difficulty,
    pub options: Vec<String>,
}

/// Resolved field values for inserting or replacing a question; the store owns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub content: String,
    pub difficulty: Difficulty,
    pub options: Vec<String>,
    pub answer: AnswerKey,
}

impl NewQuestion {
    pub fn into_question(self, id: i64) -> Question {
        Question {
            id,
            content: self.content,
            difficulty: self.difficulty,
            options: self.options,
            answer: self.answer,
        }
    }
}

/// An option index as sent by clients: `"1"` or `1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexToken {
    Text(String),
    Number(u64),
}

impl IndexToken {
    pub fn to_text(&self) -> String {
        match self {
            IndexToken::Text(s) => s.clone(),
            IndexToken::Number(n) => n.to_string(),
        }
    }
}

/// Answer as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerPayload {
    One(IndexToken),
    Many(Vec<IndexToken>),
}

impl AnswerPayload {
    /// Flattens to index strings, unpacking a JSON-encoded array such as `"[\"0\",\"2\"]"`.
    fn tokens(self) -> Result<Vec<String>, AppError> {
        match self {
            AnswerPayload::One(IndexToken::Text(text)) if text.trim_start().starts_with('[') => {
                let inner: Vec<IndexToken> = serde_json::from_str(&text)
                    .map_err(|e| AppError::BadRequest(format!("Malformed answer list: {}", e)))?;
                Ok(inner.iter().map(IndexToken::to_text).collect())
            }
            AnswerPayload::One(token) => Ok(vec![token.to_text()]),
            AnswerPayload::Many(tokens) => Ok(tokens.iter().map(IndexToken::to_text).collect()),
        }
    }
}

/// Option list as it appears on the wire: an array, or a JSON string holding one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionList {
    List(Vec<String>),
    Encoded(String),
}

impl OptionList {
    fn into_vec(self) -> Result<Vec<String>, AppError> {
        match self {
            OptionList::List(list) => Ok(list),
            OptionList::Encoded(text) => serde_json::from_str(&text)
                .map_err(|e| AppError::BadRequest(format!("Malformed option list: {}", e))),
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[serde(rename = "type")]
    pub question_type: QuestionKind,
    pub difficulty: Difficulty,
    pub options: OptionList,
    pub answer: AnswerPayload,
}

impl CreateQuestionRequest {
    pub fn resolve(self) -> Result<NewQuestion, AppError> {
        self.validate()?;
        resolve_question(
            self.content,
            self.question_type,
            self.difficulty,
            self.options.into_vec()?,
            self.answer,
        )
    }
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionKind>,
    pub difficulty: Option<Difficulty>,
    pub options: Option<OptionList>,
    pub answer: Option<AnswerPayload>,
}

impl UpdateQuestionRequest {
    /// Overlays the supplied fields on `current` and re-resolves the result.
    pub fn apply(self, current: &Question) -> Result<NewQuestion, AppError> {
        self.validate()?;
        let options = match self.options {
            Some(list) => list.into_vec()?,
            None => current.options.clone(),
        };
        resolve_question(
            self.content.unwrap_or_else(|| current.content.clone()),
            self.question_type.unwrap_or_else(|| current.kind()),
            self.difficulty.unwrap_or(current.difficulty),
            options,
            self.answer.unwrap_or_else(|| current.answer.to_payload()),
        )
    }
}

/// Turns loosely-typed authoring input into a checked question.
///
/// Blank options are dropped and answer indices are renumbered to match,
/// so an answer can never drift onto a different option.
pub fn resolve_question(
    content: String,
    kind: QuestionKind,
    difficulty: Difficulty,
    raw_options: Vec<String>,
    answer: AnswerPayload,
) -> Result<NewQuestion, AppError> {
    let content = clean_html(content.trim());
    if content.is_empty() {
        return Err(AppError::BadRequest("Question content is required".to_string()));
    }

    let mut options = Vec::with_capacity(raw_options.len());
    let mut renumbered: Vec<Option<usize>> = Vec::with_capacity(raw_options.len());
    for option in &raw_options {
        let trimmed = option.trim();
        if trimmed.is_empty() {
            renumbered.push(None);
            continue;
        }
        if trimmed.chars().count() > MAX_OPTION_LEN {
            return Err(AppError::BadRequest("Option is too long".to_string()));
        }
        renumbered.push(Some(options.len()));
        options.push(clean_html(trimmed));
    }

    if options.is_empty() {
        return Err(AppError::BadRequest("At least one option is required".to_string()));
    }
    if kind == QuestionKind::TrueFalse && options.len() != 2 {
        return Err(AppError::BadRequest(
            "True/false questions need exactly two options".to_string(),
        ));
    }

    let mut indices = Vec::new();
    for token in answer.tokens()? {
        let raw: usize = token
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Answer '{}' is not an option index", token)))?;
        let mapped = renumbered
            .get(raw)
            .copied()
            .ok_or_else(|| AppError::BadRequest(format!("Answer index {} is out of range", raw)))?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Answer index {} points at a blank option", raw))
            })?;
        indices.push(mapped);
    }

    let answer = match kind {
        QuestionKind::MultiChoice => {
            if indices.is_empty() {
                return Err(AppError::BadRequest(
                    "Multiple choice questions need at least one answer".to_string(),
                ));
            }
            AnswerKey::MultiChoice(indices.into_iter().collect())
        }
        QuestionKind::SingleChoice | QuestionKind::TrueFalse => {
            let &[index] = indices.as_slice() else {
                return Err(AppError::BadRequest(
                    "This question type takes exactly one answer".to_string(),
                ));
            };
            if kind == QuestionKind::TrueFalse {
                AnswerKey::TrueFalse(index)
            } else {
                AnswerKey::SingleChoice(index)
            }
        }
    };

    Ok(NewQuestion {
        content,
        difficulty,
        options,
        answer,
    })
}

/// Query parameters for listing the question bank.
/// Empty strings mean "no filter", matching what form-driven clients send.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionListParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub keyword: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
    pub difficulty: Option<String>,
}

/// Filters applied before pagination.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    pub keyword: Option<String>,
    pub kind: Option<QuestionKind>,
    pub difficulty: Option<Difficulty>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        self.keyword
            .as_deref()
            .is_none_or(|k| question.content.contains(k))
            && self.kind.is_none_or(|k| question.kind() == k)
            && self.difficulty.is_none_or(|d| question.difficulty == d)
    }
}

impl QuestionListParams {
    pub fn filter(&self) -> Result<QuestionFilter, AppError> {
        Ok(QuestionFilter {
            keyword: non_empty(&self.keyword).map(str::to_string),
            kind: non_empty(&self.question_type).map(parse_code).transpose()?,
            difficulty: non_empty(&self.difficulty).map(parse_code).transpose()?,
        })
    }
}

/// Query parameters for drawing a quiz.
#[derive(Debug, Default, Deserialize)]
pub struct RandomParams {
    pub limit: Option<usize>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_code<T: for<'de> Deserialize<'de>>(code: &str) -> Result<T, AppError> {
    serde_json::from_value(serde_json::Value::String(code.to_string()))
        .map_err(|_| AppError::BadRequest(format!("Unknown filter value '{}'", code)))
}
