// src/store/mod.rs

//! Storage capabilities used by the handlers.
//!
//! Handlers only see these traits; `MemoryStore` is the process-local
//! implementation and a persistent engine can be slotted in behind them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{
        question::{NewQuestion, Question, QuestionFilter},
        quiz_record::{NewQuizRecord, QuizRecord},
        user::{NewUser, User, UserChanges},
    },
};

pub mod memory;
pub mod seed;

pub use memory::MemoryStore;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Offset pagination request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Applies defaults: page 1, 10 per page, at most 100 per page.
    pub fn new(page: Option<usize>, page_size: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Half-open `[start, start + page_size)` slice of `items`.
    /// Pages past the end are empty; `total` always counts every item.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Page<T> {
        let start = (self.page - 1).saturating_mul(self.page_size);
        let end = start.saturating_add(self.page_size).min(items.len());
        let page_items = if start < items.len() {
            items[start..end].to_vec()
        } else {
            Vec::new()
        };
        Page {
            items: page_items,
            total: items.len(),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    pub total: usize,
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Content substring match, then exact type and difficulty match, then pagination.
    async fn list_questions(&self, filter: &QuestionFilter, page: PageRequest) -> Page<Question>;

    async fn get_question(&self, id: i64) -> Option<Question>;

    /// Up to `limit` distinct questions in random order.
    async fn random_questions(&self, limit: usize) -> Vec<Question>;

    async fn create_question(&self, data: NewQuestion) -> Question;

    async fn update_question(&self, id: i64, data: NewQuestion) -> Result<Question, AppError>;

    async fn delete_question(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Username substring match, then pagination.
    async fn list_users(&self, keyword: Option<&str>, page: PageRequest) -> Page<User>;

    async fn get_user(&self, id: i64) -> Option<User>;

    async fn find_by_username(&self, username: &str) -> Option<User>;

    /// Fails with `DuplicateUsername` if the name is taken.
    async fn create_user(&self, data: NewUser) -> Result<User, AppError>;

    /// Fails with `NotFound`, or `DuplicateUsername` if another account has the new name.
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, AppError>;

    /// Fails with `NotFound`, or `ProtectedRecord` for admin accounts.
    async fn delete_user(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn append_record(&self, data: NewQuizRecord) -> Result<QuizRecord, AppError>;

    /// Attempts by one user, newest first.
    async fn records_for_user(&self, user_id: i64) -> Vec<QuizRecord>;

    /// Highest scores first; ties go to the shorter duration.
    async fn top_records(&self, limit: usize) -> Vec<QuizRecord>;
}
