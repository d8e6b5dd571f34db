// src/store/memory.rs

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use super::{Page, PageRequest, QuestionRepository, RecordRepository, UserRepository};
use crate::{
    error::AppError,
    models::{
        question::{NewQuestion, Question, QuestionFilter},
        quiz_record::{NewQuizRecord, QuizRecord},
        user::{NewUser, User, UserChanges},
    },
};

/// Monotonic id source. Ids are never handed out twice, even after deletes.
#[derive(Debug)]
struct IdSequence(AtomicI64);

impl IdSequence {
    fn new() -> Self {
        Self(AtomicI64::new(1))
    }

    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Process-local store backing all three repositories.
///
/// Every read-modify-write runs under a single write guard for its collection.
#[derive(Debug)]
pub struct MemoryStore {
    questions: RwLock<Vec<Question>>,
    users: RwLock<Vec<User>>,
    records: RwLock<Vec<QuizRecord>>,
    question_ids: IdSequence,
    user_ids: IdSequence,
    record_ids: IdSequence,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            questions: RwLock::new(Vec::new()),
            users: RwLock::new(Vec::new()),
            records: RwLock::new(Vec::new()),
            question_ids: IdSequence::new(),
            user_ids: IdSequence::new(),
            record_ids: IdSequence::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionRepository for MemoryStore {
    async fn list_questions(&self, filter: &QuestionFilter, page: PageRequest) -> Page<Question> {
        let questions = self.questions.read().await;
        let matching: Vec<Question> = questions
            .iter()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect();
        page.slice(&matching)
    }

    async fn get_question(&self, id: i64) -> Option<Question> {
        self.questions
            .read()
            .await
            .iter()
            .find(|q| q.id == id)
            .cloned()
    }

    async fn random_questions(&self, limit: usize) -> Vec<Question> {
        let mut drawn = self.questions.read().await.clone();
        drawn.shuffle(&mut rand::rng());
        drawn.truncate(limit);
        drawn
    }

    async fn create_question(&self, data: NewQuestion) -> Question {
        let mut questions = self.questions.write().await;
        let question = data.into_question(self.question_ids.next());
        questions.push(question.clone());
        tracing::info!("Question {} created", question.id);
        question
    }

    async fn update_question(&self, id: i64, data: NewQuestion) -> Result<Question, AppError> {
        let mut questions = self.questions.write().await;
        let slot = questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
        *slot = data.into_question(id);
        tracing::info!("Question {} updated", id);
        Ok(slot.clone())
    }

    async fn delete_question(&self, id: i64) -> Result<(), AppError> {
        let mut questions = self.questions.write().await;
        let index = questions
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
        questions.remove(index);
        tracing::info!("Question {} deleted", id);
        Ok(())
    }
}

fn username_taken(users: &[User], username: &str, except: Option<i64>) -> bool {
    users
        .iter()
        .any(|u| u.username == username && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_users(&self, keyword: Option<&str>, page: PageRequest) -> Page<User> {
        let users = self.users.read().await;
        let matching: Vec<User> = users
            .iter()
            .filter(|u| keyword.is_none_or(|k| u.username.contains(k)))
            .cloned()
            .collect();
        page.slice(&matching)
    }

    async fn get_user(&self, id: i64) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    async fn find_by_username(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    async fn create_user(&self, data: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if username_taken(&users, &data.username, None) {
            return Err(AppError::DuplicateUsername(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        let user = User {
            id: self.user_ids.next(),
            username: data.username,
            password: data.password,
            role: data.role,
        };
        users.push(user.clone());
        tracing::info!("User {} ({}) created", user.id, user.username);
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(username) = &changes.username {
            if username_taken(&users, username, Some(id)) {
                return Err(AppError::DuplicateUsername(format!(
                    "Username '{}' already exists",
                    username
                )));
            }
        }

        // Admin role is permanent, like the delete guard below.
        let demoting = changes.role.as_ref().is_some_and(|role| !role.is_admin());
        if demoting && users[index].role.is_admin() {
            return Err(AppError::ProtectedRecord(
                "Administrator accounts cannot be demoted".to_string(),
            ));
        }

        let user = &mut users[index];
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password) = changes.password {
            user.password = password;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        tracing::info!("User {} updated", id);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if users[index].role.is_admin() {
            return Err(AppError::ProtectedRecord(
                "Administrator accounts cannot be deleted".to_string(),
            ));
        }

        let removed = users.remove(index);
        tracing::info!("User {} ({}) deleted", removed.id, removed.username);
        Ok(())
    }
}

#[async_trait]
impl RecordRepository for MemoryStore {
    async fn append_record(&self, data: NewQuizRecord) -> Result<QuizRecord, AppError> {
        let mut records = self.records.write().await;
        let record = QuizRecord {
            id: self.record_ids.next(),
            user_id: data.user_id,
            score: data.score,
            duration: data.duration,
            date: data.date,
        };
        records.push(record.clone());
        tracing::info!(
            "Quiz record {} stored for user {} (score {})",
            record.id,
            record.user_id,
            record.score
        );
        Ok(record)
    }

    async fn records_for_user(&self, user_id: i64) -> Vec<QuizRecord> {
        let mut mine: Vec<QuizRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        mine
    }

    async fn top_records(&self, limit: usize) -> Vec<QuizRecord> {
        let mut all = self.records.read().await.clone();
        all.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.duration.cmp(&b.duration))
                .then(a.id.cmp(&b.id))
        });
        all.truncate(limit);
        all
    }
}
