// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    error::AppError,
    store::{MemoryStore, QuestionRepository, RecordRepository, UserRepository, seed},
    utils::hash::PasswordPolicy,
};

#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<dyn QuestionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub records: Arc<dyn RecordRepository>,
    pub config: Config,
    pub passwords: PasswordPolicy,
}

impl AppState {
    /// Builds state over a fresh `MemoryStore`: bootstrap admin first,
    /// then the demo data set when `config.seed_demo_data` is on.
    pub async fn in_memory(config: Config) -> Result<Self, AppError> {
        let store = Arc::new(MemoryStore::new());
        let passwords = PasswordPolicy::from_flag(config.hash_passwords);

        seed::seed_admin(store.as_ref(), &config, passwords).await?;
        if config.seed_demo_data {
            seed::seed_demo_data(store.as_ref(), passwords).await?;
        }

        Ok(Self {
            questions: store.clone(),
            users: store.clone(),
            records: store,
            config,
            passwords,
        })
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
