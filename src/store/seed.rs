// src/store/seed.rs

use chrono::{NaiveDate, TimeZone, Utc};

use super::{QuestionRepository, RecordRepository, UserRepository};
use crate::{
    config::Config,
    error::AppError,
    models::{
        question::{AnswerPayload, Difficulty, IndexToken, QuestionKind, resolve_question},
        quiz_record::NewQuizRecord,
        user::{NewUser, Role},
    },
    utils::hash::PasswordPolicy,
};

const DEMO_USERS: [&str; 4] = ["user1", "user2", "user3", "user4"];
const DEMO_PASSWORD: &str = "user123";

/// (content, kind, difficulty, options, answer indices)
const DEMO_QUESTIONS: &[(&str, QuestionKind, Difficulty, &[&str], &[usize])] = &[
    (
        "React的核心思想是什么？",
        QuestionKind::SingleChoice,
        Difficulty::Medium,
        &["组件化", "响应式", "单向数据流", "虚拟DOM"],
        &[0],
    ),
    (
        "以下哪些是JavaScript的基本数据类型？",
        QuestionKind::MultiChoice,
        Difficulty::Medium,
        &["String", "Number", "Boolean", "Object"],
        &[0, 1, 2],
    ),
    (
        "CSS盒模型包括margin、padding、border和content四个部分。",
        QuestionKind::TrueFalse,
        Difficulty::Easy,
        &["对", "错"],
        &[0],
    ),
    (
        "以下哪个不是React的生命周期方法？",
        QuestionKind::SingleChoice,
        Difficulty::Hard,
        &["componentDidMount", "componentWillUnmount", "render", "componentWillUpdate"],
        &[3],
    ),
    (
        "以下哪些是HTTP的常用请求方法？",
        QuestionKind::MultiChoice,
        Difficulty::Medium,
        &["GET", "POST", "PUT", "DELETE"],
        &[0, 1, 2, 3],
    ),
    (
        "JavaScript是一种强类型语言。",
        QuestionKind::TrueFalse,
        Difficulty::Easy,
        &["对", "错"],
        &[1],
    ),
    (
        "以下哪个是React的状态管理库？",
        QuestionKind::SingleChoice,
        Difficulty::Medium,
        &["Redux", "Vuex", "MobX", "All of the above"],
        &[3],
    ),
    (
        "以下哪些是CSS预处理器？",
        QuestionKind::MultiChoice,
        Difficulty::Medium,
        &["Sass", "Less", "Stylus", "PostCSS"],
        &[0, 1, 2],
    ),
    (
        "HTML5新增的语义化标签包括header、footer、nav等。",
        QuestionKind::TrueFalse,
        Difficulty::Easy,
        &["对", "错"],
        &[0],
    ),
    (
        "以下哪个是JavaScript的异步编程解决方案？",
        QuestionKind::SingleChoice,
        Difficulty::Hard,
        &["Promise", "async/await", "Generator", "All of the above"],
        &[3],
    ),
    (
        "以下哪个是React的UI组件库？",
        QuestionKind::SingleChoice,
        Difficulty::Easy,
        &["Ant Design", "Element UI", "Bootstrap", "Materialize"],
        &[0],
    ),
    (
        "以下哪些是浏览器的存储方式？",
        QuestionKind::MultiChoice,
        Difficulty::Medium,
        &["localStorage", "sessionStorage", "Cookie", "IndexedDB"],
        &[0, 1, 2, 3],
    ),
];

/// (username, score, duration seconds, date)
const DEMO_RECORDS: [(&str, u32, u64, (i32, u32, u32, u32, u32)); 3] = [
    ("user1", 85, 120, (2024, 1, 15, 10, 30)),
    ("user2", 90, 110, (2024, 1, 16, 14, 20)),
    ("user1", 75, 130, (2024, 1, 17, 9, 45)),
];

/// Creates the bootstrap admin account if it does not exist yet.
pub async fn seed_admin<U: UserRepository + ?Sized>(
    users: &U,
    config: &Config,
    policy: PasswordPolicy,
) -> Result<(), AppError> {
    if users.find_by_username(&config.admin_username).await.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", config.admin_username);
    users
        .create_user(NewUser {
            username: config.admin_username.clone(),
            password: policy.digest(&config.admin_password)?,
            role: Role::Admin,
        })
        .await?;
    Ok(())
}

/// Loads the demo roster, question bank and attempt history.
/// Run after `seed_admin` so the admin keeps id 1. History is attached by username.
pub async fn seed_demo_data<S>(store: &S, policy: PasswordPolicy) -> Result<(), AppError>
where
    S: QuestionRepository + UserRepository + RecordRepository + ?Sized,
{
    for username in DEMO_USERS {
        if store.find_by_username(username).await.is_none() {
            store
                .create_user(NewUser {
                    username: username.to_string(),
                    password: policy.digest(DEMO_PASSWORD)?,
                    role: Role::Regular,
                })
                .await?;
        }
    }

    for (content, kind, difficulty, options, answer) in DEMO_QUESTIONS {
        let answer = match kind {
            QuestionKind::MultiChoice => AnswerPayload::Many(
                answer.iter().map(|&i| IndexToken::Number(i as u64)).collect(),
            ),
            _ => AnswerPayload::One(IndexToken::Number(answer.first().copied().unwrap_or_default() as u64)),
        };
        let question = resolve_question(
            content.to_string(),
            *kind,
            *difficulty,
            options.iter().map(|s| s.to_string()).collect(),
            answer,
        )?;
        store.create_question(question).await;
    }

    for (username, score, duration, (y, m, d, hh, mm)) in DEMO_RECORDS {
        let user_id = store
            .find_by_username(username)
            .await
            .map(|u| u.id)
            .ok_or_else(|| {
                AppError::InternalServerError(format!("Seed user {} missing", username))
            })?;
        let date = NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|day| day.and_hms_opt(hh, mm, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| AppError::InternalServerError("Invalid seed date".to_string()))?;
        store
            .append_record(NewQuizRecord {
                user_id,
                score,
                duration,
                date,
            })
            .await?;
    }

    tracing::info!(
        "Demo data loaded: {} users, {} questions, {} records",
        DEMO_USERS.len(),
        DEMO_QUESTIONS.len(),
        DEMO_RECORDS.len()
    );
    Ok(())
}
