// src/models/mod.rs

pub mod question;
pub mod quiz_record;
pub mod user;
