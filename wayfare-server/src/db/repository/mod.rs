//! Repository Module
//!
//! SQLite CRUD 操作。所有函数接收 `&SqlitePool`，事务性操作自行
//! `begin`/`commit`。

// Identity
pub mod user;

// Catalog
pub mod combo;
pub mod service;

// Booking domain
pub mod booking;
pub mod coupon;
pub mod payment;

// Social
pub mod chat;
pub mod post;
pub mod review;

// Platform
pub mod notification;
pub mod stats;
pub mod upgrade;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(err.to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// 序列化 JSON 数组列 (image_urls / document_urls)
pub(crate) fn to_json_array(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// 反序列化 JSON 数组列，坏数据退化为空数组
pub(crate) fn from_json_array(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
