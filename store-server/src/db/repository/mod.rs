//! Repository Module
//!
//! CRUD operations over the SQLite schema. Repositories are free functions
//! taking `&SqlitePool`; multi-step writes use explicit transactions.

pub mod checkout;
pub mod order;
pub mod product;
pub mod promo_code;
pub mod sequence;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
