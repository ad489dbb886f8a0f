//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Unique constraint violated
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    /// Stored value could not be mapped to a domain type
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Check if this is a unique constraint violation
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.constraint().unwrap_or("unknown").to_string())
            }
            _ => Self::Sqlx(err),
        }
    }
}

/// Result type for repository operations
pub type DbResult<T> = Result<T, DbError>;
