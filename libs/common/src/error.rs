//! Custom error types for the common library
//!
//! This module defines the store error taxonomy shared by every service
//! repository.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A statement was rejected by a unique constraint
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify an error raised while executing a statement.
    ///
    /// Unique constraint violations are split out so callers can report them
    /// as conflicts instead of opaque failures.
    pub fn from_query(err: SqlxError) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                let constraint = db_err
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| db_err.message().to_string());
                DatabaseError::UniqueViolation(constraint)
            }
            _ => DatabaseError::Query(err),
        }
    }

    /// Whether the error was raised by a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
