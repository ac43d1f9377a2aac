//! Common error types for devwiki

use thiserror::Error;

/// Common result type for devwiki operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the store, the services and the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error, passed through unchanged)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity or tuple is absent
    #[error("{0}")]
    NotFound(String),

    /// Strict-create path hit an existing row
    #[error("{0}")]
    AlreadyExists(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Translate a unique-constraint violation into `AlreadyExists(message)`.
    ///
    /// Any other error is passed through as `Database`.
    pub fn from_insert(err: sqlx::Error, message: &str) -> Self {
        if is_unique_violation(&err) {
            Error::AlreadyExists(message.to_string())
        } else {
            Error::Database(err)
        }
    }
}

/// True when the database rejected a write because of a UNIQUE index.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            // SQLite reports "UNIQUE constraint failed: votes.user_id, ..."
            db_err.is_unique_violation() || db_err.message().contains("UNIQUE constraint")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_displays_bare_message() {
        let err = Error::NotFound("vote not found".to_string());
        assert_eq!(err.to_string(), "vote not found");
    }

    #[test]
    fn test_from_insert_passes_through_non_constraint_errors() {
        let err = Error::from_insert(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(err, Error::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_row_not_found_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
