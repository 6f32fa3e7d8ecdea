//! Error types for assay-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001): authentication, network, SSL, or file access
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Statement interrupted (D004)
    #[error("[D004] Statement interrupted: {0}")]
    Interrupted(String),

    /// Not implemented (D005)
    #[error("[D005] Feature not implemented for {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Internal error (D007)
    #[error("[D007] Internal database error: {0}")]
    Internal(String),

    /// Session already closed (D008)
    #[error("[D008] Database session is closed")]
    Closed,
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error carries no structured variants for these cases, so
        // classify by message with narrow patterns.
        let msg = err.to_string();
        if msg.contains("INTERRUPT") || msg.contains("Interrupted") {
            DbError::Interrupted(msg)
        } else if msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
