//! Error types for assay-sampler

use assay_core::DbType;
use assay_db::DbError;
use thiserror::Error;

/// Sampling errors
#[derive(Error, Debug)]
pub enum SamplerError {
    /// No sampler registered for the session's dialect (S001)
    #[error("[S001] No sampler registered for dialect '{db_type}'")]
    UnsupportedDialect { db_type: DbType },

    /// Sample query override is not a single read-only query (S002)
    #[error("[S002] Invalid sample query: {reason}")]
    InvalidSampleQuery { query: String, reason: String },

    /// Sampling settings cannot be applied (S003)
    #[error("[S003] Invalid sampling configuration: {0}")]
    InvalidConfig(String),

    /// Database error while drawing or dropping the sample (S004)
    #[error("[S004] Sampling query failed: {0}")]
    Db(#[from] DbError),
}

/// Result type alias for SamplerError
pub type SamplerResult<T> = Result<T, SamplerError>;
