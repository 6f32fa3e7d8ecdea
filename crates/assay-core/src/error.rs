//! Error types for assay-core

use thiserror::Error;

/// Core error type for Assay
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Suite file not found
    #[error("[E001] Suite file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Malformed entity link
    #[error("[E003] Invalid entity link '{link}': {reason}")]
    InvalidEntityLink { link: String, reason: String },

    /// E004: Test case references a definition that is not declared
    #[error("[E004] Test case '{test_case}' references unknown test definition '{definition}'")]
    UnknownTestDefinition {
        test_case: String,
        definition: String,
    },

    /// E005: Duplicate entity in a suite file
    #[error("[E005] Duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },

    /// E006: Test case parameter could not be interpreted
    #[error("[E006] Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] Suite parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
