//! Error types for assay-test

use crate::interface::InterfaceState;
use assay_core::{CoreError, EntityType};
use assay_db::DbError;
use assay_sampler::SamplerError;
use std::time::Duration;
use thiserror::Error;

/// Bounded query runner errors
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Query exceeded the runner's timeout (T001)
    #[error("[T001] Query exceeded the {}s timeout", timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    /// Query failed (T002)
    #[error("[T002] Query failed: {0}")]
    Query(#[from] DbError),

    /// Result could not be read as the expected type (T003)
    #[error("[T003] Unexpected query result: {0}")]
    UnexpectedResult(String),
}

impl RunnerError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunnerError::Timeout { .. })
    }
}

/// Result type alias for RunnerError
pub type RunnerResult<T> = Result<T, RunnerError>;

/// A test case's definition or validator could not be found
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// No validator registered for the definition (T010)
    #[error("[T010] No validator registered for {entity_type} test '{name}'")]
    UnknownValidator { entity_type: EntityType, name: String },

    /// The catalog has no such test definition (T011)
    #[error("[T011] Unknown test definition: {0}")]
    UnknownDefinition(String),
}

/// Runtime parameter setter errors
#[derive(Error, Debug)]
pub enum ParameterError {
    /// The setter could not compute its parameters (T020)
    #[error("[T020] Could not compute runtime parameters: {0}")]
    Unresolvable(String),

    /// Catalog lookup failed (T021)
    #[error("[T021] Catalog lookup for runtime parameters failed: {0}")]
    Catalog(#[from] CatalogError),

    /// Live data query failed (T022)
    #[error("[T022] Query for runtime parameters failed: {0}")]
    Sampler(#[from] SamplerError),

    /// Parameters could not be serialized (T023)
    #[error("[T023] Runtime parameters are not serializable: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for ParameterError
pub type ParameterResult<T> = Result<T, ParameterError>;

/// Catalog client errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Entity not present in the catalog (T030)
    #[error("[T030] {kind} not found in catalog: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Catalog could not be reached (T031)
    #[error("[T031] Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while a validator runs
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// Query through the runner failed (T040)
    #[error("[T040] {0}")]
    Runner(#[from] RunnerError),

    /// A test parameter is missing or malformed (T041)
    #[error("[T041] Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// The targeted column does not exist in the table (T042)
    #[error("[T042] Column '{column}' not found in {table}")]
    MissingColumn { column: String, table: String },

    /// Anything else going wrong inside a validator (T043)
    #[error("[T043] Validator failed: {0}")]
    Internal(String),
}

impl From<CoreError> for ValidatorError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidParameter { name, message } => {
                ValidatorError::InvalidParameter { name, message }
            }
            other => ValidatorError::Internal(other.to_string()),
        }
    }
}

/// Result type alias for ValidatorError
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Errors building a test suite interface
#[derive(Error, Debug)]
pub enum InterfaceError {
    /// Session could not be opened (T050)
    #[error("[T050] Could not open session: {0}")]
    Connection(#[source] DbError),

    /// No sampler for the session's dialect (T051)
    #[error("[T051] {0}")]
    UnsupportedDialect(#[source] SamplerError),

    /// Table does not exist in the database (T052)
    #[error("[T052] Table '{table}' not found in the database")]
    TableNotFound { table: String },

    /// A builder step ran before the one it depends on (T053)
    #[error("[T053] {0}")]
    NotReady(&'static str),

    /// Sampling settings or sample query rejected (T054)
    #[error("[T054] Invalid sampling configuration: {0}")]
    Config(String),

    /// Drawing the sample failed (T055)
    #[error("[T055] Could not draw sample: {0}")]
    Sampling(#[source] SamplerError),

    /// Database error while resolving the table (T056)
    #[error("[T056] {0}")]
    Db(#[from] DbError),
}

impl From<SamplerError> for InterfaceError {
    fn from(err: SamplerError) -> Self {
        match err {
            SamplerError::UnsupportedDialect { .. } => InterfaceError::UnsupportedDialect(err),
            SamplerError::InvalidSampleQuery { .. } | SamplerError::InvalidConfig(_) => {
                InterfaceError::Config(err.to_string())
            }
            SamplerError::Db(_) => InterfaceError::Sampling(err),
        }
    }
}

/// Result type alias for InterfaceError
pub type InterfaceResult<T> = Result<T, InterfaceError>;

/// Why a test case could not produce a result
#[derive(Error, Debug)]
pub enum ExecutionCause {
    /// Interface is not ready to run test cases
    #[error("interface is {state}")]
    InvalidState { state: InterfaceState },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Parameters(#[from] ParameterError),

    /// A validation query hit the runner's timeout
    #[error("query exceeded the {}s timeout", timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    #[error(transparent)]
    Validator(ValidatorError),
}

impl From<ValidatorError> for ExecutionCause {
    fn from(err: ValidatorError) -> Self {
        match err {
            ValidatorError::Runner(RunnerError::Timeout { timeout }) => {
                ExecutionCause::Timeout { timeout }
            }
            other => ExecutionCause::Validator(other),
        }
    }
}

/// Uniform error returned by `run_test_case`, carrying the typed cause
#[derive(Error, Debug)]
#[error("[T060] Error executing {test_case} - {cause}")]
pub struct ExecutionError {
    /// Fully-qualified name of the test case
    pub test_case: String,
    #[source]
    pub cause: ExecutionCause,
}

impl ExecutionError {
    pub fn new(test_case: impl Into<String>, cause: impl Into<ExecutionCause>) -> Self {
        Self {
            test_case: test_case.into(),
            cause: cause.into(),
        }
    }

    pub fn cause(&self) -> &ExecutionCause {
        &self.cause
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, ExecutionCause::Timeout { .. })
    }

    pub fn is_resolution(&self) -> bool {
        matches!(self.cause, ExecutionCause::Resolution(_))
    }
}
