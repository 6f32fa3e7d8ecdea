//! assay-core - Core library for Assay
//!
//! This crate provides the shared types used across all Assay components:
//! connection and suite configuration, table entities, sampling settings,
//! test cases, test definitions, and test case results.

pub mod config;
pub mod entity_link;
pub mod error;
pub mod names;
mod newtype_string;
pub mod profile;
pub mod result;
pub mod sql_utils;
pub mod table;
pub mod test_case;

pub use config::{
    ConnectionConfig, Credentials, DbType, SslConfig, SslMode, SuiteFile, TableSuite,
    TestCaseSpec, DEFAULT_TIMEOUT_SECS,
};
pub use entity_link::EntityLink;
pub use error::{CoreError, CoreResult};
pub use names::{ColumnName, Fqn};
pub use profile::{
    IntervalUnit, PartitionConfig, PartitionIntervalType, SampleConfig, SampleKind,
    SamplingSettings, TableProfilerConfig,
};
pub use result::{TestCaseResult, TestCaseStatus, TestResultValue};
pub use table::{Column, ColumnDataType, Relation, RelationColumn, TableEntity};
pub use test_case::{
    EntityReference, EntityType, TestCase, TestCaseParameterValue, TestDefinition,
    TestParameterDefinition, RUNTIME_PARAMS,
};
