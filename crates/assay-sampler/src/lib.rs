//! assay-sampler - Sampling layer for Assay
//!
//! Turns a table plus its sampling settings into a fixed, queryable sample:
//! the whole table, a partition of it, a random subset, or the rows of a
//! user-supplied sample query.

pub mod duckdb;
pub mod error;
pub mod factory;
pub mod partition;
pub mod sample;
pub mod sampler;

pub use duckdb::DuckDbSampler;
pub use error::{SamplerError, SamplerResult};
pub use factory::{SamplerCreator, SamplerFactory};
pub use partition::partition_predicate;
pub use sample::{Sample, SampleSource};
pub use sampler::Sampler;
