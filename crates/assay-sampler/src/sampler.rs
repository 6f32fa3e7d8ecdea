//! Sampler trait definition

use crate::error::SamplerResult;
use crate::sample::Sample;
use assay_core::{DbType, Relation, SamplingSettings};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the sample a test suite runs against
///
/// A sampler is bound to one session and one table. The sample is drawn on
/// the first call to [`random_sample`](Sampler::random_sample) and every later
/// call returns the same one.
#[async_trait]
pub trait Sampler: Send + Sync {
    /// Dialect this sampler generates SQL for
    fn dialect(&self) -> DbType;

    /// The table being sampled
    fn relation(&self) -> &Relation;

    /// Sample query, sample size and partition in effect
    fn settings(&self) -> &SamplingSettings;

    /// Draw the sample, or return the one already drawn
    async fn random_sample(&self) -> SamplerResult<Arc<Sample>>;

    /// Up to `limit` sampled rows rendered for reports
    async fn fetch_sample_rows(&self, limit: usize) -> SamplerResult<Vec<String>>;

    /// Drop any database objects created for the sample
    async fn cleanup(&self) -> SamplerResult<()>;
}
