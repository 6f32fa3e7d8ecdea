//! DuckDB sampler

use crate::error::{SamplerError, SamplerResult};
use crate::partition::partition_predicate;
use crate::sample::{filtered_from, Sample};
use crate::sampler::Sampler;
use assay_core::{DbType, Relation, SampleConfig, SampleKind, SamplingSettings};
use assay_db::Database;
use async_trait::async_trait;
use sqlparser::ast::Statement;
use sqlparser::dialect::DuckDbDialect;
use sqlparser::parser::Parser;
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Samples DuckDB tables with `USING SAMPLE`.
///
/// Random samples are materialized into a temp table the first time they are
/// requested, so repeated reads see the same rows.
pub struct DuckDbSampler {
    session: Arc<dyn Database>,
    relation: Relation,
    settings: SamplingSettings,
    seed: u32,
    sample: OnceCell<Arc<Sample>>,
}

impl DuckDbSampler {
    /// Create a sampler; the sample query, if any, must be a single query.
    pub fn new(
        session: Arc<dyn Database>,
        relation: Relation,
        mut settings: SamplingSettings,
    ) -> SamplerResult<Self> {
        if let Some(query) = settings.sample_query.take() {
            settings.sample_query = Some(validate_sample_query(&query)?);
        }
        if let Some(sample) = &settings.sample {
            sample
                .validate()
                .map_err(|e| SamplerError::InvalidConfig(e.to_string()))?;
        }
        Ok(Self {
            session,
            relation,
            settings,
            seed: new_seed(),
            sample: OnceCell::new(),
        })
    }

    /// Factory entry point
    pub fn create(
        session: Arc<dyn Database>,
        relation: Relation,
        settings: SamplingSettings,
    ) -> SamplerResult<Arc<dyn Sampler>> {
        Ok(Arc::new(Self::new(session, relation, settings)?))
    }

    /// Seed used for `USING SAMPLE`
    pub fn seed(&self) -> u32 {
        self.seed
    }

    async fn draw(&self) -> SamplerResult<Sample> {
        let relation = self.relation.clone();

        if let Some(query) = &self.settings.sample_query {
            let name = temp_table_name();
            self.session.create_temp_table_as(&name, query).await?;
            log::debug!(
                "Materialized sample query for {} into {name}",
                relation.qualified_name()
            );
            return Ok(Sample::materialized(relation, name));
        }

        let predicate = self
            .settings
            .partition
            .as_ref()
            .map(|partition| partition_predicate(partition, &relation))
            .transpose()?;
        let sample = self.settings.sample.filter(|s| !s.is_full_table());

        match (predicate, sample) {
            (None, None) => {
                log::debug!("Sampling disabled for {}; using full table", relation.qualified_name());
                Ok(Sample::full_table(relation))
            }
            (Some(predicate), None) => {
                log::debug!("Partition filter on {}: {predicate}", relation.qualified_name());
                Ok(Sample::filtered(relation, &predicate))
            }
            (predicate, Some(sample)) => {
                let base = match &predicate {
                    Some(predicate) => filtered_from(&relation, predicate),
                    None => relation.quoted(),
                };
                let select = format!(
                    "SELECT * FROM {base} USING SAMPLE {}",
                    sample_clause(&sample, self.seed)
                );
                let name = temp_table_name();
                self.session.create_temp_table_as(&name, &select).await?;
                log::debug!(
                    "Drew {} {} sample of {} into {name} (seed {})",
                    sample.value,
                    sample.kind,
                    relation.qualified_name(),
                    self.seed
                );
                Ok(Sample::materialized(relation, name))
            }
        }
    }
}

#[async_trait]
impl Sampler for DuckDbSampler {
    fn dialect(&self) -> DbType {
        DbType::DuckDb
    }

    fn relation(&self) -> &Relation {
        &self.relation
    }

    fn settings(&self) -> &SamplingSettings {
        &self.settings
    }

    async fn random_sample(&self) -> SamplerResult<Arc<Sample>> {
        self.sample
            .get_or_try_init(|| async { self.draw().await.map(Arc::new) })
            .await
            .map(Arc::clone)
    }

    async fn fetch_sample_rows(&self, limit: usize) -> SamplerResult<Vec<String>> {
        let sample = self.random_sample().await?;
        let rows = self
            .session
            .query_sample_rows(&format!("SELECT * FROM {}", sample.from_clause()), limit)
            .await?;
        Ok(rows)
    }

    async fn cleanup(&self) -> SamplerResult<()> {
        if let Some(name) = self.sample.get().and_then(|s| s.temp_table()) {
            self.session.drop_if_exists(name).await?;
            log::debug!("Dropped sample table {name}");
        }
        Ok(())
    }
}

/// `USING SAMPLE` body for a sample size
fn sample_clause(sample: &SampleConfig, seed: u32) -> String {
    match sample.kind {
        SampleKind::Percentage => format!("{} PERCENT (bernoulli, {seed})", sample.value),
        SampleKind::Rows => format!("{} ROWS (reservoir, {seed})", sample.value as u64),
    }
}

/// Check that a sample query is exactly one query and strip trailing `;`
fn validate_sample_query(query: &str) -> SamplerResult<String> {
    let invalid = |reason: String| SamplerError::InvalidSampleQuery {
        query: query.to_string(),
        reason,
    };

    let statements = Parser::parse_sql(&DuckDbDialect {}, query).map_err(|e| invalid(e.to_string()))?;
    match statements.as_slice() {
        [Statement::Query(_)] => Ok(query.trim().trim_end_matches(';').trim_end().to_string()),
        [] => Err(invalid("query is empty".to_string())),
        [_] => Err(invalid("only SELECT queries can define a sample".to_string())),
        many => Err(invalid(format!(
            "expected a single statement, found {}",
            many.len()
        ))),
    }
}

fn temp_table_name() -> String {
    format!("assay_sample_{}", Uuid::new_v4().simple())
}

fn new_seed() -> u32 {
    (Uuid::new_v4().as_u128() % 1_000_000) as u32
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
