//! Sampler factory keyed by dialect

use crate::duckdb::DuckDbSampler;
use crate::error::{SamplerError, SamplerResult};
use crate::sampler::Sampler;
use assay_core::{DbType, Relation, SamplingSettings};
use assay_db::Database;
use std::collections::HashMap;
use std::sync::Arc;

/// Constructor registered for one dialect
pub type SamplerCreator =
    fn(Arc<dyn Database>, Relation, SamplingSettings) -> SamplerResult<Arc<dyn Sampler>>;

/// Picks the sampler implementation for a session's dialect
///
/// Owned by whoever builds test suite interfaces; there is no process-wide
/// registry.
#[derive(Clone)]
pub struct SamplerFactory {
    creators: HashMap<DbType, SamplerCreator>,
}

impl SamplerFactory {
    /// A factory with no dialects registered
    pub fn new() -> Self {
        Self {
            creators: HashMap::new(),
        }
    }

    /// A factory with every built-in sampler registered
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory.register(DbType::DuckDb, DuckDbSampler::create);
        factory
    }

    /// Register `creator` for `db_type`, returning the one it replaces
    pub fn register(&mut self, db_type: DbType, creator: SamplerCreator) -> Option<SamplerCreator> {
        self.creators.insert(db_type, creator)
    }

    /// Whether a sampler is registered for `db_type`
    pub fn supports(&self, db_type: DbType) -> bool {
        self.creators.contains_key(&db_type)
    }

    /// Build the sampler for `db_type`
    pub fn create(
        &self,
        db_type: DbType,
        session: Arc<dyn Database>,
        relation: Relation,
        settings: SamplingSettings,
    ) -> SamplerResult<Arc<dyn Sampler>> {
        let creator = self
            .creators
            .get(&db_type)
            .ok_or(SamplerError::UnsupportedDialect { db_type })?;
        creator(session, relation, settings)
    }
}

impl Default for SamplerFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for SamplerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplerFactory")
            .field("dialects", &self.creators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_db::DuckDbBackend;

    fn relation() -> Relation {
        Relation {
            schema: "main".to_string(),
            table: "orders".to_string(),
            columns: Vec::new(),
        }
    }

    #[test]
    fn test_defaults_support_duckdb_only() {
        let factory = SamplerFactory::with_defaults();
        assert!(factory.supports(DbType::DuckDb));
        assert!(!factory.supports(DbType::Snowflake));
    }

    #[test]
    fn test_unsupported_dialect() {
        let session: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
        let err = SamplerFactory::with_defaults()
            .create(
                DbType::Snowflake,
                session,
                relation(),
                SamplingSettings::default(),
            )
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SamplerError::UnsupportedDialect {
                db_type: DbType::Snowflake
            }
        ));
    }

    #[test]
    fn test_empty_factory_rejects_everything() {
        let session: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
        let result = SamplerFactory::new().create(
            DbType::DuckDb,
            session,
            relation(),
            SamplingSettings::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_create_duckdb_sampler() {
        let session: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
        let sampler = SamplerFactory::default()
            .create(DbType::DuckDb, session, relation(), SamplingSettings::default())
            .unwrap();
        assert_eq!(sampler.dialect(), DbType::DuckDb);
        assert_eq!(sampler.relation().table, "orders");
    }
}
