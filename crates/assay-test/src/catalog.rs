//! Catalog client

use crate::error::{CatalogError, CatalogResult};
use assay_core::{EntityReference, Fqn, SuiteFile, TableEntity, TestDefinition};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Source of test definitions and table metadata
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Test definition a test case points at
    async fn get_test_definition(&self, reference: &EntityReference)
        -> CatalogResult<TestDefinition>;

    /// Table entity by fully-qualified name
    async fn get_table_by_fqn(&self, fqn: &Fqn) -> CatalogResult<TableEntity>;
}

/// Catalog held in memory, typically loaded from a suite file
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    definitions: HashMap<Uuid, TestDefinition>,
    definition_ids: HashMap<String, Uuid>,
    tables: HashMap<String, TableEntity>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every definition and table a suite declares
    pub fn from_suite(suite: &SuiteFile) -> Self {
        let mut catalog = Self::new();
        for definition in &suite.test_definitions {
            catalog.add_test_definition(definition.clone());
        }
        for table in &suite.tables {
            catalog.add_table(table.table.clone());
        }
        catalog
    }

    pub fn add_test_definition(&mut self, definition: TestDefinition) {
        self.definition_ids
            .insert(definition.fully_qualified_name.to_string(), definition.id);
        self.definitions.insert(definition.id, definition);
    }

    pub fn add_table(&mut self, table: TableEntity) {
        self.tables
            .insert(table.fully_qualified_name.to_string(), table);
    }

    pub fn with_test_definition(mut self, definition: TestDefinition) -> Self {
        self.add_test_definition(definition);
        self
    }

    pub fn with_table(mut self, table: TableEntity) -> Self {
        self.add_table(table);
        self
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn get_test_definition(
        &self,
        reference: &EntityReference,
    ) -> CatalogResult<TestDefinition> {
        // Ids are authoritative; the name only helps when ids were regenerated.
        let by_name = || {
            reference
                .fully_qualified_name
                .as_ref()
                .and_then(|fqn| self.definition_ids.get(fqn.as_str()))
                .and_then(|id| self.definitions.get(id))
        };
        self.definitions
            .get(&reference.id)
            .or_else(by_name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                kind: "test definition",
                key: match &reference.fully_qualified_name {
                    Some(fqn) => format!("{fqn} ({})", reference.id),
                    None => reference.id.to_string(),
                },
            })
    }

    async fn get_table_by_fqn(&self, fqn: &Fqn) -> CatalogResult<TableEntity> {
        self.tables
            .get(fqn.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                kind: "table",
                key: fqn.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::EntityType;

    #[tokio::test]
    async fn test_definition_lookup_by_id_then_name() {
        let definition = TestDefinition::new("columnValuesToBeNotNull", EntityType::Column);
        let catalog = InMemoryCatalog::new().with_test_definition(definition.clone());

        let found = catalog
            .get_test_definition(&definition.reference())
            .await
            .unwrap();
        assert_eq!(found, definition);

        let stale = EntityReference {
            id: Uuid::new_v4(),
            fully_qualified_name: Some(definition.fully_qualified_name.clone()),
        };
        assert_eq!(catalog.get_test_definition(&stale).await.unwrap().id, definition.id);
    }

    #[tokio::test]
    async fn test_missing_entities() {
        let catalog = InMemoryCatalog::new();
        let reference = EntityReference {
            id: Uuid::new_v4(),
            fully_qualified_name: None,
        };
        assert!(matches!(
            catalog.get_test_definition(&reference).await,
            Err(CatalogError::NotFound { kind: "test definition", .. })
        ));
        assert!(catalog
            .get_table_by_fqn(&Fqn::new("svc.db.main.orders"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_table_lookup() {
        let table = TableEntity::new("orders", Fqn::new("svc.db.main.orders"));
        let catalog = InMemoryCatalog::new().with_table(table.clone());
        let found = catalog.get_table_by_fqn(&table.fully_qualified_name).await.unwrap();
        assert_eq!(found.id, table.id);
    }
}
