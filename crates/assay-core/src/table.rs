//! Table entities and their queryable form.

use crate::names::{ColumnName, Fqn};
use crate::profile::TableProfilerConfig;
use crate::sql_utils::quote_qualified;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared column data type in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDataType {
    Int,
    Bigint,
    Numeric,
    Double,
    Varchar,
    Text,
    Boolean,
    Date,
    Timestamp,
    /// Enumerated type; allowed values live in [`Column::enum_values`]
    Enum,
    #[default]
    Unknown,
}

impl ColumnDataType {
    /// True for types that support numeric comparisons
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnDataType::Int
                | ColumnDataType::Bigint
                | ColumnDataType::Numeric
                | ColumnDataType::Double
        )
    }
}

/// Column as recorded in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: ColumnName,

    #[serde(default)]
    pub data_type: ColumnDataType,

    /// Allowed values for `enum` columns
    #[serde(default)]
    pub enum_values: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Table as recorded in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntity {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Table name in the database
    pub name: String,

    /// `service.database.schema.table`
    pub fully_qualified_name: Fqn,

    /// Database schema; derived from the FQN when absent
    #[serde(default)]
    pub database_schema: Option<String>,

    #[serde(default)]
    pub columns: Vec<Column>,

    /// Sampling and partitioning settings
    #[serde(default)]
    pub profile: Option<TableProfilerConfig>,
}

impl TableEntity {
    /// Create a bare entity with no columns or profiler settings
    pub fn new(name: impl Into<String>, fully_qualified_name: Fqn) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            fully_qualified_name,
            database_schema: None,
            columns: Vec::new(),
            profile: None,
        }
    }

    /// Look up a catalog column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Schema the table lives in.
    ///
    /// Uses `database_schema`, then the FQN's schema part
    /// (`service.database.schema.table`), then `default_schema`.
    pub fn schema(&self, default_schema: &str) -> String {
        if let Some(schema) = self.database_schema.as_deref().filter(|s| !s.is_empty()) {
            return schema.to_string();
        }
        let parts = self.fully_qualified_name.parts();
        if parts.len() >= 4 {
            return parts[parts.len() - 2].clone();
        }
        default_schema.to_string()
    }

    /// `schema.table` name used to reach the table in the database
    pub fn relation_name(&self, default_schema: &str) -> String {
        format!("{}.{}", self.schema(default_schema), self.name)
    }
}

/// Column of a live relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationColumn {
    pub name: String,
    /// Database type name as reported by `information_schema`
    pub data_type: String,
}

impl RelationColumn {
    /// Whether the database type holds numbers
    pub fn is_numeric(&self) -> bool {
        let data_type = self.data_type.to_ascii_uppercase();
        if data_type.starts_with("INTERVAL") {
            return false;
        }
        ["INT", "DECIMAL", "NUMERIC", "DOUBLE", "FLOAT", "REAL"]
            .iter()
            .any(|kind| data_type.contains(kind))
    }
}

/// A table resolved against a live database: the queryable form of a
/// [`TableEntity`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub schema: String,
    pub table: String,
    pub columns: Vec<RelationColumn>,
}

impl Relation {
    /// `schema.table`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Quoted `"schema"."table"`, safe to splice into SQL
    pub fn quoted(&self) -> String {
        quote_qualified(&self.qualified_name())
    }

    /// Look up a live column by name (case-insensitive)
    pub fn column(&self, name: &str) -> Option<&RelationColumn> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_fqn() {
        let table = TableEntity::new("orders", Fqn::new("svc.warehouse.sales.orders"));
        assert_eq!(table.schema("main"), "sales");
        assert_eq!(table.relation_name("main"), "sales.orders");
    }

    #[test]
    fn test_schema_falls_back_to_default() {
        let table = TableEntity::new("orders", Fqn::new("orders"));
        assert_eq!(table.relation_name("main"), "main.orders");
    }

    #[test]
    fn test_explicit_schema_wins() {
        let mut table = TableEntity::new("orders", Fqn::new("svc.warehouse.sales.orders"));
        table.database_schema = Some("staging".to_string());
        assert_eq!(table.relation_name("main"), "staging.orders");
    }

    #[test]
    fn test_relation_quoting_and_lookup() {
        let relation = Relation {
            schema: "main".to_string(),
            table: "orders".to_string(),
            columns: vec![RelationColumn {
                name: "Order_ID".to_string(),
                data_type: "INTEGER".to_string(),
            }],
        };
        assert_eq!(relation.quoted(), r#""main"."orders""#);
        assert!(relation.column("order_id").is_some());
        assert!(relation.column("missing").is_none());
    }

    #[test]
    fn test_numeric_relation_columns() {
        let column = |data_type: &str| RelationColumn {
            name: "c".to_string(),
            data_type: data_type.to_string(),
        };
        assert!(column("BIGINT").is_numeric());
        assert!(column("DECIMAL(18,3)").is_numeric());
        assert!(!column("VARCHAR").is_numeric());
        assert!(!column("INTERVAL").is_numeric());
    }
}
