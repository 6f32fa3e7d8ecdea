//! Database trait definition

use crate::error::DbResult;
use assay_core::{DbType, RelationColumn};
use async_trait::async_trait;

/// Rows returned by [`Database::query_rows`], values rendered as strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names from the result set
    pub columns: Vec<String>,
    /// Rows of string-coerced values; `None` is SQL NULL
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    /// First value of the first row, if any
    pub fn scalar(&self) -> Option<&str> {
        self.rows.first()?.first()?.as_deref()
    }

    /// Values of the first column across all rows
    pub fn first_column(&self) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|row| row.first().cloned().flatten())
            .collect()
    }
}

/// A live database session
///
/// Implementations must be Send + Sync for async operation. Calls are
/// blocking at the driver level; implementations move them off the async
/// executor so that callers can bound them with a timer.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Materialize a SELECT into a session-scoped temporary table
    async fn create_temp_table_as(&self, name: &str, select: &str) -> DbResult<()>;

    /// Columns of `schema.table` in ordinal order; empty if it does not exist
    async fn describe_relation(&self, schema: &str, table: &str)
        -> DbResult<Vec<RelationColumn>>;

    /// Drop a table or view if it exists
    async fn drop_if_exists(&self, name: &str) -> DbResult<()>;

    /// Number of rows `sql` returns
    async fn query_count(&self, sql: &str) -> DbResult<u64>;

    /// Run a query and collect every row
    async fn query_rows(&self, sql: &str) -> DbResult<QueryResult>;

    /// Query and return up to `limit` rows, each as a comma-separated string
    async fn query_sample_rows(&self, sql: &str, limit: usize) -> DbResult<Vec<String>>;

    /// Database type identifier
    fn db_type(&self) -> DbType;

    /// Ask the driver to abort the statement currently executing, if any.
    ///
    /// Returns immediately; the interrupted call fails with
    /// [`DbError::Interrupted`](crate::DbError::Interrupted).
    fn interrupt(&self);

    /// Bring the session back to a clean state after an interrupted call.
    ///
    /// Waits for any in-flight statement to finish and rolls back an open
    /// transaction.
    async fn recover(&self) -> DbResult<()>;

    /// Release the underlying connection; later calls fail with
    /// [`DbError::Closed`](crate::DbError::Closed)
    async fn close(&self) -> DbResult<()>;
}
