//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::row_helpers::{collect_rows, format_row};
use crate::traits::{Database, QueryResult};
use assay_core::sql_utils::{quote_ident, quote_qualified};
use assay_core::{DbType, RelationColumn};
use async_trait::async_trait;
use duckdb::{AccessMode, Config, Connection, InterruptHandle};
use std::path::Path;
use std::sync::{Arc, Mutex};

type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// DuckDB database backend
///
/// The connection sits behind a mutex so statements run one at a time. Each
/// call runs on the blocking thread pool, which keeps the async executor free
/// to fire timers while DuckDB works.
pub struct DuckDbBackend {
    conn: SharedConnection,
    interrupt: Arc<InterruptHandle>,
}

impl DuckDbBackend {
    fn from_connection(conn: Connection) -> Self {
        let interrupt = conn.interrupt_handle();
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            interrupt,
        }
    }

    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Open a DuckDB database file
    pub fn from_path(path: &Path, read_only: bool) -> DbResult<Self> {
        let conn = if read_only {
            let config = Config::default()
                .access_mode(AccessMode::ReadOnly)
                .map_err(|e| DbError::ConnectionError(e.to_string()))?;
            Connection::open_with_flags(path, config)
        } else {
            Connection::open(path)
        }
        .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::from_connection(conn))
    }

    /// Open from a path string (handles the `:memory:` special case)
    pub fn new(path: &str, read_only: bool) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path), read_only)
        }
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
            let conn = guard.as_ref().ok_or(DbError::Closed)?;
            f(conn)
        })
        .await
        .map_err(|e| DbError::Internal(format!("blocking task failed: {e}")))?
    }

    /// Execute one statement, tagging failures with the SQL
    async fn execute_owned(&self, sql: String) -> DbResult<usize> {
        log::debug!("duckdb execute: {sql}");
        self.with_conn(move |conn| {
            conn.execute(&sql, []).map_err(|e| match DbError::from(e) {
                DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{msg}: {sql}")),
                other => other,
            })
        })
        .await
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_owned(sql.to_string()).await
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let sql = sql.to_string();
        self.with_conn(move |conn| conn.execute_batch(&sql).map_err(DbError::from))
            .await
    }

    async fn create_temp_table_as(&self, name: &str, select: &str) -> DbResult<()> {
        self.execute_owned(format!(
            "CREATE OR REPLACE TEMP TABLE {} AS {select}",
            quote_ident(name)
        ))
        .await?;
        Ok(())
    }

    async fn describe_relation(
        &self,
        schema: &str,
        table: &str,
    ) -> DbResult<Vec<RelationColumn>> {
        let (schema, table) = (schema.to_string(), table.to_string());
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT column_name, data_type FROM information_schema.columns \
                 WHERE table_schema = ? AND table_name = ? \
                 ORDER BY ordinal_position",
            )?;
            let columns = stmt
                .query_map(duckdb::params![schema, table], |row| {
                    Ok(RelationColumn {
                        name: row.get(0)?,
                        data_type: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(columns)
        })
        .await
    }

    async fn drop_if_exists(&self, name: &str) -> DbResult<()> {
        let quoted = quote_qualified(name);
        // DROP VIEW fails on a table, so only one of the two has to succeed
        let view = self.execute_owned(format!("DROP VIEW IF EXISTS {quoted}")).await;
        let table = self.execute_owned(format!("DROP TABLE IF EXISTS {quoted}")).await;
        match (view, table) {
            (Err(_), Err(e)) => Err(e),
            _ => Ok(()),
        }
    }

    async fn query_count(&self, sql: &str) -> DbResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM ({sql}) AS _counted");
        log::debug!("duckdb count: {sql}");
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn query_rows(&self, sql: &str) -> DbResult<QueryResult> {
        let sql = sql.to_string();
        log::debug!("duckdb query: {sql}");
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            collect_rows(&mut stmt)
        })
        .await
    }

    async fn query_sample_rows(&self, sql: &str, limit: usize) -> DbResult<Vec<String>> {
        let result = self
            .query_rows(&format!("SELECT * FROM ({sql}) AS _sampled LIMIT {limit}"))
            .await?;
        Ok(result.rows.iter().map(|row| format_row(row)).collect())
    }

    fn db_type(&self) -> DbType {
        DbType::DuckDb
    }

    fn interrupt(&self) {
        self.interrupt.interrupt();
    }

    async fn recover(&self) -> DbResult<()> {
        self.with_conn(|conn| {
            // Fails harmlessly when no transaction is open.
            if conn.execute_batch("ROLLBACK").is_ok() {
                log::warn!("Rolled back an open transaction after an interrupted statement");
            }
            Ok(())
        })
        .await
    }

    async fn close(&self) -> DbResult<()> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
            if let Some(conn) = guard.take() {
                conn.close()
                    .map_err(|(_, e)| DbError::ConnectionError(e.to_string()))?;
            }
            Ok(())
        })
        .await
        .map_err(|e| DbError::Internal(format!("blocking task failed: {e}")))?
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
