//! Opening sessions from a [`ConnectionConfig`]

use crate::duckdb::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::traits::Database;
use assay_core::{ConnectionConfig, DbType, SslMode};
use std::sync::Arc;

/// Open a session for `config` and run its `on_connect` statements.
///
/// Fails with [`DbError::ConnectionError`] when the configuration is invalid,
/// the SSL policy cannot be honored, the database cannot be opened, or an
/// `on_connect` statement fails. A failed session is dropped (and its
/// connection released) before returning.
pub async fn open_session(config: &ConnectionConfig) -> DbResult<Arc<dyn Database>> {
    config
        .validate()
        .map_err(|e| DbError::ConnectionError(e.to_string()))?;
    check_ssl(config)?;

    let session: Arc<dyn Database> = match config.db_type {
        DbType::DuckDb => {
            if config.credentials.is_some() {
                log::warn!("DuckDB does not authenticate; ignoring configured credentials");
            }
            Arc::new(DuckDbBackend::new(&config.path, config.read_only)?)
        }
        DbType::Snowflake => {
            return Err(DbError::ConnectionError(
                "snowflake sessions are not available in this build".to_string(),
            ))
        }
    };

    for statement in &config.on_connect {
        session.execute_batch(statement).await.map_err(|e| {
            DbError::ConnectionError(format!("on_connect statement failed: {e}"))
        })?;
    }

    log::debug!(
        "Opened {} session on {} ({} on_connect statements)",
        config.db_type,
        config.path,
        config.on_connect.len()
    );
    Ok(session)
}

/// Validate the SSL policy against what the dialect supports
fn check_ssl(config: &ConnectionConfig) -> DbResult<()> {
    if let Some(ca) = &config.ssl.ca_certificate {
        if !ca.exists() {
            return Err(DbError::ConnectionError(format!(
                "CA certificate not found: {}",
                ca.display()
            )));
        }
    }

    match (config.db_type, config.ssl.mode) {
        (DbType::DuckDb, mode) if mode.is_required() => Err(DbError::ConnectionError(format!(
            "ssl mode {mode:?} cannot be satisfied: duckdb connections are local"
        ))),
        (DbType::DuckDb, SslMode::Allow | SslMode::Prefer) => {
            log::debug!("duckdb connections are local; continuing without SSL");
            Ok(())
        }
        _ => Ok(()),
    }
}
