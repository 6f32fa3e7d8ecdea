//! Helpers for reading DuckDB rows as strings.

use crate::error::DbResult;
use crate::traits::QueryResult;

/// Read a column value as a string, trying multiple DuckDB types.
///
/// Returns `None` for SQL NULL and for types none of the probes understand;
/// callers that need dates, decimals or nested values should cast them to
/// VARCHAR in SQL.
pub(crate) fn get_column_as_string(row: &duckdb::Row<'_>, idx: usize) -> Option<String> {
    if let Ok(Some(s)) = row.get::<_, Option<String>>(idx) {
        return Some(s);
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return Some(n.to_string());
    }
    if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
        return Some(f.to_string());
    }
    if let Ok(Some(b)) = row.get::<_, Option<bool>>(idx) {
        return Some(b.to_string());
    }
    None
}

/// Execute a prepared statement and collect all rows.
///
/// DuckDB panics on `stmt.column_count()` before execution, so rows are
/// collected first and column metadata read afterwards.
pub(crate) fn collect_rows(stmt: &mut duckdb::Statement) -> DbResult<QueryResult> {
    let rows: Vec<Vec<Option<String>>> = stmt
        .query_map([], |row| {
            let col_count = row.as_ref().column_count();
            Ok((0..col_count)
                .map(|i| get_column_as_string(row, i))
                .collect())
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let columns = (0..stmt.column_count())
        .map(|i| stmt.column_name(i).map_or("?".to_string(), |v| v.to_string()))
        .collect();

    Ok(QueryResult { columns, rows })
}

/// Render a row for display: values joined by `, `, NULL shown as `null`
pub(crate) fn format_row(row: &[Option<String>]) -> String {
    row.iter()
        .map(|v| v.as_deref().unwrap_or("null"))
        .collect::<Vec<_>>()
        .join(", ")
}
