//! Table-level validators

use super::{constructor, validator, ValidatorEntry, ValidatorRegistry};
use crate::error::{ValidatorError, ValidatorResult};
use assay_core::{EntityType, TestCaseResult};

pub(crate) fn register(registry: &mut ValidatorRegistry) {
    let table = |name: &str, ctor| ValidatorEntry::new(EntityType::Table, name, ctor);
    registry.register(table("tableRowCountToBeBetween", constructor::<RowCountBetween>()));
    registry.register(table("tableRowCountToEqual", constructor::<RowCountEqual>()));
    registry.register(table("tableColumnCountToEqual", constructor::<ColumnCountEqual>()));
    registry.register(table("tableCustomSQLQuery", constructor::<CustomSql>()));
}

validator! {
    /// Sampled row count within `[minValue, maxValue]`
    RowCountBetween
}

impl RowCountBetween {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let min = self.ctx.parameter::<u64>("minValue")?;
        let max = self.ctx.parameter::<u64>("maxValue")?;
        if min.is_none() && max.is_none() {
            return Err(ValidatorError::InvalidParameter {
                name: "minValue".to_string(),
                message: "minValue or maxValue is required".to_string(),
            });
        }

        let rows = self.ctx.runner.row_count().await?;
        let passed = min.map_or(true, |min| rows >= min) && max.map_or(true, |max| rows <= max);
        let bound = |v: Option<u64>| v.map_or("-".to_string(), |v| v.to_string());
        Ok(self
            .ctx
            .evaluated(
                passed,
                format!(
                    "Found {rows} rows vs. the expected range [{}, {}]",
                    bound(min),
                    bound(max)
                ),
            )
            .with_value("rowCount", rows))
    }
}

validator! {
    /// Sampled row count equals `value`
    RowCountEqual
}

impl RowCountEqual {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let expected: u64 = self.ctx.required("value")?;
        let rows = self.ctx.runner.row_count().await?;
        Ok(self
            .ctx
            .evaluated(
                rows == expected,
                format!("Found {rows} rows vs. the expected {expected}"),
            )
            .with_value("rowCount", rows))
    }
}

validator! {
    /// The table has exactly `columnCount` columns
    ColumnCountEqual
}

impl ColumnCountEqual {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let expected: usize = self.ctx.required("columnCount")?;
        let columns = self.ctx.runner.relation().columns.len();
        Ok(self
            .ctx
            .evaluated(
                columns == expected,
                format!("Found {columns} columns vs. the expected {expected}"),
            )
            .with_value("columnCount", columns))
    }
}

validator! {
    /// `sqlExpression` returns at most `threshold` rows (default 0)
    CustomSql
}

impl CustomSql {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let sql: String = self.ctx.required("sqlExpression")?;
        let threshold = self.ctx.parameter::<u64>("threshold")?.unwrap_or(0);
        let sql = sql.trim().trim_end_matches(';');

        let rows = self.ctx.runner.count_rows(sql).await?;
        Ok(self
            .ctx
            .evaluated(
                rows <= threshold,
                format!("Found {rows} rows vs. the threshold {threshold}"),
            )
            .with_value("resultRowCount", rows))
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
