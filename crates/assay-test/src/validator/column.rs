//! Column-level validators

use super::{constructor, validator, ValidatorContext, ValidatorEntry, ValidatorRegistry};
use crate::error::{ValidatorError, ValidatorResult};
use crate::runner::Aggregate;
use crate::runtime_params::{EnumValuesParams, EnumValuesSetter};
use assay_core::sql_utils::{literal_list, quote_ident, quote_literal, quoted_list};
use assay_core::{EntityType, RelationColumn, TestCaseResult, TestResultValue};

/// Failing rows attached to a failed result
const SAMPLE_FAILURES: usize = 5;

pub(crate) fn register(registry: &mut ValidatorRegistry) {
    let column = |name: &str, ctor| ValidatorEntry::new(EntityType::Column, name, ctor);
    registry.register(column("columnValuesToBeNotNull", constructor::<NotNull>()));
    registry.register(column("columnValuesToBeUnique", constructor::<Unique>()));
    registry.register(column("columnValuesToBeBetween", constructor::<Between>()));
    registry.register(column("columnValuesToBeInSet", constructor::<InSet>()));
    registry.register(column("columnValuesToBeNotInSet", constructor::<NotInSet>()));
    registry.register(column("columnValuesToMatchRegex", constructor::<MatchRegex>()));
    registry.register(
        column("columnValuesToBeInEnum", constructor::<InEnum>())
            .with_runtime_parameter_setter(EnumValuesSetter::constructor()),
    );
}

validator! {
    /// No NULLs in the column
    NotNull
}

impl NotNull {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let column = self.ctx.target_column()?;
        let runner = &self.ctx.runner;
        let total = runner.row_count().await?;
        let nulls = runner.count_nulls(&column).await?;
        Ok(self
            .ctx
            .evaluated(nulls == 0, format!("Found nullCount={nulls}. It should be 0"))
            .with_value("nullCount", nulls)
            .with_row_counts(total, nulls))
    }
}

validator! {
    /// Every non-NULL value appears once
    Unique
}

impl Unique {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let column = self.ctx.target_column()?;
        let runner = &self.ctx.runner;
        let total = runner.row_count().await?;
        let distinct = runner.count_distinct(&column).await?;
        let duplicates = runner.count_duplicates(&column).await?;
        Ok(self
            .ctx
            .evaluated(
                duplicates == 0,
                format!("Found {duplicates} rows with duplicated values and {distinct} distinct values"),
            )
            .with_value("valuesCount", total)
            .with_value("uniqueCount", distinct)
            .with_row_counts(total, duplicates))
    }
}

validator! {
    /// Values within `[minValue, maxValue]`; either bound may be omitted
    Between
}

impl Between {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let column = self.ctx.target_column()?;
        let min = self.ctx.parameter::<f64>("minValue")?;
        let max = self.ctx.parameter::<f64>("maxValue")?;
        let qc = quote_ident(&column);
        let predicate = match (min, max) {
            (None, None) => {
                return Err(ValidatorError::InvalidParameter {
                    name: "minValue".to_string(),
                    message: "minValue or maxValue is required".to_string(),
                })
            }
            (Some(min), Some(max)) if min > max => {
                return Err(ValidatorError::InvalidParameter {
                    name: "minValue".to_string(),
                    message: format!("minValue {min} is greater than maxValue {max}"),
                })
            }
            (Some(min), None) => format!("{qc} < {min}"),
            (None, Some(max)) => format!("{qc} > {max}"),
            (Some(min), Some(max)) => format!("{qc} < {min} OR {qc} > {max}"),
        };

        let runner = &self.ctx.runner;
        let total = runner.row_count().await?;
        let failed = runner.count_where(&predicate).await?;
        let found_min = runner.aggregate(Aggregate::Min, &column).await?;
        let found_max = runner.aggregate(Aggregate::Max, &column).await?;
        let render = |v: Option<f64>| v.map_or("null".to_string(), |v| v.to_string());

        let mut result = self
            .ctx
            .evaluated(
                failed == 0,
                format!(
                    "Found min={}, max={} vs. the expected min={}, max={}",
                    render(found_min),
                    render(found_max),
                    render(min),
                    render(max)
                ),
            )
            .with_value("min", render(found_min))
            .with_value("max", render(found_max))
            .with_row_counts(total, failed);
        if failed > 0 {
            attach_failures(&self.ctx, &predicate, &mut result).await?;
        }
        Ok(result)
    }
}

validator! {
    /// Every non-NULL value is one of `allowedValues`
    InSet
}

impl InSet {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let column = self.ctx.target_column()?;
        let allowed = self.ctx.required_list("allowedValues")?;
        let predicate = format!(
            "{} NOT IN ({})",
            quote_ident(&column),
            value_list(&self.ctx, &column, &allowed)
        );
        membership(&self.ctx, &predicate, "values outside the allowed set").await
    }
}

validator! {
    /// No value is one of `forbiddenValues`
    NotInSet
}

impl NotInSet {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let column = self.ctx.target_column()?;
        let forbidden = self.ctx.required_list("forbiddenValues")?;
        let predicate = format!(
            "{} IN ({})",
            quote_ident(&column),
            value_list(&self.ctx, &column, &forbidden)
        );
        membership(&self.ctx, &predicate, "forbidden values").await
    }
}

validator! {
    /// Every non-NULL value matches `regex`
    MatchRegex
}

impl MatchRegex {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let column = self.ctx.target_column()?;
        let pattern: String = self.ctx.required("regex")?;
        regex::Regex::new(&pattern).map_err(|e| ValidatorError::InvalidParameter {
            name: "regex".to_string(),
            message: e.to_string(),
        })?;
        let predicate = format!(
            "NOT regexp_matches(CAST({} AS VARCHAR), {})",
            quote_ident(&column),
            quote_literal(&pattern)
        );
        membership(&self.ctx, &predicate, "values not matching the pattern").await
    }
}

validator! {
    /// Every non-NULL value is a current member of the column's enum
    InEnum
}

impl InEnum {
    async fn evaluate(&self) -> ValidatorResult<TestCaseResult> {
        let column = self.ctx.target_column()?;
        let params: EnumValuesParams = self.ctx.runtime_params()?;
        if params.enum_values.is_empty() {
            return Err(ValidatorError::InvalidParameter {
                name: "enumValues".to_string(),
                message: "no enum values to check against".to_string(),
            });
        }
        let predicate = format!(
            "{} NOT IN ({})",
            quote_ident(&column),
            value_list(&self.ctx, &column, &params.enum_values)
        );
        membership(&self.ctx, &predicate, "values outside the enum").await
    }
}

/// SQL list of `values`, left bare only for numeric columns
fn value_list(ctx: &ValidatorContext, column: &str, values: &[String]) -> String {
    let numeric = ctx
        .runner
        .relation()
        .column(column)
        .is_some_and(RelationColumn::is_numeric);
    if numeric {
        literal_list(values)
    } else {
        quoted_list(values)
    }
}

/// Fail when any sampled row matches `violation`
async fn membership(
    ctx: &ValidatorContext,
    violation: &str,
    what: &str,
) -> ValidatorResult<TestCaseResult> {
    let runner = &ctx.runner;
    let total = runner.row_count().await?;
    let failed = runner.count_where(violation).await?;
    let mut result = ctx
        .evaluated(failed == 0, format!("Found {failed} rows with {what}"))
        .with_value("failedCount", failed)
        .with_row_counts(total, failed);
    if failed > 0 {
        attach_failures(ctx, violation, &mut result).await?;
    }
    Ok(result)
}

/// Attach a few offending rows to a failed result
async fn attach_failures(
    ctx: &ValidatorContext,
    violation: &str,
    result: &mut TestCaseResult,
) -> ValidatorResult<()> {
    let rows = ctx.runner.failing_rows(violation, SAMPLE_FAILURES).await?;
    for row in rows {
        result.test_result_value.push(TestResultValue {
            name: "failingRow".to_string(),
            value: row,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "column_test.rs"]
mod tests;
