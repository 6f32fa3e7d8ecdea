//! Partition predicates

use crate::error::{SamplerError, SamplerResult};
use assay_core::sql_utils::{literal_list, quote_ident, quoted_list};
use assay_core::{PartitionConfig, PartitionIntervalType, Relation, RelationColumn};

/// Render the WHERE-clause predicate that narrows `relation` to its partition.
///
/// Column values are compared as numbers only when the column is numeric.
pub fn partition_predicate(
    partition: &PartitionConfig,
    relation: &Relation,
) -> SamplerResult<String> {
    partition
        .validate()
        .map_err(|e| SamplerError::InvalidConfig(e.to_string()))?;

    let column = quote_ident(partition.column.as_str());
    let predicate = match partition.interval_type {
        PartitionIntervalType::TimeUnit => {
            let (Some(interval), Some(unit)) = (partition.interval, partition.interval_unit) else {
                return Err(SamplerError::InvalidConfig(format!(
                    "time_unit partition on '{}' is missing its interval",
                    partition.column
                )));
            };
            format!(
                "{column} >= CAST(CURRENT_TIMESTAMP AS TIMESTAMP) - INTERVAL {interval} {}",
                unit.sql_keyword()
            )
        }
        PartitionIntervalType::IntegerRange => {
            let (Some(start), Some(end)) = (partition.start, partition.end) else {
                return Err(SamplerError::InvalidConfig(format!(
                    "integer_range partition on '{}' is missing its bounds",
                    partition.column
                )));
            };
            format!("{column} BETWEEN {start} AND {end}")
        }
        PartitionIntervalType::ColumnValue => {
            let numeric = relation
                .column(partition.column.as_str())
                .is_some_and(RelationColumn::is_numeric);
            let values = if numeric {
                literal_list(&partition.values)
            } else {
                quoted_list(&partition.values)
            };
            format!("{column} IN ({values})")
        }
    };
    Ok(predicate)
}
