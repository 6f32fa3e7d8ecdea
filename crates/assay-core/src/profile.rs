//! Sampling and partitioning configuration for a table.
//!
//! A table's [`TableProfilerConfig`] decides which rows a test suite runs
//! against. [`SamplingSettings::resolve`] folds the table-level settings and
//! any suite-wide default into the single set of options a sampler consumes.

use crate::error::{CoreError, CoreResult};
use crate::names::ColumnName;
use serde::{Deserialize, Serialize};

/// How a sample size is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    /// Percentage of the table's rows (0, 100]
    #[default]
    Percentage,
    /// Absolute number of rows
    Rows,
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleKind::Percentage => write!(f, "percentage"),
            SampleKind::Rows => write!(f, "rows"),
        }
    }
}

/// Sample size configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Sample size, interpreted according to `kind`
    pub value: f64,

    /// Unit of `value`
    #[serde(default)]
    pub kind: SampleKind,
}

impl SampleConfig {
    /// Sample a percentage of the table
    pub fn percentage(value: f64) -> Self {
        Self {
            value,
            kind: SampleKind::Percentage,
        }
    }

    /// Sample a fixed number of rows
    pub fn rows(rows: u64) -> Self {
        Self {
            value: rows as f64,
            kind: SampleKind::Rows,
        }
    }

    /// True when the configuration selects every row (100 percent)
    pub fn is_full_table(&self) -> bool {
        self.kind == SampleKind::Percentage && self.value >= 100.0
    }

    /// Reject sizes a sampler cannot honor
    pub fn validate(&self) -> CoreResult<()> {
        if !self.value.is_finite() {
            return Err(CoreError::ConfigInvalid {
                message: format!("sample value must be finite, got {}", self.value),
            });
        }
        match self.kind {
            SampleKind::Percentage if self.value <= 0.0 || self.value > 100.0 => {
                Err(CoreError::ConfigInvalid {
                    message: format!(
                        "sample percentage must be in (0, 100], got {}",
                        self.value
                    ),
                })
            }
            SampleKind::Rows if self.value < 1.0 || self.value.fract() != 0.0 => {
                Err(CoreError::ConfigInvalid {
                    message: format!(
                        "sample row count must be a positive integer, got {}",
                        self.value
                    ),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Partition interval type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionIntervalType {
    /// Rows whose timestamp column falls within the last `interval` units
    TimeUnit,
    /// Rows whose integer column falls within `[start, end]`
    IntegerRange,
    /// Rows whose column value is one of `values`
    ColumnValue,
}

/// Unit for time-based partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Hour,
    Day,
    Month,
    Year,
}

impl IntervalUnit {
    /// SQL interval keyword for this unit
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            IntervalUnit::Hour => "HOUR",
            IntervalUnit::Day => "DAY",
            IntervalUnit::Month => "MONTH",
            IntervalUnit::Year => "YEAR",
        }
    }
}

/// Predicate narrowing a table to a sub-range before sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Disabled partitions are ignored entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Column the predicate applies to
    pub column: ColumnName,

    /// Kind of predicate
    pub interval_type: PartitionIntervalType,

    /// Number of units back from now (time_unit)
    #[serde(default)]
    pub interval: Option<i64>,

    /// Unit of `interval` (time_unit)
    #[serde(default)]
    pub interval_unit: Option<IntervalUnit>,

    /// Inclusive lower bound (integer_range)
    #[serde(default)]
    pub start: Option<i64>,

    /// Inclusive upper bound (integer_range)
    #[serde(default)]
    pub end: Option<i64>,

    /// Accepted values (column_value)
    #[serde(default)]
    pub values: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl PartitionConfig {
    /// Check that the fields required by `interval_type` are present
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |message: String| Err(CoreError::ConfigInvalid { message });
        match self.interval_type {
            PartitionIntervalType::TimeUnit => match (self.interval, self.interval_unit) {
                (Some(n), Some(_)) if n > 0 => Ok(()),
                _ => invalid(format!(
                    "time_unit partition on '{}' needs a positive interval and an interval_unit",
                    self.column
                )),
            },
            PartitionIntervalType::IntegerRange => match (self.start, self.end) {
                (Some(start), Some(end)) if start <= end => Ok(()),
                _ => invalid(format!(
                    "integer_range partition on '{}' needs start <= end",
                    self.column
                )),
            },
            PartitionIntervalType::ColumnValue if self.values.is_empty() => invalid(format!(
                "column_value partition on '{}' needs at least one value",
                self.column
            )),
            PartitionIntervalType::ColumnValue => Ok(()),
        }
    }
}

/// Per-table profiler settings as stored alongside the table entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableProfilerConfig {
    /// Sample size
    #[serde(default)]
    pub sample: Option<SampleConfig>,

    /// Query whose result is used verbatim as the sample
    #[serde(default)]
    pub sample_query: Option<String>,

    /// Partition predicate applied before sampling
    #[serde(default)]
    pub partition: Option<PartitionConfig>,
}

/// The effective sampling options for one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplingSettings {
    pub sample_query: Option<String>,
    pub sample: Option<SampleConfig>,
    pub partition: Option<PartitionConfig>,
}

impl SamplingSettings {
    /// Resolve the effective settings.
    ///
    /// Table-level values win over `default_sample`. Disabled partitions and
    /// blank sample queries are dropped. A sample query makes the other two
    /// settings irrelevant, but they are kept for reporting.
    pub fn resolve(
        profiler: Option<&TableProfilerConfig>,
        default_sample: Option<&SampleConfig>,
    ) -> CoreResult<Self> {
        let sample_query = profiler
            .and_then(|p| p.sample_query.as_deref())
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(String::from);

        let sample = profiler
            .and_then(|p| p.sample.as_ref())
            .or(default_sample)
            .copied();
        if let Some(sample) = &sample {
            sample.validate()?;
        }

        let partition = profiler
            .and_then(|p| p.partition.as_ref())
            .filter(|p| p.enabled)
            .cloned();
        if let Some(partition) = &partition {
            partition.validate()?;
        }

        if sample_query.is_some() && (sample.is_some() || partition.is_some()) {
            log::debug!("Sample query configured; ignoring sample size and partition settings");
        }

        Ok(Self {
            sample_query,
            sample,
            partition,
        })
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
