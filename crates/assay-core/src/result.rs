//! Test case results

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestCaseStatus {
    /// The assertion held
    Success,
    /// The assertion did not hold
    Failed,
    /// The test could not be evaluated (missing column, bad parameters)
    Aborted,
}

impl std::fmt::Display for TestCaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestCaseStatus::Success => write!(f, "Success"),
            TestCaseStatus::Failed => write!(f, "Failed"),
            TestCaseStatus::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Named metric computed by a validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultValue {
    pub name: String,
    pub value: String,
}

/// Result of running one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    /// Execution time in epoch milliseconds
    pub timestamp: i64,

    pub test_case_status: TestCaseStatus,

    /// Human-readable summary
    pub result: String,

    #[serde(default)]
    pub test_result_value: Vec<TestResultValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_rows: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_rows: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_rows_percentage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_rows_percentage: Option<f64>,
}

impl TestCaseResult {
    fn with_status(timestamp: i64, status: TestCaseStatus, result: impl Into<String>) -> Self {
        Self {
            timestamp,
            test_case_status: status,
            result: result.into(),
            test_result_value: Vec::new(),
            passed_rows: None,
            failed_rows: None,
            passed_rows_percentage: None,
            failed_rows_percentage: None,
        }
    }

    /// Success or failure depending on `passed`
    pub fn evaluated(timestamp: i64, passed: bool, result: impl Into<String>) -> Self {
        let status = if passed {
            TestCaseStatus::Success
        } else {
            TestCaseStatus::Failed
        };
        Self::with_status(timestamp, status, result)
    }

    /// A test that could not be evaluated
    pub fn aborted(timestamp: i64, result: impl Into<String>) -> Self {
        Self::with_status(timestamp, TestCaseStatus::Aborted, result)
    }

    /// Attach a named metric
    pub fn with_value(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.test_result_value.push(TestResultValue {
            name: name.into(),
            value: value.to_string(),
        });
        self
    }

    /// Attach passed/failed row counts and their percentages
    pub fn with_row_counts(mut self, total: u64, failed: u64) -> Self {
        let failed = failed.min(total);
        let passed = total - failed;
        self.passed_rows = Some(passed);
        self.failed_rows = Some(failed);
        if total > 0 {
            self.passed_rows_percentage = Some(passed as f64 * 100.0 / total as f64);
            self.failed_rows_percentage = Some(failed as f64 * 100.0 / total as f64);
        }
        self
    }

    /// Look up a metric by name
    pub fn value(&self, name: &str) -> Option<&str> {
        self.test_result_value
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.test_case_status == TestCaseStatus::Success
    }

    /// Execution time as a UTC timestamp
    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_counts_and_percentages() {
        let result = TestCaseResult::evaluated(0, false, "2 nulls").with_row_counts(8, 2);
        assert_eq!(result.passed_rows, Some(6));
        assert_eq!(result.failed_rows, Some(2));
        assert_eq!(result.failed_rows_percentage, Some(25.0));
        assert_eq!(result.test_case_status, TestCaseStatus::Failed);
    }

    #[test]
    fn test_row_counts_on_empty_sample() {
        let result = TestCaseResult::evaluated(0, true, "empty").with_row_counts(0, 0);
        assert_eq!(result.passed_rows, Some(0));
        assert!(result.passed_rows_percentage.is_none());
    }

    #[test]
    fn test_values_and_timestamp() {
        let result = TestCaseResult::evaluated(1_700_000_000_000, true, "ok")
            .with_value("nullCount", 0);
        assert!(result.is_success());
        assert_eq!(result.value("nullCount"), Some("0"));
        assert_eq!(
            result.executed_at().map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_serializes_camel_case_status() {
        let result = TestCaseResult::aborted(1, "column missing");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["testCaseStatus"], "Aborted");
        assert!(json.get("passedRows").is_none());
    }
}
