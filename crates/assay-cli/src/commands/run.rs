//! Run command implementation

use anyhow::{Context, Result};
use assay_core::{SuiteFile, TableSuite, TestCaseStatus};
use assay_test::{CatalogClient, InMemoryCatalog, TestSuiteInterface};
use std::sync::Arc;
use std::time::Instant;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{load_suite, parse_filter};

/// Outcome counts for one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.aborted + self.errors
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total()
    }
}

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let suite = load_suite(global)?;
    let summary = run_suite(&suite, args).await?;

    if summary.total() == 0 {
        println!("No tests to run.");
        return Ok(());
    }

    println!();
    println!(
        "Passed: {}, Failed: {}, Aborted: {}, Errors: {}",
        summary.passed, summary.failed, summary.aborted, summary.errors
    );

    if !summary.all_passed() {
        // Exit code 2 = Test failures
        std::process::exit(2);
    }

    Ok(())
}

/// Tables selected by `--tables`, warning about names the suite lacks
fn select_tables<'a>(suite: &'a SuiteFile, filter: Option<&[String]>) -> Vec<&'a TableSuite> {
    let Some(filter) = filter else {
        return suite.tables.iter().collect();
    };
    for name in filter {
        if !suite.tables.iter().any(|t| &t.table.name == name) {
            log::warn!("Table '{name}' is not part of suite '{}'", suite.name);
        }
    }
    suite
        .tables
        .iter()
        .filter(|t| filter.contains(&t.table.name))
        .collect()
}

/// Run every selected table's test cases, printing one line per test case
pub(crate) async fn run_suite(suite: &SuiteFile, args: &RunArgs) -> Result<RunSummary> {
    let filter = parse_filter(args.tables.as_deref());
    let tables = select_tables(suite, filter.as_deref());

    let mut connection = suite.connection.clone();
    if let Some(secs) = args.timeout_secs {
        connection.timeout_secs = secs;
    }
    let catalog: Arc<dyn CatalogClient> = Arc::new(InMemoryCatalog::from_suite(suite));

    let mut summary = RunSummary::default();
    for table_suite in tables {
        let cases = suite
            .test_cases(table_suite)
            .with_context(|| format!("Invalid test cases for table {}", table_suite.table.name))?;
        if cases.is_empty() {
            continue;
        }

        let fqn = &table_suite.table.fully_qualified_name;
        println!("{fqn} ({} tests)", cases.len());

        let start = Instant::now();
        let built = TestSuiteInterface::builder(
            connection.clone(),
            Arc::clone(&catalog),
            table_suite.table.clone(),
        )
        .with_default_schema(suite.default_schema.clone())
        .with_default_sample(suite.default_sample)
        .build()
        .await;
        let mut interface = match built {
            Ok(interface) => interface,
            Err(e) => {
                log::error!("Could not prepare {fqn}: {e}");
                println!("  ✗ {fqn} - {e} [{}ms]", start.elapsed().as_millis());
                summary.errors += cases.len();
                if args.fail_fast {
                    break;
                }
                continue;
            }
        };
        log::debug!("{fqn}: testing {} sample", interface.sample().source());

        let mut stop = false;
        for case in &cases {
            let start = Instant::now();
            let outcome = interface.run_test_case(case).await;
            let ms = start.elapsed().as_millis();

            let passed = match outcome {
                Ok(result) => match result.test_case_status {
                    TestCaseStatus::Success => {
                        summary.passed += 1;
                        println!("  ✓ {} [{ms}ms]", case.name);
                        true
                    }
                    TestCaseStatus::Failed => {
                        summary.failed += 1;
                        println!("  ✗ {} - {} [{ms}ms]", case.name, result.result);
                        for row in result
                            .test_result_value
                            .iter()
                            .filter(|v| v.name == "failingRow")
                        {
                            println!("      {}", row.value);
                        }
                        false
                    }
                    TestCaseStatus::Aborted => {
                        summary.aborted += 1;
                        println!("  ✗ {} (aborted) - {} [{ms}ms]", case.name, result.result);
                        false
                    }
                },
                Err(e) => {
                    summary.errors += 1;
                    println!("  ✗ {} - {} [{ms}ms]", case.name, e.cause());
                    false
                }
            };

            if args.fail_fast && !passed {
                stop = true;
                break;
            }
        }

        if let Err(e) = interface.close().await {
            log::warn!("Could not close session for {fqn}: {e}");
        }
        if stop {
            break;
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
