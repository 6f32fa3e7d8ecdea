//! Bounded query execution against a sample

use crate::error::{RunnerError, RunnerResult};
use assay_core::sql_utils::quote_ident;
use assay_core::{Relation, DEFAULT_TIMEOUT_SECS};
use assay_db::{Database, DbResult, QueryResult};
use assay_sampler::Sample;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default wall-clock limit for a single query
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// How often an overdue statement is re-interrupted while waiting for the
/// session to come back
const INTERRUPT_RETRY: Duration = Duration::from_millis(100);

/// Numeric aggregate over a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Min,
    Max,
    Avg,
    Sum,
}

impl Aggregate {
    fn sql_function(&self) -> &'static str {
        match self {
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
            Aggregate::Avg => "AVG",
            Aggregate::Sum => "SUM",
        }
    }
}

/// Runs validation queries against a fixed sample, each under the same timeout.
///
/// On timeout the in-flight statement is interrupted and the session is
/// recovered before the error is returned, so the next call starts clean.
pub struct QueryRunner {
    session: Arc<dyn Database>,
    sample: Arc<Sample>,
    timeout: Duration,
}

impl QueryRunner {
    /// Create a runner over `sample`
    pub fn new(session: Arc<dyn Database>, sample: Arc<Sample>, timeout: Duration) -> Self {
        Self {
            session,
            sample,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn sample(&self) -> &Arc<Sample> {
        &self.sample
    }

    /// The sampled table, with its live column list
    pub fn relation(&self) -> &Relation {
        self.sample.relation()
    }

    /// SQL to place after `FROM` to read the sample
    pub fn dataset(&self) -> &str {
        self.sample.from_clause()
    }

    /// Number of sampled rows
    pub async fn row_count(&self) -> RunnerResult<u64> {
        self.count_rows(&format!("SELECT * FROM {}", self.dataset()))
            .await
    }

    /// Number of sampled rows where `column` is NULL
    pub async fn count_nulls(&self, column: &str) -> RunnerResult<u64> {
        self.count_where(&format!("{} IS NULL", quote_ident(column)))
            .await
    }

    /// Number of distinct non-NULL values of `column`
    pub async fn count_distinct(&self, column: &str) -> RunnerResult<u64> {
        self.scalar_u64(&format!(
            "SELECT COUNT(DISTINCT {}) FROM {}",
            quote_ident(column),
            self.dataset()
        ))
        .await
    }

    /// Number of sampled rows whose `column` value appears more than once
    pub async fn count_duplicates(&self, column: &str) -> RunnerResult<u64> {
        let qc = quote_ident(column);
        self.scalar_u64(&format!(
            "SELECT CAST(COALESCE(SUM(cnt), 0) AS BIGINT) FROM (\
             SELECT COUNT(*) AS cnt FROM {} WHERE {qc} IS NOT NULL \
             GROUP BY {qc} HAVING COUNT(*) > 1) AS _dups",
            self.dataset()
        ))
        .await
    }

    /// Number of sampled rows matching `predicate`
    pub async fn count_where(&self, predicate: &str) -> RunnerResult<u64> {
        self.count_rows(&format!(
            "SELECT * FROM {} WHERE {predicate}",
            self.dataset()
        ))
        .await
    }

    /// Aggregate of `column` over the sample; `None` when every value is NULL
    pub async fn aggregate(&self, aggregate: Aggregate, column: &str) -> RunnerResult<Option<f64>> {
        let sql = format!(
            "SELECT CAST({}({}) AS DOUBLE) FROM {}",
            aggregate.sql_function(),
            quote_ident(column),
            self.dataset()
        );
        match self.scalar(&sql).await? {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| RunnerError::UnexpectedResult(format!("'{raw}' is not a number"))),
        }
    }

    /// Up to `limit` sampled rows matching `predicate`, rendered for reports
    pub async fn failing_rows(&self, predicate: &str, limit: usize) -> RunnerResult<Vec<String>> {
        let sql = format!("SELECT * FROM {} WHERE {predicate}", self.dataset());
        self.bounded(&sql, self.session.query_sample_rows(&sql, limit))
            .await
    }

    /// Number of rows an arbitrary query returns
    pub async fn count_rows(&self, sql: &str) -> RunnerResult<u64> {
        self.bounded(sql, self.session.query_count(sql)).await
    }

    /// All rows of an arbitrary query
    pub async fn query(&self, sql: &str) -> RunnerResult<QueryResult> {
        self.bounded(sql, self.session.query_rows(sql)).await
    }

    /// First value of the first row of an arbitrary query
    pub async fn scalar(&self, sql: &str) -> RunnerResult<Option<String>> {
        Ok(self.query(sql).await?.scalar().map(str::to_string))
    }

    async fn scalar_u64(&self, sql: &str) -> RunnerResult<u64> {
        let raw = self
            .scalar(sql)
            .await?
            .ok_or_else(|| RunnerError::UnexpectedResult(format!("no value returned by: {sql}")))?;
        raw.parse::<u64>()
            .map_err(|_| RunnerError::UnexpectedResult(format!("'{raw}' is not a count")))
    }

    /// Await `query` under the timeout, reclaiming the session if it expires
    async fn bounded<T, F>(&self, sql: &str, query: F) -> RunnerResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result.map_err(RunnerError::from),
            Err(_) => {
                log::warn!(
                    "Query exceeded {:?}, interrupting: {sql}",
                    self.timeout
                );
                self.reclaim_session().await;
                Err(RunnerError::Timeout {
                    timeout: self.timeout,
                })
            }
        }
    }

    /// Interrupt the abandoned statement until the session answers again
    async fn reclaim_session(&self) {
        self.session.interrupt();
        let recover = self.session.recover();
        tokio::pin!(recover);
        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);
        // The statement may not have reached the driver yet; keep interrupting
        let mut retry = tokio::time::interval_at(
            tokio::time::Instant::now() + INTERRUPT_RETRY,
            INTERRUPT_RETRY,
        );

        loop {
            tokio::select! {
                biased;
                _ = retry.tick() => self.session.interrupt(),
                result = &mut recover => {
                    if let Err(e) = result {
                        log::warn!("Session recovery after timeout failed: {e}");
                    }
                    return;
                }
                _ = &mut deadline => {
                    log::error!(
                        "Session still busy {:?} after interrupting a timed-out query",
                        self.timeout
                    );
                    return;
                }
            }
        }
    }
}

impl std::fmt::Debug for QueryRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRunner")
            .field("dataset", &self.dataset())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
