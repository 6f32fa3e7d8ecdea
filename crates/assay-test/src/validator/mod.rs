//! Validators and their registry
//!
//! A validator evaluates one test case against a [`QueryRunner`] and yields a
//! [`TestCaseResult`]. Invalid parameters and missing columns produce an
//! `Aborted` result; query failures and timeouts are returned as errors.

use crate::error::{ValidatorError, ValidatorResult};
use crate::runner::QueryRunner;
use assay_core::{TestCase, TestCaseResult, RUNTIME_PARAMS};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::sync::Arc;

/// Define a validator struct holding its [`ValidatorContext`].
///
/// The struct must provide `async fn evaluate(&self) -> ValidatorResult<TestCaseResult>`;
/// the generated `run_validation` turns invalid-input errors into `Aborted`
/// results.
macro_rules! validator {
    (
        $(#[$meta:meta])*
        $Name:ident
    ) => {
        $(#[$meta])*
        pub struct $Name {
            ctx: $crate::validator::ValidatorContext,
        }

        impl From<$crate::validator::ValidatorContext> for $Name {
            fn from(ctx: $crate::validator::ValidatorContext) -> Self {
                Self { ctx }
            }
        }

        #[async_trait::async_trait]
        impl $crate::validator::Validator for $Name {
            async fn run_validation(
                &self,
            ) -> $crate::error::ValidatorResult<assay_core::TestCaseResult> {
                self.ctx.settle(self.evaluate().await)
            }
        }
    };
}

pub(crate) use validator;

pub mod column;
pub mod registry;
pub mod table;

pub use registry::{ValidatorEntry, ValidatorRegistry};

/// Evaluates one test case
#[async_trait]
pub trait Validator: Send + Sync {
    async fn run_validation(&self) -> ValidatorResult<TestCaseResult>;
}

/// Builds a validator for one test case
pub type ValidatorConstructor = Arc<dyn Fn(ValidatorContext) -> Box<dyn Validator> + Send + Sync>;

/// Constructor for any validator built from its context
pub fn constructor<V>() -> ValidatorConstructor
where
    V: Validator + From<ValidatorContext> + 'static,
{
    Arc::new(|ctx| Box::new(V::from(ctx)) as Box<dyn Validator>)
}

/// What a validator is bound to: the runner, the test case (runtime
/// parameters included) and the execution timestamp in epoch milliseconds
#[derive(Debug, Clone)]
pub struct ValidatorContext {
    pub runner: Arc<QueryRunner>,
    pub test_case: TestCase,
    pub execution_date: i64,
}

impl ValidatorContext {
    pub fn new(runner: Arc<QueryRunner>, test_case: TestCase, execution_date: i64) -> Self {
        Self {
            runner,
            test_case,
            execution_date,
        }
    }

    /// Name of the targeted column as the table spells it
    pub fn target_column(&self) -> ValidatorResult<String> {
        let column = self
            .test_case
            .column()
            .ok_or_else(|| ValidatorError::InvalidParameter {
                name: "column".to_string(),
                message: format!(
                    "entity link {} does not name a column",
                    self.test_case.entity_link
                ),
            })?;
        let relation = self.runner.relation();
        relation
            .column(column.as_str())
            .map(|c| c.name.clone())
            .ok_or_else(|| ValidatorError::MissingColumn {
                column: column.to_string(),
                table: relation.qualified_name(),
            })
    }

    /// Optional parameter parsed into `T`
    pub fn parameter<T>(&self, name: &str) -> ValidatorResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.test_case.parameter_as(name)?)
    }

    /// Required parameter parsed into `T`
    pub fn required<T>(&self, name: &str) -> ValidatorResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.test_case.required_parameter(name)?)
    }

    /// Required list parameter
    pub fn required_list(&self, name: &str) -> ValidatorResult<Vec<String>> {
        self.test_case
            .list_parameter(name)?
            .filter(|values| !values.is_empty())
            .ok_or_else(|| ValidatorError::InvalidParameter {
                name: name.to_string(),
                message: "at least one value is required".to_string(),
            })
    }

    /// The `runtimeParams` entry decoded into `T`
    pub fn runtime_params<T: DeserializeOwned>(&self) -> ValidatorResult<T> {
        let raw = self.test_case.parameter(RUNTIME_PARAMS).ok_or_else(|| {
            ValidatorError::InvalidParameter {
                name: RUNTIME_PARAMS.to_string(),
                message: "runtime parameters were not computed".to_string(),
            }
        })?;
        serde_json::from_str(raw).map_err(|e| ValidatorError::InvalidParameter {
            name: RUNTIME_PARAMS.to_string(),
            message: e.to_string(),
        })
    }

    /// Result of a check that held when `passed`
    pub fn evaluated(&self, passed: bool, message: impl Into<String>) -> TestCaseResult {
        TestCaseResult::evaluated(self.execution_date, passed, message)
    }

    /// Turn invalid-input errors into an `Aborted` result
    fn settle(&self, outcome: ValidatorResult<TestCaseResult>) -> ValidatorResult<TestCaseResult> {
        match outcome {
            Err(
                err @ (ValidatorError::InvalidParameter { .. } | ValidatorError::MissingColumn { .. }),
            ) => {
                log::warn!(
                    "Aborting {}: {err}",
                    self.test_case.fully_qualified_name
                );
                Ok(TestCaseResult::aborted(self.execution_date, err.to_string()))
            }
            other => other,
        }
    }
}
