//! Runtime parameter setters
//!
//! Some validators need values that only exist at run time, such as the
//! current enum members of a column. A setter computes them right before
//! the validator is built; the interface serializes the result to JSON and
//! appends it to the test case under `runtimeParams`.

use crate::catalog::CatalogClient;
use crate::error::{ParameterError, ParameterResult};
use assay_core::{ConnectionConfig, TableEntity, TestCase};
use assay_sampler::Sampler;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything a setter may consult
#[derive(Clone)]
pub struct SetterContext {
    pub catalog: Arc<dyn CatalogClient>,
    pub connection: Arc<ConnectionConfig>,
    pub table: Arc<TableEntity>,
    pub sampler: Arc<dyn Sampler>,
}

/// Computes the runtime parameters of one test case
#[async_trait]
pub trait RuntimeParameterSetter: Send + Sync {
    async fn get_parameters(&self, test_case: &TestCase) -> ParameterResult<serde_json::Value>;
}

/// Builds a setter bound to an interface's collaborators
pub type SetterConstructor =
    Arc<dyn Fn(SetterContext) -> Box<dyn RuntimeParameterSetter> + Send + Sync>;

/// Runtime parameters of `columnValuesToBeInEnum`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValuesParams {
    pub enum_values: Vec<String>,
}

/// Reads the current members of an enum column from the catalog
pub struct EnumValuesSetter {
    ctx: SetterContext,
}

impl EnumValuesSetter {
    pub fn new(ctx: SetterContext) -> Self {
        Self { ctx }
    }

    /// Constructor suitable for registration
    pub fn constructor() -> SetterConstructor {
        Arc::new(|ctx| Box::new(EnumValuesSetter::new(ctx)) as Box<dyn RuntimeParameterSetter>)
    }
}

#[async_trait]
impl RuntimeParameterSetter for EnumValuesSetter {
    async fn get_parameters(&self, test_case: &TestCase) -> ParameterResult<serde_json::Value> {
        let column = test_case.column().ok_or_else(|| {
            ParameterError::Unresolvable(format!(
                "test case {} does not target a column",
                test_case.fully_qualified_name
            ))
        })?;

        // The catalog copy is fresher than the entity the interface was built with.
        let table = self
            .ctx
            .catalog
            .get_table_by_fqn(&self.ctx.table.fully_qualified_name)
            .await?;
        let enum_values = table
            .column(column.as_str())
            .map(|c| c.enum_values.clone())
            .filter(|values| !values.is_empty())
            .ok_or_else(|| {
                ParameterError::Unresolvable(format!(
                    "column '{column}' of {} declares no enum values",
                    table.fully_qualified_name
                ))
            })?;

        log::debug!(
            "Resolved {} enum values for {}.{column}",
            enum_values.len(),
            table.fully_qualified_name
        );
        Ok(serde_json::to_value(EnumValuesParams { enum_values })?)
    }
}
