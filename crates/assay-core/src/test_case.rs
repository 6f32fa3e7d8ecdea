//! Test cases and the test definitions they instantiate.

use crate::entity_link::EntityLink;
use crate::error::{CoreError, CoreResult};
use crate::names::{ColumnName, Fqn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Reserved parameter name carrying runtime-computed parameters as JSON
pub const RUNTIME_PARAMS: &str = "runtimeParams";

/// Level a test definition applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Table,
    Column,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Table => write!(f, "table"),
            EntityType::Column => write!(f, "column"),
        }
    }
}

/// Parameter declared by a test definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParameterDefinition {
    pub name: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub description: Option<String>,
}

/// Catalog description of a kind of test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub name: String,

    /// Key used to resolve the validator, e.g. `columnValuesToBeNotNull`
    pub fully_qualified_name: Fqn,

    pub entity_type: EntityType,

    #[serde(default)]
    pub parameter_definition: Vec<TestParameterDefinition>,

    #[serde(default)]
    pub description: Option<String>,
}

impl TestDefinition {
    /// Create a definition whose name doubles as its fully-qualified name
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            fully_qualified_name: Fqn::new(name.clone()),
            name,
            entity_type,
            parameter_definition: Vec::new(),
            description: None,
        }
    }

    /// Reference to this definition, for use in a [`TestCase`]
    pub fn reference(&self) -> EntityReference {
        EntityReference {
            id: self.id,
            fully_qualified_name: Some(self.fully_qualified_name.clone()),
        }
    }

    /// Required parameters the test case does not supply
    pub fn missing_parameters<'a>(&'a self, test_case: &TestCase) -> Vec<&'a str> {
        self.parameter_definition
            .iter()
            .filter(|p| p.required && test_case.parameter(&p.name).is_none())
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// Reference to another catalog entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    pub id: Uuid,

    #[serde(default)]
    pub fully_qualified_name: Option<Fqn>,
}

/// A single named parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseParameterValue {
    pub name: String,
    pub value: String,
}

/// An instance of a test definition bound to a table or column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub name: String,

    pub fully_qualified_name: Fqn,

    pub test_definition: EntityReference,

    pub entity_link: EntityLink,

    #[serde(default)]
    pub parameter_values: Vec<TestCaseParameterValue>,
}

impl TestCase {
    /// Create a test case with no parameters
    pub fn new(
        name: impl Into<String>,
        definition: &TestDefinition,
        entity_link: EntityLink,
    ) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            fully_qualified_name: Fqn::new(format!("{}.{}", entity_link.fqn, name)),
            name,
            test_definition: definition.reference(),
            entity_link,
            parameter_values: Vec::new(),
        }
    }

    /// Append a parameter value
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameter_values.push(TestCaseParameterValue {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Column targeted by a column-level test case
    pub fn column(&self) -> Option<&ColumnName> {
        self.entity_link.column.as_ref()
    }

    /// Raw parameter value; the first occurrence wins
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameter_values
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Parameter parsed into `T`; `Ok(None)` if absent or blank
    pub fn parameter_as<T>(&self, name: &str) -> CoreResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.parameter(name).map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| CoreError::InvalidParameter {
                    name: name.to_string(),
                    message: format!("'{raw}': {e}"),
                }),
        }
    }

    /// Parameter parsed into `T`, failing if absent
    pub fn required_parameter<T>(&self, name: &str) -> CoreResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parameter_as(name)?
            .ok_or_else(|| CoreError::InvalidParameter {
                name: name.to_string(),
                message: "parameter is required".to_string(),
            })
    }

    /// Parameter holding a list of values: a JSON array or a comma-separated string
    pub fn list_parameter(&self, name: &str) -> CoreResult<Option<Vec<String>>> {
        let Some(raw) = self.parameter(name).map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        if raw.starts_with('[') {
            let values: Vec<serde_json::Value> =
                serde_json::from_str(raw).map_err(|e| CoreError::InvalidParameter {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
            return Ok(Some(
                values
                    .into_iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ));
        }
        Ok(Some(
            raw.split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
        ))
    }

    /// Copy of this test case with `runtime_params` appended under
    /// [`RUNTIME_PARAMS`].
    ///
    /// Caller-supplied entries under the reserved name are dropped so the copy
    /// carries exactly one.
    pub fn with_runtime_params(&self, runtime_params: String) -> TestCase {
        let mut test_case = self.clone();
        let before = test_case.parameter_values.len();
        test_case
            .parameter_values
            .retain(|p| p.name != RUNTIME_PARAMS);
        if test_case.parameter_values.len() != before {
            log::warn!(
                "Test case {} supplied a '{}' parameter; replacing it with computed values",
                self.fully_qualified_name,
                RUNTIME_PARAMS
            );
        }
        test_case.parameter_values.push(TestCaseParameterValue {
            name: RUNTIME_PARAMS.to_string(),
            value: runtime_params,
        });
        test_case
    }
}

#[cfg(test)]
#[path = "test_case_test.rs"]
mod tests;
