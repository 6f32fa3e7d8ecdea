//! Connection configuration and suite files (`assay.yml`)

use crate::entity_link::EntityLink;
use crate::error::{CoreError, CoreResult};
use crate::names::ColumnName;
use crate::profile::SampleConfig;
use crate::table::TableEntity;
use crate::test_case::{TestCase, TestCaseParameterValue, TestDefinition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock limit for every validation query
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

const DEFAULT_DB_PATH: &str = ":memory:";

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
    /// Snowflake
    Snowflake,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
            DbType::Snowflake => write!(f, "snowflake"),
        }
    }
}

/// Username/password credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,

    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// SSL negotiation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SslMode {
    #[default]
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    /// True when the connection must fail rather than fall back to plaintext
    pub fn is_required(&self) -> bool {
        matches!(self, SslMode::Require | SslMode::VerifyCa | SslMode::VerifyFull)
    }

    /// True when the server certificate must be verified against a CA
    pub fn verifies_certificate(&self) -> bool {
        matches!(self, SslMode::VerifyCa | SslMode::VerifyFull)
    }
}

/// SSL settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslConfig {
    #[serde(default)]
    pub mode: SslMode,

    /// CA certificate used by `verify_ca` / `verify_full`
    #[serde(default)]
    pub ca_certificate: Option<PathBuf>,
}

/// How to reach the database holding the tables under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database type (duckdb or snowflake)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (DuckDB file or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Logical database name
    #[serde(default = "default_db_name")]
    pub name: String,

    /// Open the database read-only
    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub credentials: Option<Credentials>,

    #[serde(default)]
    pub ssl: SslConfig,

    /// Statements executed once right after the session opens
    #[serde(default)]
    pub on_connect: Vec<String>,

    /// Per-query timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
            name: default_db_name(),
            read_only: false,
            credentials: None,
            ssl: SslConfig::default(),
            on_connect: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_db_name() -> String {
    "main".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ConnectionConfig {
    /// In-memory DuckDB seeded by `on_connect`
    pub fn duckdb_in_memory(on_connect: Vec<String>) -> Self {
        Self {
            on_connect,
            ..Self::default()
        }
    }

    /// Per-query timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "connection path cannot be empty".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.ssl.mode.verifies_certificate() && self.ssl.ca_certificate.is_none() {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "ssl mode {:?} requires a ca_certificate",
                    self.ssl.mode
                ),
            });
        }
        Ok(())
    }
}

/// A test case as written in a suite file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseSpec {
    pub name: String,

    /// Name or fully-qualified name of a declared test definition
    pub definition: String,

    /// Target column for column-level tests
    #[serde(default)]
    pub column: Option<ColumnName>,

    #[serde(default)]
    pub parameters: BTreeMap<String, serde_yaml::Value>,
}

/// A table and the test cases to run against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSuite {
    #[serde(flatten)]
    pub table: TableEntity,

    #[serde(default)]
    pub tests: Vec<TestCaseSpec>,
}

/// Suite file (`assay.yml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteFile {
    /// Suite name
    pub name: String,

    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Schema for tables whose FQN carries none
    #[serde(default)]
    pub default_schema: Option<String>,

    /// Sample size for tables without their own
    #[serde(default)]
    pub default_sample: Option<SampleConfig>,

    #[serde(default)]
    pub test_definitions: Vec<TestDefinition>,

    #[serde(default)]
    pub tables: Vec<TableSuite>,
}

impl SuiteFile {
    /// Load a suite from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let suite: SuiteFile = serde_yaml::from_str(&content)?;
        suite.validate()?;
        Ok(suite)
    }

    /// Load `assay.yml` or `assay.yaml` from a directory
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("assay.yml");
        let yaml_path = dir.join("assay.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the suite
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Suite name cannot be empty".to_string(),
            });
        }
        self.connection.validate()?;
        if let Some(sample) = &self.default_sample {
            sample.validate()?;
        }

        let mut definitions = HashSet::new();
        for definition in &self.test_definitions {
            if !definitions.insert(definition.fully_qualified_name.as_str()) {
                return Err(CoreError::Duplicate {
                    kind: "test definition",
                    name: definition.fully_qualified_name.to_string(),
                });
            }
        }

        let mut tables = HashSet::new();
        for suite in &self.tables {
            if !tables.insert(suite.table.fully_qualified_name.as_str()) {
                return Err(CoreError::Duplicate {
                    kind: "table",
                    name: suite.table.fully_qualified_name.to_string(),
                });
            }
            self.test_cases(suite)?;
        }
        Ok(())
    }

    /// Find a declared definition by name or fully-qualified name
    pub fn definition(&self, name: &str) -> Option<&TestDefinition> {
        self.test_definitions
            .iter()
            .find(|d| d.fully_qualified_name == name || d.name == name)
    }

    /// Build the test cases declared for `suite`
    pub fn test_cases(&self, suite: &TableSuite) -> CoreResult<Vec<TestCase>> {
        let fqn = &suite.table.fully_qualified_name;
        suite
            .tests
            .iter()
            .map(|spec| {
                let definition =
                    self.definition(&spec.definition)
                        .ok_or_else(|| CoreError::UnknownTestDefinition {
                            test_case: spec.name.clone(),
                            definition: spec.definition.clone(),
                        })?;
                let link = match &spec.column {
                    Some(column) => EntityLink::column(fqn.clone(), column.clone()),
                    None => EntityLink::table(fqn.clone()),
                };
                let mut test_case = TestCase::new(spec.name.clone(), definition, link);
                for (name, value) in &spec.parameters {
                    test_case.parameter_values.push(TestCaseParameterValue {
                        name: name.clone(),
                        value: yaml_parameter_value(value)?,
                    });
                }
                Ok(test_case)
            })
            .collect()
    }
}

/// Render a YAML parameter as the string form test cases carry
fn yaml_parameter_value(value: &serde_yaml::Value) -> CoreResult<String> {
    Ok(match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other)?,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
