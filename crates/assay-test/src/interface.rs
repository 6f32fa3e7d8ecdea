//! Test suite interface: runs test cases against one table
//!
//! An interface owns one session, one sampler, one drawn sample and one
//! bounded runner for the lifetime of the instance. [`InterfaceBuilder`]
//! performs the construction steps in order; a built [`TestSuiteInterface`]
//! always has all of them.

use crate::catalog::CatalogClient;
use crate::error::{
    CatalogError, ExecutionCause, ExecutionError, InterfaceError, InterfaceResult,
    ParameterError, ResolutionError,
};
use crate::runner::QueryRunner;
use crate::runtime_params::SetterContext;
use crate::validator::{ValidatorContext, ValidatorRegistry};
use assay_core::{
    ConnectionConfig, Relation, SampleConfig, SamplingSettings, TableEntity, TestCase,
    TestCaseResult,
};
use assay_db::{open_session, Database};
use assay_sampler::{Sample, Sampler, SamplerFactory};
use std::sync::Arc;
use std::time::Duration;

/// Schema used when neither the table nor the caller names one
const FALLBACK_SCHEMA: &str = "main";

/// Lifecycle of a [`TestSuiteInterface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceState {
    /// Idle, ready for the next test case
    Ready,
    /// A test case is running, or a previous run was cancelled mid-flight
    Executing,
    /// Session released; no further test cases
    Closed,
}

impl std::fmt::Display for InterfaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceState::Ready => write!(f, "ready"),
            InterfaceState::Executing => write!(f, "executing"),
            InterfaceState::Closed => write!(f, "closed"),
        }
    }
}

/// Step-by-step construction of a [`TestSuiteInterface`].
///
/// Steps run in order: [`open_session`](Self::open_session),
/// [`resolve_table`](Self::resolve_table), [`create_sampler`](Self::create_sampler),
/// then [`build`](Self::build) draws the sample and creates the runner. Calling
/// a step before the one it depends on fails with [`InterfaceError::NotReady`].
/// If the builder is dropped or `build` fails, the session is released with it.
pub struct InterfaceBuilder {
    connection: Arc<ConnectionConfig>,
    catalog: Arc<dyn CatalogClient>,
    table: Arc<TableEntity>,
    default_schema: Option<String>,
    default_sample: Option<SampleConfig>,
    timeout: Duration,
    sampler_factory: SamplerFactory,
    registry: Arc<ValidatorRegistry>,
    session: Option<Arc<dyn Database>>,
    relation: Option<Relation>,
    sampler: Option<Arc<dyn Sampler>>,
}

impl InterfaceBuilder {
    pub fn new(
        connection: ConnectionConfig,
        catalog: Arc<dyn CatalogClient>,
        table_entity: TableEntity,
    ) -> Self {
        let timeout = connection.timeout();
        Self {
            connection: Arc::new(connection),
            catalog,
            table: Arc::new(table_entity),
            default_schema: None,
            default_sample: None,
            timeout,
            sampler_factory: SamplerFactory::with_defaults(),
            registry: Arc::new(ValidatorRegistry::with_builtins()),
            session: None,
            relation: None,
            sampler: None,
        }
    }

    /// Schema for tables whose entity carries none
    pub fn with_default_schema(mut self, schema: Option<String>) -> Self {
        self.default_schema = schema.filter(|s| !s.trim().is_empty());
        self
    }

    /// Sample size for tables without their own profiler sample
    pub fn with_default_sample(mut self, sample: Option<SampleConfig>) -> Self {
        self.default_sample = sample;
        self
    }

    /// Per-query timeout, overriding the connection's
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sampler_factory(mut self, factory: SamplerFactory) -> Self {
        self.sampler_factory = factory;
        self
    }

    pub fn with_registry(mut self, registry: Arc<ValidatorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Use an already open session instead of opening one from the config
    pub fn with_session(mut self, session: Arc<dyn Database>) -> Self {
        self.session = Some(session);
        self
    }

    /// Open the session described by the connection config
    pub async fn open_session(&mut self) -> InterfaceResult<&Arc<dyn Database>> {
        if self.session.is_none() {
            let session = open_session(&self.connection)
                .await
                .map_err(InterfaceError::Connection)?;
            self.session = Some(session);
        }
        self.session
            .as_ref()
            .ok_or(InterfaceError::NotReady("session not yet opened"))
    }

    /// Resolve the table entity to its live relation
    pub async fn resolve_table(&mut self) -> InterfaceResult<&Relation> {
        let session = self
            .session
            .as_ref()
            .ok_or(InterfaceError::NotReady("session not yet opened"))?;

        let schema = self.table.schema(
            self.default_schema
                .as_deref()
                .unwrap_or(FALLBACK_SCHEMA),
        );
        let columns = session.describe_relation(&schema, &self.table.name).await?;
        if columns.is_empty() {
            return Err(InterfaceError::TableNotFound {
                table: format!("{schema}.{}", self.table.name),
            });
        }
        log::debug!(
            "Resolved {} to {schema}.{} ({} columns)",
            self.table.fully_qualified_name,
            self.table.name,
            columns.len()
        );

        let relation = self.relation.insert(Relation {
            schema,
            table: self.table.name.clone(),
            columns,
        });
        Ok(&*relation)
    }

    /// Build the sampler for the session's dialect
    pub fn create_sampler(&mut self) -> InterfaceResult<&Arc<dyn Sampler>> {
        let session = self
            .session
            .as_ref()
            .ok_or(InterfaceError::NotReady("session not yet opened"))?;
        let relation = self
            .relation
            .as_ref()
            .ok_or(InterfaceError::NotReady("table not yet resolved"))?;

        let settings =
            SamplingSettings::resolve(self.table.profile.as_ref(), self.default_sample.as_ref())
                .map_err(|e| InterfaceError::Config(e.to_string()))?;
        let sampler = self.sampler_factory.create(
            session.db_type(),
            Arc::clone(session),
            relation.clone(),
            settings,
        )?;
        Ok(&*self.sampler.insert(sampler))
    }

    /// The sample, drawn on first access
    pub async fn sample(&self) -> InterfaceResult<Arc<Sample>> {
        let sampler = self
            .sampler
            .as_ref()
            .ok_or(InterfaceError::NotReady("sampler not yet created"))?;
        Ok(sampler.random_sample().await?)
    }

    /// Run the remaining steps and return a ready interface
    pub async fn build(mut self) -> InterfaceResult<TestSuiteInterface> {
        self.open_session().await?;
        if self.relation.is_none() {
            self.resolve_table().await?;
        }
        if self.sampler.is_none() {
            self.create_sampler()?;
        }
        let sample = self.sample().await?;

        let (Some(session), Some(sampler)) = (self.session, self.sampler) else {
            return Err(InterfaceError::NotReady("sampler not yet created"));
        };
        log::debug!(
            "Test suite for {} ready: {} sample, {:?} timeout",
            self.table.fully_qualified_name,
            sample.source(),
            self.timeout
        );

        let runner = Arc::new(QueryRunner::new(
            Arc::clone(&session),
            Arc::clone(&sample),
            self.timeout,
        ));
        Ok(TestSuiteInterface {
            state: InterfaceState::Ready,
            connection: self.connection,
            catalog: self.catalog,
            table: self.table,
            registry: self.registry,
            session,
            sampler,
            sample,
            runner,
        })
    }
}

/// Runs test cases for one table through a fixed sample and bounded runner
pub struct TestSuiteInterface {
    state: InterfaceState,
    connection: Arc<ConnectionConfig>,
    catalog: Arc<dyn CatalogClient>,
    table: Arc<TableEntity>,
    registry: Arc<ValidatorRegistry>,
    session: Arc<dyn Database>,
    sampler: Arc<dyn Sampler>,
    sample: Arc<Sample>,
    runner: Arc<QueryRunner>,
}

impl TestSuiteInterface {
    /// Open a session, resolve the table and draw its sample
    pub async fn new(
        connection: ConnectionConfig,
        catalog: Arc<dyn CatalogClient>,
        table_entity: TableEntity,
        default_schema: Option<String>,
    ) -> InterfaceResult<Self> {
        Self::builder(connection, catalog, table_entity)
            .with_default_schema(default_schema)
            .build()
            .await
    }

    pub fn builder(
        connection: ConnectionConfig,
        catalog: Arc<dyn CatalogClient>,
        table_entity: TableEntity,
    ) -> InterfaceBuilder {
        InterfaceBuilder::new(connection, catalog, table_entity)
    }

    pub fn state(&self) -> InterfaceState {
        self.state
    }

    pub fn table(&self) -> &TableEntity {
        &self.table
    }

    pub fn sampler(&self) -> &Arc<dyn Sampler> {
        &self.sampler
    }

    pub fn sample(&self) -> &Arc<Sample> {
        &self.sample
    }

    pub fn runner(&self) -> &Arc<QueryRunner> {
        &self.runner
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Run one test case.
    ///
    /// Any failure is logged with the test case's fully-qualified name and
    /// returned as an [`ExecutionError`] carrying the typed cause.
    pub async fn run_test_case(
        &mut self,
        test_case: &TestCase,
    ) -> Result<TestCaseResult, ExecutionError> {
        let outcome = match self.state {
            InterfaceState::Closed => Err(ExecutionCause::InvalidState {
                state: InterfaceState::Closed,
            }),
            InterfaceState::Executing | InterfaceState::Ready => {
                if self.state == InterfaceState::Executing {
                    log::warn!("Previous test case was cancelled mid-flight; recovering session");
                    if let Err(e) = self.session.recover().await {
                        log::warn!("Session recovery failed: {e}");
                    }
                }
                self.state = InterfaceState::Executing;
                let outcome = self.execute(test_case).await;
                self.state = InterfaceState::Ready;
                outcome
            }
        };

        outcome.map_err(|cause| {
            let err = ExecutionError::new(test_case.fully_qualified_name.to_string(), cause);
            log::error!("{err}");
            err
        })
    }

    async fn execute(&self, test_case: &TestCase) -> Result<TestCaseResult, ExecutionCause> {
        let definition = self
            .catalog
            .get_test_definition(&test_case.test_definition)
            .await
            .map_err(|e| match e {
                CatalogError::NotFound { key, .. } => {
                    ExecutionCause::Resolution(ResolutionError::UnknownDefinition(key))
                }
                other => ExecutionCause::Catalog(other),
            })?;
        let entry = self.registry.resolve(
            definition.entity_type,
            definition.fully_qualified_name.as_str(),
        )?;

        let test_case = match entry.runtime_parameter_setter() {
            Some(setter) => {
                let setter = setter(SetterContext {
                    catalog: Arc::clone(&self.catalog),
                    connection: Arc::clone(&self.connection),
                    table: Arc::clone(&self.table),
                    sampler: Arc::clone(&self.sampler),
                });
                let params = setter.get_parameters(test_case).await?;
                let params = serde_json::to_string(&params).map_err(ParameterError::from)?;
                test_case.with_runtime_params(params)
            }
            None => test_case.clone(),
        };

        let execution_date = chrono::Utc::now().timestamp_millis();
        let missing = definition.missing_parameters(&test_case);
        if !missing.is_empty() {
            return Ok(TestCaseResult::aborted(
                execution_date,
                format!("Missing required parameters: {}", missing.join(", ")),
            ));
        }

        log::debug!(
            "Running {} with validator {} ({})",
            test_case.fully_qualified_name,
            entry.name(),
            entry.entity_type()
        );
        let validator = entry.construct(ValidatorContext::new(
            Arc::clone(&self.runner),
            test_case,
            execution_date,
        ));
        Ok(validator.run_validation().await?)
    }

    /// Drop the sample's database objects and release the session.
    ///
    /// Later calls to [`run_test_case`](Self::run_test_case) fail with an
    /// invalid-state cause. Closing twice is a no-op.
    pub async fn close(&mut self) -> InterfaceResult<()> {
        if self.state == InterfaceState::Closed {
            return Ok(());
        }
        self.state = InterfaceState::Closed;
        if let Err(e) = self.sampler.cleanup().await {
            log::warn!(
                "Could not drop sample for {}: {e}",
                self.table.fully_qualified_name
            );
        }
        self.session.close().await?;
        Ok(())
    }
}

impl std::fmt::Debug for TestSuiteInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestSuiteInterface")
            .field("state", &self.state)
            .field("table", &self.table.fully_qualified_name)
            .field("sample", &self.sample.source())
            .field("runner", &self.runner)
            .finish()
    }
}

#[cfg(test)]
#[path = "interface_test.rs"]
mod tests;
