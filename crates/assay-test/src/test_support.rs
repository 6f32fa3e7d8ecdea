//! Fixtures shared by unit tests

use crate::error::ValidatorResult;
use crate::runner::{QueryRunner, DEFAULT_TIMEOUT};
use crate::validator::{Validator, ValidatorContext};
use assay_core::{
    ColumnName, EntityLink, EntityType, Fqn, Relation, SamplingSettings, TestCase,
    TestCaseResult, TestDefinition,
};
use assay_db::{Database, DuckDbBackend};
use assay_sampler::{DuckDbSampler, Sampler};
use std::sync::Arc;

pub(crate) const EXECUTION_DATE: i64 = 1_700_000_000_000;

pub(crate) const ORDERS: &str = "\
    CREATE TABLE orders (order_id INT, status VARCHAR, amount DOUBLE, email VARCHAR);
    INSERT INTO orders VALUES
        (1, 'shipped', 10.0, 'a@example.com'),
        (2, 'pending', 25.5, 'b@example.com'),
        (3, 'shipped', 99.0, 'not-an-email'),
        (4, 'cancelled', NULL, NULL),
        (4, 'shipped', 5.0, 'd@example.com');";

/// Runner over the whole of `main.orders` after running `setup`
pub(crate) async fn orders_runner(setup: &str) -> Arc<QueryRunner> {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(setup).await.unwrap();
    let columns = db.describe_relation("main", "orders").await.unwrap();
    let session: Arc<dyn Database> = Arc::new(db);
    let relation = Relation {
        schema: "main".to_string(),
        table: "orders".to_string(),
        columns,
    };
    let sampler = DuckDbSampler::new(session.clone(), relation, SamplingSettings::default()).unwrap();
    let sample = sampler.random_sample().await.unwrap();
    Arc::new(QueryRunner::new(session, sample, DEFAULT_TIMEOUT))
}

fn orders_fqn() -> Fqn {
    Fqn::new("svc.warehouse.main.orders")
}

pub(crate) fn column_case(definition: &str, column: &str) -> TestCase {
    let definition = TestDefinition::new(definition, EntityType::Column);
    TestCase::new(
        format!("{column}_{}", definition.name),
        &definition,
        EntityLink::column(orders_fqn(), ColumnName::new(column)),
    )
}

pub(crate) fn table_case(definition: &str) -> TestCase {
    let definition = TestDefinition::new(definition, EntityType::Table);
    TestCase::new(
        format!("orders_{}", definition.name),
        &definition,
        EntityLink::table(orders_fqn()),
    )
}

/// Build validator `V` for `test_case` and run it
pub(crate) async fn run<V>(runner: &Arc<QueryRunner>, test_case: TestCase) -> ValidatorResult<TestCaseResult>
where
    V: Validator + From<ValidatorContext>,
{
    V::from(ValidatorContext::new(Arc::clone(runner), test_case, EXECUTION_DATE))
        .run_validation()
        .await
}
