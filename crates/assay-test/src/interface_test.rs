use super::*;
use crate::catalog::InMemoryCatalog;
use assay_core::{Fqn, SampleConfig, SslMode};
use assay_sampler::SampleSource;

const ORDERS: &str = "CREATE TABLE orders AS SELECT range AS order_id FROM range(100)";

fn connection() -> ConnectionConfig {
    ConnectionConfig::duckdb_in_memory(vec![ORDERS.to_string()])
}

fn orders() -> TableEntity {
    TableEntity::new("orders", Fqn::new("svc.warehouse.main.orders"))
}

fn builder() -> InterfaceBuilder {
    InterfaceBuilder::new(connection(), Arc::new(InMemoryCatalog::new()), orders())
}

#[test]
fn test_state_display() {
    assert_eq!(InterfaceState::Ready.to_string(), "ready");
    assert_eq!(InterfaceState::Executing.to_string(), "executing");
    assert_eq!(InterfaceState::Closed.to_string(), "closed");
}

#[tokio::test]
async fn test_sample_before_sampler_is_not_ready() {
    let mut builder = builder();
    let err = builder.sample().await.unwrap_err();
    assert!(matches!(err, InterfaceError::NotReady("sampler not yet created")));

    builder.open_session().await.unwrap();
    builder.resolve_table().await.unwrap();
    assert!(matches!(
        builder.sample().await.unwrap_err(),
        InterfaceError::NotReady(_)
    ));
}

#[tokio::test]
async fn test_steps_out_of_order() {
    let mut builder = builder();
    assert!(matches!(
        builder.resolve_table().await.unwrap_err(),
        InterfaceError::NotReady("session not yet opened")
    ));
    assert!(matches!(
        builder.create_sampler().err(),
        Some(InterfaceError::NotReady("session not yet opened"))
    ));

    builder.open_session().await.unwrap();
    assert!(matches!(
        builder.create_sampler().err(),
        Some(InterfaceError::NotReady("table not yet resolved"))
    ));
}

#[tokio::test]
async fn test_step_by_step() {
    let mut builder = builder();
    builder.open_session().await.unwrap();
    let relation = builder.resolve_table().await.unwrap();
    assert_eq!(relation.qualified_name(), "main.orders");
    assert_eq!(relation.columns.len(), 1);

    assert!(builder.create_sampler().is_ok());
    let first = builder.sample().await.unwrap();
    let second = builder.sample().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let interface = builder.build().await.unwrap();
    assert_eq!(interface.state(), InterfaceState::Ready);
    assert!(Arc::ptr_eq(interface.sample(), &first));
}

#[tokio::test]
async fn test_default_sample_applies_without_table_profile() {
    let interface = builder()
        .with_default_sample(Some(SampleConfig::rows(10)))
        .build()
        .await
        .unwrap();
    assert_eq!(interface.sample().source(), SampleSource::Materialized);
    assert_eq!(interface.runner().row_count().await.unwrap(), 10);
}

#[tokio::test]
async fn test_invalid_default_sample_is_a_config_error() {
    let err = builder()
        .with_default_sample(Some(SampleConfig::percentage(0.0)))
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, InterfaceError::Config(_)));
}

#[tokio::test]
async fn test_default_schema() {
    let connection = ConnectionConfig::duckdb_in_memory(vec![
        "CREATE SCHEMA sales".to_string(),
        "CREATE TABLE sales.orders (id INT)".to_string(),
    ]);
    // No schema in the entity or its FQN
    let orders = || TableEntity::new("orders", Fqn::new("orders"));
    let err = InterfaceBuilder::new(connection.clone(), Arc::new(InMemoryCatalog::new()), orders())
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, InterfaceError::TableNotFound { .. }));

    let interface = TestSuiteInterface::new(
        connection,
        Arc::new(InMemoryCatalog::new()),
        orders(),
        Some("sales".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(interface.runner().relation().qualified_name(), "sales.orders");
}

#[tokio::test]
async fn test_connection_failure() {
    let mut connection = connection();
    connection.ssl.mode = SslMode::Require;
    let err = InterfaceBuilder::new(connection, Arc::new(InMemoryCatalog::new()), orders())
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, InterfaceError::Connection(_)));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let mut interface = builder().build().await.unwrap();
    interface.close().await.unwrap();
    assert_eq!(interface.state(), InterfaceState::Closed);
    interface.close().await.unwrap();
}
