use super::*;
use assay_core::{ColumnName, IntervalUnit, PartitionConfig, PartitionIntervalType};
use assay_db::DuckDbBackend;
use crate::SampleSource;

async fn orders_session() -> Arc<dyn Database> {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE orders AS SELECT \
            range AS order_id, \
            CASE WHEN range % 2 = 0 THEN 'EU' ELSE 'US' END AS region, \
            CAST(now() AS TIMESTAMP) - to_days(CAST(range AS INTEGER)) AS created_at \
         FROM range(1000)",
    )
    .await
    .unwrap();
    Arc::new(db)
}

fn orders() -> Relation {
    Relation {
        schema: "main".to_string(),
        table: "orders".to_string(),
        columns: Vec::new(),
    }
}

fn partition(interval_type: PartitionIntervalType) -> PartitionConfig {
    PartitionConfig {
        enabled: true,
        column: ColumnName::new("order_id"),
        interval_type,
        interval: None,
        interval_unit: None,
        start: None,
        end: None,
        values: Vec::new(),
    }
}

async fn count(session: &Arc<dyn Database>, sample: &Sample) -> u64 {
    session
        .query_count(&format!("SELECT * FROM {}", sample.from_clause()))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_no_settings_uses_full_table() {
    let session = orders_session().await;
    let sampler = DuckDbSampler::new(session.clone(), orders(), SamplingSettings::default()).unwrap();

    let sample = sampler.random_sample().await.unwrap();
    assert_eq!(sample.source(), SampleSource::FullTable);
    assert_eq!(sample.from_clause(), r#""main"."orders""#);
    assert_eq!(count(&session, &sample).await, 1000);
}

#[tokio::test]
async fn test_hundred_percent_is_full_table() {
    let session = orders_session().await;
    let settings = SamplingSettings {
        sample: Some(SampleConfig::percentage(100.0)),
        ..Default::default()
    };
    let sampler = DuckDbSampler::new(session, orders(), settings).unwrap();
    assert_eq!(
        sampler.random_sample().await.unwrap().source(),
        SampleSource::FullTable
    );
}

#[tokio::test]
async fn test_percentage_sample_is_drawn_once() {
    let session = orders_session().await;
    let settings = SamplingSettings {
        sample: Some(SampleConfig::percentage(10.0)),
        ..Default::default()
    };
    let sampler = DuckDbSampler::new(session.clone(), orders(), settings).unwrap();

    let first = sampler.random_sample().await.unwrap();
    assert_eq!(first.source(), SampleSource::Materialized);
    let first_ids = session
        .query_rows(&format!(
            "SELECT order_id FROM {} ORDER BY order_id",
            first.from_clause()
        ))
        .await
        .unwrap();
    assert!(first_ids.rows.len() < 1000);

    let second = sampler.random_sample().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    let second_ids = session
        .query_rows(&format!(
            "SELECT order_id FROM {} ORDER BY order_id",
            second.from_clause()
        ))
        .await
        .unwrap();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn test_row_sample() {
    let session = orders_session().await;
    let settings = SamplingSettings {
        sample: Some(SampleConfig::rows(25)),
        ..Default::default()
    };
    let sampler = DuckDbSampler::new(session.clone(), orders(), settings).unwrap();
    let sample = sampler.random_sample().await.unwrap();
    assert_eq!(count(&session, &sample).await, 25);
}

#[tokio::test]
async fn test_partition_without_sample_filters() {
    let session = orders_session().await;
    let mut range = partition(PartitionIntervalType::IntegerRange);
    range.start = Some(100);
    range.end = Some(199);
    let settings = SamplingSettings {
        partition: Some(range),
        ..Default::default()
    };
    let sampler = DuckDbSampler::new(session.clone(), orders(), settings).unwrap();

    let sample = sampler.random_sample().await.unwrap();
    assert_eq!(sample.source(), SampleSource::Filtered);
    assert_eq!(count(&session, &sample).await, 100);
}

#[tokio::test]
async fn test_partition_then_sample() {
    let session = orders_session().await;
    let mut values = partition(PartitionIntervalType::ColumnValue);
    values.column = ColumnName::new("region");
    values.values = vec!["EU".to_string()];
    let settings = SamplingSettings {
        sample: Some(SampleConfig::rows(50)),
        partition: Some(values),
        ..Default::default()
    };
    let sampler = DuckDbSampler::new(session.clone(), orders(), settings).unwrap();
    let sample = sampler.random_sample().await.unwrap();

    assert_eq!(count(&session, &sample).await, 50);
    let outside = session
        .query_count(&format!(
            "SELECT * FROM {} WHERE region <> 'EU'",
            sample.from_clause()
        ))
        .await
        .unwrap();
    assert_eq!(outside, 0);
}

#[tokio::test]
async fn test_text_partition_with_numeric_looking_values() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE shipments (region VARCHAR); \
         INSERT INTO shipments VALUES ('EU'), ('42'), ('007'), ('7'), ('US');",
    )
    .await
    .unwrap();
    let session: Arc<dyn Database> = Arc::new(db);
    let columns = session.describe_relation("main", "shipments").await.unwrap();
    let shipments = Relation {
        schema: "main".to_string(),
        table: "shipments".to_string(),
        columns,
    };

    let filtered = |values: &[&str]| {
        let mut regions = partition(PartitionIntervalType::ColumnValue);
        regions.column = ColumnName::new("region");
        regions.values = values.iter().map(|v| v.to_string()).collect();
        let settings = SamplingSettings {
            partition: Some(regions),
            ..Default::default()
        };
        DuckDbSampler::new(session.clone(), shipments.clone(), settings).unwrap()
    };

    let sample = filtered(&["42", "EU"]).random_sample().await.unwrap();
    assert_eq!(count(&session, &sample).await, 2);

    let sample = filtered(&["007"]).random_sample().await.unwrap();
    assert_eq!(count(&session, &sample).await, 1);
}

#[tokio::test]
async fn test_time_unit_partition() {
    let session = orders_session().await;
    let mut recent = partition(PartitionIntervalType::TimeUnit);
    recent.column = ColumnName::new("created_at");
    recent.interval = Some(10);
    recent.interval_unit = Some(IntervalUnit::Day);
    let settings = SamplingSettings {
        partition: Some(recent),
        ..Default::default()
    };
    let sampler = DuckDbSampler::new(session.clone(), orders(), settings).unwrap();
    let sample = sampler.random_sample().await.unwrap();

    let n = count(&session, &sample).await;
    assert!((10..=11).contains(&n), "unexpected partition size {n}");
}

#[tokio::test]
async fn test_sample_query_overrides_everything() {
    let session = orders_session().await;
    let mut range = partition(PartitionIntervalType::IntegerRange);
    range.start = Some(0);
    range.end = Some(9);
    let settings = SamplingSettings {
        sample_query: Some("SELECT * FROM orders WHERE region = 'US';".to_string()),
        sample: Some(SampleConfig::rows(5)),
        partition: Some(range),
    };
    let sampler = DuckDbSampler::new(session.clone(), orders(), settings).unwrap();
    assert_eq!(
        sampler.settings().sample_query.as_deref(),
        Some("SELECT * FROM orders WHERE region = 'US'")
    );

    let sample = sampler.random_sample().await.unwrap();
    assert_eq!(sample.source(), SampleSource::Materialized);
    assert_eq!(count(&session, &sample).await, 500);
}

#[tokio::test]
async fn test_invalid_sample_queries_rejected() {
    let session = orders_session().await;
    for query in [
        "DELETE FROM orders",
        "SELECT 1; SELECT 2",
        "SELEC nonsense",
    ] {
        let settings = SamplingSettings {
            sample_query: Some(query.to_string()),
            ..Default::default()
        };
        let result = DuckDbSampler::new(session.clone(), orders(), settings);
        assert!(
            matches!(result, Err(SamplerError::InvalidSampleQuery { .. })),
            "accepted {query}"
        );
    }
}

#[tokio::test]
async fn test_fetch_sample_rows() {
    let session = orders_session().await;
    let mut range = partition(PartitionIntervalType::IntegerRange);
    range.start = Some(0);
    range.end = Some(2);
    let settings = SamplingSettings {
        partition: Some(range),
        ..Default::default()
    };
    let sampler = DuckDbSampler::new(session, orders(), settings).unwrap();
    let rows = sampler.fetch_sample_rows(10).await.unwrap();
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn test_cleanup_drops_materialized_sample() {
    let session = orders_session().await;
    let settings = SamplingSettings {
        sample: Some(SampleConfig::rows(10)),
        ..Default::default()
    };
    let sampler = DuckDbSampler::new(session.clone(), orders(), settings).unwrap();
    let sample = sampler.random_sample().await.unwrap();
    let table = sample.temp_table().unwrap().to_string();
    assert!(table.starts_with("assay_sample_"));

    sampler.cleanup().await.unwrap();
    assert!(session
        .query_count(&format!("SELECT * FROM {}", sample.from_clause()))
        .await
        .is_err());
}

#[tokio::test]
async fn test_cleanup_on_closed_session_fails() {
    let session = orders_session().await;
    let settings = SamplingSettings {
        sample: Some(SampleConfig::rows(10)),
        ..Default::default()
    };
    let sampler = DuckDbSampler::new(session.clone(), orders(), settings).unwrap();
    sampler.random_sample().await.unwrap();

    session.close().await.unwrap();
    assert!(sampler.cleanup().await.is_err());
}

#[test]
fn test_sample_clause() {
    assert_eq!(
        sample_clause(&SampleConfig::percentage(12.5), 7),
        "12.5 PERCENT (bernoulli, 7)"
    );
    assert_eq!(
        sample_clause(&SampleConfig::rows(100), 7),
        "100 ROWS (reservoir, 7)"
    );
}
