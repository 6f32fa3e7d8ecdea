use super::*;

fn day_partition(enabled: bool) -> PartitionConfig {
    PartitionConfig {
        enabled,
        column: ColumnName::new("created_at"),
        interval_type: PartitionIntervalType::TimeUnit,
        interval: Some(7),
        interval_unit: Some(IntervalUnit::Day),
        start: None,
        end: None,
        values: Vec::new(),
    }
}

#[test]
fn test_sample_config_validation() {
    assert!(SampleConfig::percentage(10.0).validate().is_ok());
    assert!(SampleConfig::percentage(100.0).validate().is_ok());
    assert!(SampleConfig::percentage(0.0).validate().is_err());
    assert!(SampleConfig::percentage(150.0).validate().is_err());
    assert!(SampleConfig::percentage(f64::NAN).validate().is_err());
    assert!(SampleConfig::rows(50).validate().is_ok());
    assert!(SampleConfig {
        value: 2.5,
        kind: SampleKind::Rows
    }
    .validate()
    .is_err());
}

#[test]
fn test_full_table_detection() {
    assert!(SampleConfig::percentage(100.0).is_full_table());
    assert!(!SampleConfig::percentage(99.0).is_full_table());
    assert!(!SampleConfig::rows(100).is_full_table());
}

#[test]
fn test_partition_validation() {
    assert!(day_partition(true).validate().is_ok());

    let mut missing_unit = day_partition(true);
    missing_unit.interval_unit = None;
    assert!(missing_unit.validate().is_err());

    let range = PartitionConfig {
        interval_type: PartitionIntervalType::IntegerRange,
        start: Some(10),
        end: Some(1),
        ..day_partition(true)
    };
    assert!(range.validate().is_err());

    let values = PartitionConfig {
        interval_type: PartitionIntervalType::ColumnValue,
        ..day_partition(true)
    };
    assert!(values.validate().is_err());
}

#[test]
fn test_resolve_prefers_table_sample_over_default() {
    let profiler = TableProfilerConfig {
        sample: Some(SampleConfig::percentage(25.0)),
        ..Default::default()
    };
    let default = SampleConfig::rows(10);
    let settings = SamplingSettings::resolve(Some(&profiler), Some(&default)).unwrap();
    assert_eq!(settings.sample, Some(SampleConfig::percentage(25.0)));

    let settings = SamplingSettings::resolve(None, Some(&default)).unwrap();
    assert_eq!(settings.sample, Some(default));
}

#[test]
fn test_resolve_drops_disabled_partition_and_blank_query() {
    let profiler = TableProfilerConfig {
        sample: None,
        sample_query: Some("   ".to_string()),
        partition: Some(day_partition(false)),
    };
    let settings = SamplingSettings::resolve(Some(&profiler), None).unwrap();
    assert_eq!(settings, SamplingSettings::default());
}

#[test]
fn test_resolve_rejects_invalid_sample() {
    let profiler = TableProfilerConfig {
        sample: Some(SampleConfig::percentage(0.0)),
        ..Default::default()
    };
    assert!(SamplingSettings::resolve(Some(&profiler), None).is_err());
}

#[test]
fn test_partition_yaml() {
    let yaml = r#"
column: region
interval_type: column_value
values: [emea, apac]
"#;
    let partition: PartitionConfig = serde_yaml::from_str(yaml).unwrap();
    assert!(partition.enabled);
    assert_eq!(partition.values, vec!["emea", "apac"]);
    assert!(partition.validate().is_ok());
}
