use super::*;
use crate::profile::SampleKind;
use crate::test_case::EntityType;
use std::io::Write;
use tempfile::TempDir;

const SUITE: &str = r#"
name: orders_quality
connection:
  type: duckdb
  path: ":memory:"
  timeout_secs: 30
  on_connect:
    - "CREATE TABLE orders AS SELECT range AS order_id FROM range(100)"
default_sample:
  value: 10
test_definitions:
  - name: columnValuesToBeNotNull
    fully_qualified_name: columnValuesToBeNotNull
    entity_type: column
  - name: tableRowCountToBeBetween
    fully_qualified_name: tableRowCountToBeBetween
    entity_type: table
    parameter_definition:
      - name: minValue
        required: true
tables:
  - name: orders
    fully_qualified_name: local.memory.main.orders
    profile:
      sample:
        value: 50
        kind: rows
    tests:
      - name: order_id_not_null
        definition: columnValuesToBeNotNull
        column: order_id
      - name: row_count
        definition: tableRowCountToBeBetween
        parameters:
          minValue: 1
          maxValue: 1000
          allowed: [a, b]
"#;

fn write_suite(dir: &TempDir, file: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(file);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_connection_defaults() {
    let config = ConnectionConfig::default();
    assert_eq!(config.db_type, DbType::DuckDb);
    assert_eq!(config.path, ":memory:");
    assert_eq!(config.timeout(), Duration::from_secs(600));
    assert_eq!(config.ssl.mode, SslMode::Disable);
    assert!(config.validate().is_ok());
}

#[test]
fn test_connection_validation() {
    let config = ConnectionConfig {
        timeout_secs: 0,
        ..ConnectionConfig::default()
    };
    assert!(config.validate().is_err());

    let config = ConnectionConfig {
        ssl: SslConfig {
            mode: SslMode::VerifyFull,
            ca_certificate: None,
        },
        ..ConnectionConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_credentials_debug_redacts_password() {
    let credentials = Credentials {
        username: "analyst".to_string(),
        password: Some("hunter2".to_string()),
    };
    let debug = format!("{:?}", credentials);
    assert!(debug.contains("analyst"));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn test_load_suite() {
    let dir = TempDir::new().unwrap();
    write_suite(&dir, "assay.yml", SUITE);

    let suite = SuiteFile::load_from_dir(dir.path()).unwrap();
    assert_eq!(suite.name, "orders_quality");
    assert_eq!(suite.connection.timeout_secs, 30);
    assert_eq!(suite.default_sample, Some(SampleConfig::percentage(10.0)));
    assert_eq!(suite.tables.len(), 1);

    let table = &suite.tables[0].table;
    let profile = table.profile.as_ref().unwrap();
    assert_eq!(profile.sample.unwrap().kind, SampleKind::Rows);

    let cases = suite.test_cases(&suite.tables[0]).unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].column().map(|c| c.as_str()), Some("order_id"));
    assert!(cases[1].column().is_none());
    assert_eq!(cases[1].parameter("minValue"), Some("1"));
    assert_eq!(cases[1].parameter("allowed"), Some(r#"["a","b"]"#));

    let definition = suite.definition("tableRowCountToBeBetween").unwrap();
    assert_eq!(definition.entity_type, EntityType::Table);
    assert_eq!(cases[1].test_definition.id, definition.id);
}

#[test]
fn test_load_yaml_extension() {
    let dir = TempDir::new().unwrap();
    write_suite(&dir, "assay.yaml", SUITE);
    assert!(SuiteFile::load_from_dir(dir.path()).is_ok());
}

#[test]
fn test_missing_suite_file() {
    let dir = TempDir::new().unwrap();
    let err = SuiteFile::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_unknown_definition_rejected() {
    let dir = TempDir::new().unwrap();
    let content = SUITE.replace(
        "definition: columnValuesToBeNotNull",
        "definition: columnValuesToBeShiny",
    );
    let path = write_suite(&dir, "assay.yml", &content);
    let err = SuiteFile::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::UnknownTestDefinition { .. }));
}

#[test]
fn test_duplicate_table_rejected() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "{SUITE}  - name: orders\n    fully_qualified_name: local.memory.main.orders\n"
    );
    let path = write_suite(&dir, "assay.yml", &content);
    let err = SuiteFile::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::Duplicate { kind: "table", .. }));
}

#[test]
fn test_invalid_default_sample_rejected() {
    let dir = TempDir::new().unwrap();
    let content = SUITE.replace("  value: 10\n", "  value: 250\n");
    let path = write_suite(&dir, "assay.yml", &content);
    assert!(matches!(
        SuiteFile::load(&path).unwrap_err(),
        CoreError::ConfigInvalid { .. }
    ));
}
