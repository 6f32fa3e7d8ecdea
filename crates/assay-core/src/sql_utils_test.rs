use super::*;

#[test]
fn test_quote_ident_escapes_quotes() {
    assert_eq!(quote_ident("order_id"), r#""order_id""#);
    assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
}

#[test]
fn test_quote_ident_keeps_dots() {
    assert_eq!(quote_ident("sales.orders"), r#""sales.orders""#);
}

#[test]
fn test_quote_qualified_three_parts() {
    assert_eq!(
        quote_qualified("warehouse.sales.orders"),
        r#""warehouse"."sales"."orders""#
    );
}

#[test]
fn test_quote_literal() {
    assert_eq!(quote_literal("shipped"), "'shipped'");
    assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
}

#[test]
fn test_literal_list_mixes_numbers_and_strings() {
    let values = vec![
        "1".to_string(),
        "2.5".to_string(),
        "pending".to_string(),
        "it's".to_string(),
    ];
    assert_eq!(literal_list(&values), "1, 2.5, 'pending', 'it''s'");
}

#[test]
fn test_literal_list_quotes_non_finite() {
    let values = vec!["NaN".to_string(), "inf".to_string()];
    assert_eq!(literal_list(&values), "'NaN', 'inf'");
}

#[test]
fn test_quoted_list_keeps_numeric_text() {
    let values = vec!["42".to_string(), "007".to_string(), "EU".to_string()];
    assert_eq!(quoted_list(&values), "'42', '007', 'EU'");
}
