//! SQL quoting utilities
//!
//! Every identifier and literal that ends up in generated validation or
//! sampling SQL goes through these helpers.

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and doubles any embedded double quotes.
///
/// # Examples
/// ```
/// use assay_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("orders"), r#""orders""#);
/// assert_eq!(quote_ident(r#"my"col"#), r#""my""col""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified relation name (e.g. `sales.orders`).
///
/// # Examples
/// ```
/// use assay_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("sales.orders"), r#""sales"."orders""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape a value for use inside a single-quoted SQL string literal.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render a value as a single-quoted SQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}

/// Render a list of values for an `IN (...)` clause, every value quoted.
pub fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| quote_literal(v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a list of values for an `IN (...)` clause.
///
/// Values that parse as numbers are emitted bare so they compare against
/// numeric columns; everything else is quoted.
pub fn literal_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| {
            if v.parse::<i64>().is_ok() || v.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
                v.clone()
            } else {
                quote_literal(v)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "sql_utils_test.rs"]
mod tests;
