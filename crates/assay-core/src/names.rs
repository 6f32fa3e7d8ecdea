//! Strongly-typed names used across test cases, definitions, and tables.

use crate::newtype_string::define_name;

define_name! {
    /// Dot-separated fully-qualified name of a catalog entity
    /// (e.g. `warehouse.sales.public.orders` or `columnValuesToBeNotNull`).
    pub struct Fqn;
}

define_name! {
    /// Name of a table column.
    pub struct ColumnName;
}

impl Fqn {
    /// Split the name into its dot-separated parts.
    ///
    /// Quoted parts (`"a.b"`) are kept whole.
    pub fn parts(&self) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        for c in self.as_str().chars() {
            match c {
                '"' => in_quotes = !in_quotes,
                '.' if !in_quotes => parts.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        parts.push(current);
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqn_parts() {
        let fqn = Fqn::new("svc.warehouse.sales.orders");
        assert_eq!(fqn.parts(), vec!["svc", "warehouse", "sales", "orders"]);
    }

    #[test]
    fn test_fqn_quoted_part() {
        let fqn = Fqn::new(r#"svc.db."odd.schema".orders"#);
        assert_eq!(fqn.parts(), vec!["svc", "db", "odd.schema", "orders"]);
    }

    #[test]
    fn test_blank_names_rejected() {
        assert!(Fqn::try_new("  ").is_none());
        assert!(ColumnName::try_new("").is_none());
        assert!(serde_yaml::from_str::<ColumnName>("''").is_err());
    }

    #[test]
    fn test_name_compares_with_str() {
        let col = ColumnName::new("order_id");
        assert_eq!(col, "order_id");
        assert_eq!(col.len(), 8);
    }
}
