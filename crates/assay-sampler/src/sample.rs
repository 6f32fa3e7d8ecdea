//! The drawn sample

use assay_core::sql_utils::quote_ident;
use assay_core::Relation;

/// How a sample is backed in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSource {
    /// The whole table, unfiltered
    FullTable,
    /// The table narrowed by a partition predicate, evaluated on each query
    Filtered,
    /// A temp table holding the drawn rows
    Materialized,
}

impl std::fmt::Display for SampleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleSource::FullTable => write!(f, "full table"),
            SampleSource::Filtered => write!(f, "filtered"),
            SampleSource::Materialized => write!(f, "materialized"),
        }
    }
}

/// A queryable subset of a table's rows.
///
/// Drawn once by a [`Sampler`](crate::Sampler) and never changed afterwards,
/// so every query through it sees the same rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    source: SampleSource,
    relation: Relation,
    from_clause: String,
    temp_table: Option<String>,
}

impl Sample {
    pub(crate) fn full_table(relation: Relation) -> Self {
        Self {
            source: SampleSource::FullTable,
            from_clause: relation.quoted(),
            relation,
            temp_table: None,
        }
    }

    pub(crate) fn filtered(relation: Relation, predicate: &str) -> Self {
        Self {
            source: SampleSource::Filtered,
            from_clause: filtered_from(&relation, predicate),
            relation,
            temp_table: None,
        }
    }

    pub(crate) fn materialized(relation: Relation, temp_table: String) -> Self {
        Self {
            source: SampleSource::Materialized,
            from_clause: quote_ident(&temp_table),
            relation,
            temp_table: Some(temp_table),
        }
    }

    /// How the sample is backed
    pub fn source(&self) -> SampleSource {
        self.source
    }

    /// The table the sample was drawn from
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    /// SQL to place after `FROM` to read the sampled rows
    pub fn from_clause(&self) -> &str {
        &self.from_clause
    }

    /// Name of the backing temp table, for materialized samples
    pub fn temp_table(&self) -> Option<&str> {
        self.temp_table.as_deref()
    }
}

/// Derived table reading only the rows of `relation` matching `predicate`
pub(crate) fn filtered_from(relation: &Relation, predicate: &str) -> String {
    format!(
        "(SELECT * FROM {} WHERE {predicate}) AS _partition",
        relation.quoted()
    )
}
