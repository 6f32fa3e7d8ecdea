//! Entity links: `<#E::table::<fqn>>` and `<#E::table::<fqn>::columns::<column>>`.
//!
//! A test case points at the table (or column) it checks through an entity
//! link. Column-level validators read their target column from it.

use crate::error::CoreError;
use crate::names::{ColumnName, Fqn};
use serde::{Deserialize, Serialize};
use std::fmt;

const PREFIX: &str = "<#E::";
const SUFFIX: &str = ">";
const SEPARATOR: &str = "::";

/// Parsed entity link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityLink {
    /// Entity kind, e.g. `table`
    pub entity: String,
    /// Fully-qualified name of the entity
    pub fqn: Fqn,
    /// Column, for column-level links
    pub column: Option<ColumnName>,
}

impl EntityLink {
    /// Link to a table
    pub fn table(fqn: Fqn) -> Self {
        Self {
            entity: "table".to_string(),
            fqn,
            column: None,
        }
    }

    /// Link to a column of a table
    pub fn column(fqn: Fqn, column: ColumnName) -> Self {
        Self {
            entity: "table".to_string(),
            fqn,
            column: Some(column),
        }
    }

    /// Parse the `<#E::...>` string form
    pub fn parse(link: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidEntityLink {
            link: link.to_string(),
            reason: reason.to_string(),
        };

        let body = link
            .trim()
            .strip_prefix(PREFIX)
            .and_then(|s| s.strip_suffix(SUFFIX))
            .ok_or_else(|| invalid("expected <#E::...> form"))?;

        let parts: Vec<&str> = body.split(SEPARATOR).collect();
        match parts.as_slice() {
            [entity, fqn] => Ok(Self {
                entity: entity.to_string(),
                fqn: Fqn::try_new(*fqn).ok_or_else(|| invalid("empty entity name"))?,
                column: None,
            }),
            [entity, fqn, "columns", column] => Ok(Self {
                entity: entity.to_string(),
                fqn: Fqn::try_new(*fqn).ok_or_else(|| invalid("empty entity name"))?,
                column: Some(
                    ColumnName::try_new(*column).ok_or_else(|| invalid("empty column name"))?,
                ),
            }),
            _ => Err(invalid("expected <#E::entity::fqn[::columns::column]>")),
        }
    }
}

impl fmt::Display for EntityLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}{SEPARATOR}{}", self.entity, self.fqn)?;
        if let Some(column) = &self.column {
            write!(f, "{SEPARATOR}columns{SEPARATOR}{column}")?;
        }
        f.write_str(SUFFIX)
    }
}

impl TryFrom<String> for EntityLink {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<EntityLink> for String {
    fn from(link: EntityLink) -> Self {
        link.to_string()
    }
}
