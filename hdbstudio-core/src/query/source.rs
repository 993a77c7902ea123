//! Where the connector's query comes from.

use crate::{Result, error::HdbStudioError};
use serde::{Deserialize, Serialize};

/// Query source chosen during connector configuration.
///
/// Users either type a raw SQL `SELECT` or pick a `schema.table` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuerySource {
    /// Raw SQL text as typed by the user
    Sql { sql: String },
    /// Every column of one table
    Table { schema: String, table: String },
}

impl QuerySource {
    /// Creates a raw SQL source.
    pub fn sql(sql: impl Into<String>) -> Self {
        Self::Sql { sql: sql.into() }
    }

    /// Creates a table source.
    pub fn table(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::Table {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Renders the unsanitized query text for this source.
    ///
    /// # Errors
    /// Returns a configuration error for blank SQL or empty identifiers.
    pub fn to_query_text(&self) -> Result<String> {
        match self {
            Self::Sql { sql } => {
                if sql.trim().is_empty() {
                    return Err(HdbStudioError::configuration("Query text is empty"));
                }
                Ok(sql.clone())
            }
            Self::Table { schema, table } => Ok(format!(
                "SELECT * FROM {}.{}",
                quote_identifier(schema)?,
                quote_identifier(table)?
            )),
        }
    }
}

fn quote_identifier(identifier: &str) -> Result<String> {
    if identifier.is_empty() {
        return Err(HdbStudioError::configuration(
            "Schema and table names must not be empty",
        ));
    }
    Ok(format!("`{}`", identifier.replace('`', "``")))
}
