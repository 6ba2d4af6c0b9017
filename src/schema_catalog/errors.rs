//! # Schema Catalog Error Types
//!
//! Error handling for catalog loading and lookups.
//!
//! Unresolvable foreign-key targets are deliberately NOT errors: the
//! catalog degrades to treating the referenced table as external and
//! unexpanded, and the graph layer renders a stub node for it.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaCatalogError {
    #[error("No table named `{table}` in the schema catalog")]
    UnknownTable { table: String },
    #[error("No column `{column}` in table `{table}`")]
    UnknownColumn { table: String, column: String },
    #[error("Schema catalog is empty; nothing to explore")]
    EmptyCatalog,
}

impl SchemaCatalogError {
    pub fn unknown_table(table: impl Into<String>) -> Self {
        SchemaCatalogError::UnknownTable {
            table: table.into(),
        }
    }

    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        SchemaCatalogError::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}
