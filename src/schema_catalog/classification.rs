//! Table shape classification
//!
//! Decides whether a row sample represents an entity table (rows are
//! discrete records) or a flow table (rows are directed relationships
//! between two endpoints). The only discriminating signal is the
//! presence of both a source-identifier and a destination-identifier
//! field in the row shape; every other shape, including an empty
//! sample, is an entity table.
//!
//! Providers that join server-side classify with the same rule and send
//! the result along (`tableType`); the client trusts that value instead
//! of re-deriving it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names that mark a flow-shaped row.
pub const SOURCE_FIELD: &str = "source_id";
pub const DESTINATION_FIELD: &str = "destination_id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableShape {
    /// Rows are records; graph nodes are key-column values.
    #[default]
    #[serde(rename = "node")]
    Entity,
    /// Rows are source→destination relationships; graph edges are rows.
    #[serde(rename = "flow")]
    Flow,
}

impl TableShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableShape::Entity => "node",
            TableShape::Flow => "flow",
        }
    }
}

/// Classify a row sample by its first row's shape.
pub fn classify_rows(rows: &[Map<String, Value>]) -> TableShape {
    let Some(first) = rows.first() else {
        return TableShape::Entity;
    };
    if first.contains_key(SOURCE_FIELD) && first.contains_key(DESTINATION_FIELD) {
        return TableShape::Flow;
    }
    TableShape::Entity
}
