//! Column metadata as normalized from the catalog row-set
//!
//! One [`ColumnDescriptor`] exists per (table, column) pair. Descriptors
//! are immutable once the catalog is loaded; everything downstream
//! (graph builders, lineage, expansion) borrows them from the
//! [`SchemaModel`](super::schema_model::SchemaModel).

use serde::{Deserialize, Serialize};

/// How a column participates in key constraints.
///
/// `PrimaryForeign` covers composite keys that reference another entity
/// by its own key: the column is simultaneously primary and foreign and
/// both roles must survive into styling and lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    #[serde(rename = "pk")]
    Primary,
    #[serde(rename = "fk")]
    Foreign,
    #[serde(rename = "pkfk")]
    PrimaryForeign,
    #[serde(rename = "column")]
    Plain,
}

impl KeyRole {
    /// Style class used by the render projection.
    pub fn style_class(&self) -> &'static str {
        match self {
            KeyRole::Primary => "pk",
            KeyRole::Foreign => "fk",
            KeyRole::PrimaryForeign => "pkfk",
            KeyRole::Plain => "column",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub table: String,
    pub column: String,
    pub data_type: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub foreign_table: Option<String>,
    pub foreign_column: Option<String>,
    pub owner: String,
}

impl ColumnDescriptor {
    pub fn key_role(&self) -> KeyRole {
        match (self.is_primary_key, self.is_foreign_key) {
            (true, true) => KeyRole::PrimaryForeign,
            (true, false) => KeyRole::Primary,
            (false, true) => KeyRole::Foreign,
            (false, false) => KeyRole::Plain,
        }
    }

    /// True when the column participates in any key constraint.
    pub fn is_key(&self) -> bool {
        self.is_primary_key || self.is_foreign_key
    }

    /// The (table, column) this foreign key points at, when both halves
    /// of the reference are present in the catalog row.
    pub fn foreign_ref(&self) -> Option<(&str, &str)> {
        if !self.is_foreign_key {
            return None;
        }
        match (&self.foreign_table, &self.foreign_column) {
            (Some(t), Some(c)) => Some((t.as_str(), c.as_str())),
            _ => None,
        }
    }

    /// Tooltip tag line for this column (`[PK]`, `[FK → t.c]`).
    pub fn tag_suffix(&self) -> String {
        let mut tags = String::new();
        if self.is_primary_key {
            tags.push_str(" [PK]");
        }
        if let Some((t, c)) = self.foreign_ref() {
            tags.push_str(&format!(" [FK → {}.{}]", t, c));
        } else if self.is_foreign_key {
            tags.push_str(" [FK]");
        }
        tags
    }
}
