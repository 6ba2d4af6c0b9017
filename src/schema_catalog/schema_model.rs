//! Normalized in-memory schema catalog
//!
//! [`SchemaModel::load`] turns the denormalized catalog row-set (one row
//! per table×column, FK info repeated per column) into a stable mapping
//! table → ordered columns, plus the derived indices the graph layer
//! queries: primary keys, foreign keys, outbound references and inbound
//! referencing columns.
//!
//! The model is rebuilt wholesale on every schema fetch and is read-only
//! afterwards; it is shared across graph instances behind an `Arc` with
//! no synchronization.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::warn;

use crate::provider::models::RawColumnRow;

use super::column_descriptor::ColumnDescriptor;

/// One resolved foreign-key relationship, as seen from the referencing
/// side: `table.column` points at `referenced_table.referenced_column`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Default)]
pub struct SchemaModel {
    /// table name → columns in catalog declaration order
    tables: BTreeMap<String, Vec<ColumnDescriptor>>,
    /// referenced table → foreign keys declared against it elsewhere
    inbound: HashMap<String, Vec<ForeignKeyRef>>,
}

impl SchemaModel {
    /// Build the model from a catalog row-set.
    ///
    /// Rows missing a table or column name are skipped with a warning
    /// (the provider query can produce them for constraint-only
    /// artifacts). Duplicate (table, column) rows keep the first
    /// occurrence. FK references to tables absent from the row-set stay
    /// in the descriptors; the graph layer renders them as external
    /// stubs rather than failing.
    pub fn load(rows: Vec<RawColumnRow>) -> SchemaModel {
        let mut tables: BTreeMap<String, Vec<ColumnDescriptor>> = BTreeMap::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for row in rows {
            let (Some(table), Some(column)) = (row.table_name.clone(), row.column_name.clone())
            else {
                warn!("skipping catalog row with missing table or column name: {:?}", row);
                continue;
            };
            if !seen.insert((table.clone(), column.clone())) {
                continue;
            }
            let descriptor = ColumnDescriptor {
                table: table.clone(),
                column,
                data_type: row.data_type.unwrap_or_else(|| "unknown".to_string()),
                is_primary_key: row.is_primary_key,
                is_foreign_key: row.is_foreign_key,
                foreign_table: row.foreign_table,
                foreign_column: row.foreign_column,
                owner: row.owner.unwrap_or_else(|| "unknown".to_string()),
            };
            tables.entry(table).or_default().push(descriptor);
        }

        let mut inbound: HashMap<String, Vec<ForeignKeyRef>> = HashMap::new();
        for columns in tables.values() {
            for col in columns {
                if let Some((ft, fc)) = col.foreign_ref() {
                    inbound
                        .entry(ft.to_string())
                        .or_default()
                        .push(ForeignKeyRef {
                            table: col.table.clone(),
                            column: col.column.clone(),
                            referenced_table: ft.to_string(),
                            referenced_column: fc.to_string(),
                        });
                }
            }
        }

        SchemaModel { tables, inbound }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Table names in stable (sorted) order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Columns of a table in catalog declaration order.
    pub fn columns_of(&self, table: &str) -> Option<&[ColumnDescriptor]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnDescriptor> {
        self.tables
            .get(table)?
            .iter()
            .find(|c| c.column == column)
    }

    /// Schema/owner of a table, from its first column.
    pub fn owner_of(&self, table: &str) -> Option<&str> {
        self.tables
            .get(table)
            .and_then(|cols| cols.first())
            .map(|c| c.owner.as_str())
    }

    pub fn primary_keys_of(&self, table: &str) -> Vec<&ColumnDescriptor> {
        self.tables
            .get(table)
            .map(|cols| cols.iter().filter(|c| c.is_primary_key).collect())
            .unwrap_or_default()
    }

    pub fn foreign_keys_of(&self, table: &str) -> Vec<&ColumnDescriptor> {
        self.tables
            .get(table)
            .map(|cols| cols.iter().filter(|c| c.is_foreign_key).collect())
            .unwrap_or_default()
    }

    /// Outbound foreign keys: relationships this table declares.
    pub fn references_of(&self, table: &str) -> Vec<ForeignKeyRef> {
        self.tables
            .get(table)
            .map(|cols| {
                cols.iter()
                    .filter_map(|c| {
                        c.foreign_ref().map(|(ft, fc)| ForeignKeyRef {
                            table: c.table.clone(),
                            column: c.column.clone(),
                            referenced_table: ft.to_string(),
                            referenced_column: fc.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Inbound foreign keys: which other tables point at this one.
    pub fn referenced_by_of(&self, table: &str) -> &[ForeignKeyRef] {
        self.inbound
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Names of key (PK or FK) columns of a table.
    pub fn key_columns_of(&self, table: &str) -> HashSet<&str> {
        self.tables
            .get(table)
            .map(|cols| {
                cols.iter()
                    .filter(|c| c.is_key())
                    .map(|c| c.column.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Primary-key descriptors to show for a stub table node.
    ///
    /// When the catalog flags no PK on the table (or the table is
    /// entirely unknown) and a fallback column is known from an inbound
    /// FK reference, a synthetic PK descriptor is produced so the stub
    /// never shows a dangling FK edge without a target column. The
    /// synthesized descriptor exists for graph completion only; the
    /// catalog itself is never mutated.
    pub fn stub_primary_keys(
        &self,
        table: &str,
        fallback_column: Option<&str>,
    ) -> Vec<ColumnDescriptor> {
        let flagged: Vec<ColumnDescriptor> = self
            .primary_keys_of(table)
            .into_iter()
            .cloned()
            .collect();
        if !flagged.is_empty() {
            return flagged;
        }
        let Some(fallback) = fallback_column else {
            return Vec::new();
        };
        vec![ColumnDescriptor {
            table: table.to_string(),
            column: fallback.to_string(),
            data_type: "unknown".to_string(),
            is_primary_key: true,
            is_foreign_key: false,
            foreign_table: None,
            foreign_column: None,
            owner: self.owner_of(table).unwrap_or("unknown").to_string(),
        }]
    }
}
