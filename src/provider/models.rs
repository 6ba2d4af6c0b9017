//! Wire models exchanged with the schema/row provider
//!
//! These mirror the JSON payloads of the provider endpoints one-to-one.
//! Row objects are kept as `serde_json` maps in declaration order
//! (`preserve_order`): the entity-mode record graph links adjacent key
//! columns within a row, so column order is semantic, not cosmetic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema_catalog::TableShape;

/// A generic result row: column name → value, in declaration order.
pub type Row = Map<String, Value>;

/// One catalog row per (owner, table, column), with key flags and the
/// foreign target when the column is a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawColumnRow {
    pub owner: Option<String>,
    pub table_name: Option<String>,
    pub column_name: Option<String>,
    pub data_type: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default)]
    pub foreign_table: Option<String>,
    #[serde(default)]
    pub foreign_column: Option<String>,
}

/// Unfiltered row sample for a table, plus the query that produced it
/// (surfaced verbatim in the UI's query box).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRows {
    pub query: String,
    pub rows: Vec<Row>,
}

/// Row sample joined across one hop of FKs. The provider classifies the
/// shape server-side with the same entity/flow rule the client uses;
/// the client trusts `table_type` instead of re-deriving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedRows {
    pub query: String,
    pub rows: Vec<Row>,
    #[serde(rename = "tableType", default)]
    pub table_type: TableShape,
    #[serde(rename = "tableUsed")]
    pub table_used: String,
}

/// Rows in one table where a given column matches a value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedRows {
    pub rows: Vec<Row>,
}

/// One directed flow between two endpoints, with transport attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdgeRow {
    #[serde(default)]
    pub source_id: Value,
    #[serde(default)]
    pub destination_id: Value,
    #[serde(default)]
    pub dataflow_id: Value,
    #[serde(rename = "ETL_method", default)]
    pub etl_method: Option<String>,
    #[serde(default)]
    pub max_gb_per_second: Option<f64>,
    #[serde(default)]
    pub fully_encrypted: Option<bool>,
    #[serde(default)]
    pub dataflow_description: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub destination_name: Option<String>,
    #[serde(default)]
    pub source_node_type: Option<String>,
    #[serde(default)]
    pub dest_node_type: Option<String>,
}

/// One deduplicated keyword-search hit: the row is reduced to its
/// primary-key columns plus the columns that matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    pub table: String,
    pub row_id: String,
    pub row: Row,
    pub matching_columns: Vec<String>,
}
