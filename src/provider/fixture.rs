//! JSON-file provider
//!
//! Serves a whole exploration session from a single JSON document:
//! catalog rows, per-table row samples, optional pre-joined samples and
//! flow edges. Used by the CLI and by integration tests; it applies the
//! same row limits a live provider would.
//!
//! Document shape:
//! ```json
//! {
//!   "schema": [ { "table_name": "...", "column_name": "...", ... } ],
//!   "tables": { "orders": { "rows": [ { "id": 1, ... } ] } },
//!   "joined": { "orders": { "query": "...", "rows": [...],
//!                            "tableType": "node", "tableUsed": "orders" } },
//!   "flows":  [ { "source_id": "...", "destination_id": "...", ... } ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ExplorerConfig;
use crate::graph::identity::scalar_key;
use crate::schema_catalog::classify_rows;

use super::models::{
    FlowEdgeRow, JoinedRows, RawColumnRow, RelatedRows, Row, SearchMatch, TableRows,
};
use super::{ProviderError, RowProvider, SchemaProvider};

#[derive(Debug, Default, Deserialize)]
struct TableFixture {
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Default, Deserialize)]
struct FixtureDocument {
    #[serde(default)]
    schema: Vec<RawColumnRow>,
    #[serde(default)]
    tables: BTreeMap<String, TableFixture>,
    #[serde(default)]
    joined: BTreeMap<String, JoinedRows>,
    #[serde(default)]
    flows: Vec<FlowEdgeRow>,
}

#[derive(Debug)]
pub struct FixtureProvider {
    document: FixtureDocument,
    sample_row_limit: usize,
    related_row_limit: usize,
    search_result_limit: usize,
}

impl FixtureProvider {
    pub fn from_path(path: impl AsRef<Path>, config: &ExplorerConfig) -> Result<Self, ProviderError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ProviderError::request("fixture read", e))?;
        Self::from_json_str(&raw, config)
    }

    pub fn from_json_str(raw: &str, config: &ExplorerConfig) -> Result<Self, ProviderError> {
        let document: FixtureDocument =
            serde_json::from_str(raw).map_err(|e| ProviderError::malformed("fixture parse", e))?;
        Ok(FixtureProvider {
            document,
            sample_row_limit: config.sample_row_limit as usize,
            related_row_limit: config.related_row_limit as usize,
            search_result_limit: config.search_result_limit as usize,
        })
    }

    fn rows_of(&self, table: &str) -> &[Row] {
        self.document
            .tables
            .get(table)
            .map(|t| t.rows.as_slice())
            .unwrap_or_default()
    }

    fn primary_key_columns(&self, table: &str) -> Vec<&str> {
        self.document
            .schema
            .iter()
            .filter(|r| {
                r.is_primary_key && r.table_name.as_deref() == Some(table)
            })
            .filter_map(|r| r.column_name.as_deref())
            .collect()
    }

    fn value_matches(candidate: &Value, wanted: &Value) -> bool {
        candidate == wanted || scalar_key(candidate) == scalar_key(wanted)
    }
}

#[async_trait]
impl SchemaProvider for FixtureProvider {
    async fn fetch_schema(&self) -> Result<Vec<RawColumnRow>, ProviderError> {
        Ok(self.document.schema.clone())
    }
}

#[async_trait]
impl RowProvider for FixtureProvider {
    async fn fetch_table_rows(&self, table: &str) -> Result<TableRows, ProviderError> {
        let rows: Vec<Row> = self
            .rows_of(table)
            .iter()
            .take(self.sample_row_limit)
            .cloned()
            .collect();
        Ok(TableRows {
            query: format!("SELECT * FROM {} LIMIT {}", table, self.sample_row_limit),
            rows,
        })
    }

    async fn fetch_joined_rows(&self, table: &str) -> Result<JoinedRows, ProviderError> {
        if let Some(joined) = self.document.joined.get(table) {
            return Ok(joined.clone());
        }
        // No pre-joined sample in the document: fall back to the plain
        // sample and classify it the way the server would.
        let rows: Vec<Row> = self
            .rows_of(table)
            .iter()
            .take(self.sample_row_limit)
            .cloned()
            .collect();
        let table_type = classify_rows(&rows);
        Ok(JoinedRows {
            query: format!("SELECT t.* FROM {} t", table),
            rows,
            table_type,
            table_used: table.to_string(),
        })
    }

    async fn fetch_related_rows(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<RelatedRows, ProviderError> {
        let rows: Vec<Row> = self
            .rows_of(table)
            .iter()
            .filter(|row| {
                row.get(column)
                    .map(|v| Self::value_matches(v, value))
                    .unwrap_or(false)
            })
            .take(self.related_row_limit)
            .cloned()
            .collect();
        debug!(
            "fixture: {} related rows in {} where {} = {}",
            rows.len(),
            table,
            column,
            scalar_key(value)
        );
        Ok(RelatedRows { rows })
    }

    async fn fetch_flow_edges(&self, endpoint_id: &str) -> Result<Vec<FlowEdgeRow>, ProviderError> {
        Ok(self
            .document
            .flows
            .iter()
            .filter(|edge| {
                scalar_key(&edge.source_id) == endpoint_id
                    || scalar_key(&edge.destination_id) == endpoint_id
            })
            .cloned()
            .collect())
    }

    async fn search_records(&self, keyword: &str) -> Result<Vec<SearchMatch>, ProviderError> {
        let needle = keyword.to_lowercase();
        let mut deduped: BTreeMap<(String, String), SearchMatch> = BTreeMap::new();

        for (table, fixture) in &self.document.tables {
            let pk_cols = self.primary_key_columns(table);
            for (index, row) in fixture.rows.iter().enumerate() {
                let matching: Vec<String> = row
                    .iter()
                    .filter(|(_, v)| !v.is_null() && scalar_key(v).to_lowercase().contains(&needle))
                    .map(|(col, _)| col.clone())
                    .collect();
                if matching.is_empty() {
                    continue;
                }

                let row_id = if pk_cols.is_empty() {
                    format!("row={}", index)
                } else {
                    pk_cols
                        .iter()
                        .map(|col| {
                            format!("{}={}", col, row.get(*col).map(scalar_key).unwrap_or_default())
                        })
                        .collect::<Vec<_>>()
                        .join(",")
                };

                // Reduced row: primary keys plus the matched columns.
                let mut reduced = Row::new();
                for col in pk_cols.iter().copied().chain(matching.iter().map(String::as_str)) {
                    if let Some(v) = row.get(col) {
                        reduced.insert(col.to_string(), v.clone());
                    }
                }

                let key = (table.clone(), row_id.clone());
                deduped
                    .entry(key)
                    .and_modify(|existing| {
                        for col in &matching {
                            if !existing.matching_columns.contains(col) {
                                existing.matching_columns.push(col.clone());
                            }
                        }
                    })
                    .or_insert(SearchMatch {
                        table: table.clone(),
                        row_id,
                        row: reduced,
                        matching_columns: matching,
                    });
            }
        }

        Ok(deduped
            .into_values()
            .take(self.search_result_limit)
            .collect())
    }
}
