//! Schema/row provider seam
//!
//! The HTTP/SQL layer that actually talks to a database lives outside
//! this crate; the engine consumes it through these async traits. A
//! JSON-file [`fixture::FixtureProvider`] ships for the CLI and tests.

pub mod fixture;
pub mod models;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use models::{FlowEdgeRow, JoinedRows, RawColumnRow, RelatedRows, SearchMatch, TableRows};

/// Failure of an external fetch. Always recoverable: the caller reverts
/// the triggering expansion to `collapsed` and surfaces a notice; the
/// session keeps running.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("provider request `{operation}` failed: {message}")]
    Request { operation: String, message: String },
    #[error("provider returned a malformed `{operation}` payload: {message}")]
    Malformed { operation: String, message: String },
}

impl ProviderError {
    pub fn request(operation: impl Into<String>, message: impl ToString) -> Self {
        ProviderError::Request {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(operation: impl Into<String>, message: impl ToString) -> Self {
        ProviderError::Malformed {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

/// Catalog introspection: one row per (owner, table, column).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn fetch_schema(&self) -> Result<Vec<RawColumnRow>, ProviderError>;
}

/// Row-level access used by drill-down and expansion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RowProvider: Send + Sync {
    /// Unfiltered row sample for a table.
    async fn fetch_table_rows(&self, table: &str) -> Result<TableRows, ProviderError>;

    /// Row sample joined across one hop of FKs, pre-classified
    /// entity/flow by the provider.
    async fn fetch_joined_rows(&self, table: &str) -> Result<JoinedRows, ProviderError>;

    /// Rows in `table` where `column = value`.
    async fn fetch_related_rows(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<RelatedRows, ProviderError>;

    /// All flow edges touching the given endpoint.
    async fn fetch_flow_edges(&self, endpoint_id: &str) -> Result<Vec<FlowEdgeRow>, ProviderError>;

    /// Keyword search across all tables and text columns, deduplicated
    /// per record.
    async fn search_records(&self, keyword: &str) -> Result<Vec<SearchMatch>, ProviderError>;
}

/// The full provider surface the explorer session needs.
pub trait ExplorerProvider: SchemaProvider + RowProvider {}

impl<T: SchemaProvider + RowProvider> ExplorerProvider for T {}
