//! Incremental graph expansion
//!
//! Grows an existing graph in place without rebuilding it. Each
//! expandable node moves `collapsed -> expanding -> expanded`; the
//! claim is taken synchronously before any fetch starts, so repeated
//! activations of the same node are no-ops, and a provider failure
//! reverts the node to `collapsed` so the user can retry.
//!
//! All mutations run after the awaited response has resolved and merge
//! through id-keyed adds, which keeps the graph in its last-good state
//! on any failure: no node without its table, no edge without both
//! endpoints.

use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use crate::provider::models::Row;
use crate::provider::{ProviderError, RowProvider};
use crate::schema_catalog::SchemaModel;

use super::builder::{build_flow_graph, expand_immediate_neighbors};
use super::colors::TableColorRegistry;
use super::elements::{Direction, EdgeKind, GraphEdge, GraphNode, NodeKind};
use super::identity::{record_node_id, scalar_key, table_node_id};
use super::instance::{GraphInstance, GraphPayload};

#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error("table `{0}` is not present in the schema catalog")]
    UnknownTable(String),
    #[error("node `{0}` is not part of this graph")]
    UnknownNode(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpansionReport {
    pub nodes_added: usize,
    pub edges_added: usize,
    /// User-visible notices for non-fatal failures along the way.
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionOutcome {
    Applied(ExpansionReport),
    /// The node was already expanding or expanded; nothing was done.
    AlreadyExpanded,
}

/// The record-graph identity of a (table, column, value) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRef {
    pub table: String,
    pub column: String,
    pub value: Value,
}

impl RecordRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>, value: Value) -> Self {
        RecordRef {
            table: table.into(),
            column: column.into(),
            value,
        }
    }

    pub fn node_id(&self) -> String {
        record_node_id(&self.table, &self.column, &self.value)
    }
}

/// One related-table fetch of a record expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedQuery {
    pub table: String,
    pub column: String,
    pub direction: Direction,
}

/// Expand a collapsed table (or external stub) node in place: its
/// columns from the catalog, then its immediate FK neighborhood in both
/// directions. Purely local — no provider round trip.
pub fn expand_table_node(
    graph: &mut GraphInstance,
    table: &str,
    schema: &SchemaModel,
) -> Result<ExpansionOutcome, ExpansionError> {
    let node_id = table_node_id(table);
    if !graph.contains_node(&node_id) {
        return Err(ExpansionError::UnknownNode(node_id));
    }
    if !graph.begin_expansion(&node_id) {
        return Ok(ExpansionOutcome::AlreadyExpanded);
    }

    let Some(columns) = schema.columns_of(table) else {
        graph.abort_expansion(&node_id);
        return Err(ExpansionError::UnknownTable(table.to_string()));
    };

    graph.promote_external(&node_id);

    let mut payload = GraphPayload::new();
    for col in columns {
        let node = GraphNode::column(col);
        let id = node.id.clone();
        payload.push_node(node);
        payload.push_edge(GraphEdge::new(table, &id, EdgeKind::HasColumn, "has_column"));
    }
    expand_immediate_neighbors(table, schema, &mut payload);

    let (nodes_added, edges_added) = graph.merge(payload);
    graph.finish_expansion(&node_id);
    Ok(ExpansionOutcome::Applied(ExpansionReport {
        nodes_added,
        edges_added,
        notices: Vec::new(),
    }))
}

/// The related-table fetches a record expansion will attempt: upstream
/// toward every table this table's FKs reference, downstream toward
/// every table whose FK points back here.
pub fn plan_record_expansion(schema: &SchemaModel, table: &str) -> Vec<RelatedQuery> {
    let mut plan = Vec::new();
    for fk in schema.references_of(table) {
        plan.push(RelatedQuery {
            table: fk.referenced_table,
            column: fk.referenced_column,
            direction: Direction::Upstream,
        });
    }
    for fk in schema.referenced_by_of(table) {
        plan.push(RelatedQuery {
            table: fk.table.clone(),
            column: fk.column.clone(),
            direction: Direction::Downstream,
        });
    }
    plan
}

/// Append fetched rows to the record graph: one record node per row
/// keyed by its first primary-key value, linked back to the originating
/// node with a direction tag, plus one foreign-key-value node and
/// `record-link` edge per non-null FK column.
pub fn append_records_to_graph(
    graph: &mut GraphInstance,
    rows: &[Row],
    table: &str,
    source: Option<&RecordRef>,
    direction: Direction,
    schema: &SchemaModel,
    colors: &mut TableColorRegistry,
) -> (usize, usize) {
    let Some(pk) = schema
        .primary_keys_of(table)
        .first()
        .map(|c| c.column.clone())
    else {
        warn!("skipping rows for `{}`: no primary key flagged", table);
        return (0, 0);
    };
    let fk_columns: Vec<String> = schema
        .foreign_keys_of(table)
        .iter()
        .map(|c| c.column.clone())
        .collect();
    let color = colors.color_for(table).to_string();

    let mut payload = GraphPayload::new();
    for row in rows {
        let Some(pk_value) = row.get(&pk).filter(|v| !v.is_null()) else {
            continue;
        };
        let pk_node = GraphNode::record_value(
            table,
            &pk,
            pk_value,
            NodeKind::Record,
            format!("{}: {}={}", table, pk, scalar_key(pk_value)),
            Some(color.clone()),
        );
        let pk_id = pk_node.id.clone();
        payload.push_node(pk_node);

        if let Some(origin) = source {
            payload.push_edge(
                GraphEdge::new(
                    &origin.node_id(),
                    &pk_id,
                    EdgeKind::HasRecord,
                    format!("({}→{}) : {}", origin.table, table, origin.column),
                )
                .with_direction(direction),
            );
        }

        for fk_column in &fk_columns {
            let Some(fk_value) = row.get(fk_column).filter(|v| !v.is_null()) else {
                continue;
            };
            let fk_node = GraphNode::record_value(
                table,
                fk_column,
                fk_value,
                NodeKind::ForeignKeyValue,
                format!("{}: {}={}", table, fk_column, scalar_key(fk_value)),
                Some(color.clone()),
            );
            let fk_id = fk_node.id.clone();
            if fk_id == pk_id {
                continue;
            }
            payload.push_node(fk_node);
            payload.push_edge(
                GraphEdge::new(&pk_id, &fk_id, EdgeKind::RecordLink, fk_column.clone())
                    .with_fk_column(fk_column.clone()),
            );
        }
    }

    graph.merge(payload)
}

/// Expand a record (or FK-value) node: fetch matching rows from every
/// related table and append them. Related tables are attempted
/// independently — one failed fetch is logged, noted, and skipped
/// rather than aborting the whole expansion. Only when every attempted
/// fetch fails does the node revert to `collapsed` for retry.
pub async fn expand_record_node(
    graph: &mut GraphInstance,
    origin: &RecordRef,
    schema: &SchemaModel,
    provider: &dyn RowProvider,
    colors: &mut TableColorRegistry,
) -> Result<ExpansionOutcome, ExpansionError> {
    let node_id = origin.node_id();
    if !graph.contains_node(&node_id) {
        return Err(ExpansionError::UnknownNode(node_id));
    }
    // Claimed before the first await: a rapid double-activation finds
    // the node already `Expanding` and no-ops.
    if !graph.begin_expansion(&node_id) {
        return Ok(ExpansionOutcome::AlreadyExpanded);
    }

    let plan = plan_record_expansion(schema, &origin.table);
    if plan.is_empty() {
        debug!("no relationships to expand for {}", origin.table);
        graph.finish_expansion(&node_id);
        return Ok(ExpansionOutcome::Applied(ExpansionReport::default()));
    }

    let mut report = ExpansionReport::default();
    let mut successes = 0usize;
    let mut failures = 0usize;
    for query in &plan {
        match provider
            .fetch_related_rows(&query.table, &query.column, &origin.value)
            .await
        {
            Ok(related) => {
                successes += 1;
                if related.rows.is_empty() {
                    // A legitimate no-results state, not an error; no
                    // stub node or edge appears for this table.
                    debug!(
                        "no rows in {} where {} = {}",
                        query.table,
                        query.column,
                        scalar_key(&origin.value)
                    );
                    continue;
                }
                let (nodes, edges) = append_records_to_graph(
                    graph,
                    &related.rows,
                    &query.table,
                    Some(origin),
                    query.direction,
                    schema,
                    colors,
                );
                report.nodes_added += nodes;
                report.edges_added += edges;
            }
            Err(e) => {
                failures += 1;
                warn!("related fetch from {} failed: {}", query.table, e);
                report
                    .notices
                    .push(format!("Could not load related rows from {}: {}", query.table, e));
            }
        }
    }

    if successes == 0 && failures > 0 {
        graph.abort_expansion(&node_id);
        return Err(ExpansionError::Provider(ProviderError::request(
            "records/expand",
            format!("all {} related fetches failed", failures),
        )));
    }

    graph.finish_expansion(&node_id);
    Ok(ExpansionOutcome::Applied(report))
}

/// Expand a flow endpoint: fetch every flow touching it and merge any
/// endpoints and edges not already present (checked by id, not by
/// re-fetching).
pub async fn expand_flow_node(
    graph: &mut GraphInstance,
    endpoint_id: &str,
    provider: &dyn RowProvider,
) -> Result<ExpansionOutcome, ExpansionError> {
    if !graph.contains_node(endpoint_id) {
        return Err(ExpansionError::UnknownNode(endpoint_id.to_string()));
    }
    if !graph.begin_expansion(endpoint_id) {
        return Ok(ExpansionOutcome::AlreadyExpanded);
    }

    match provider.fetch_flow_edges(endpoint_id).await {
        Ok(edges) => {
            let mut report = ExpansionReport::default();
            if edges.is_empty() {
                report
                    .notices
                    .push(format!("No flows found for endpoint {}", endpoint_id));
            }
            let (nodes, links) = graph.merge(build_flow_graph(&edges));
            report.nodes_added = nodes;
            report.edges_added = links;
            graph.finish_expansion(endpoint_id);
            Ok(ExpansionOutcome::Applied(report))
        }
        Err(e) => {
            graph.abort_expansion(endpoint_id);
            Err(e.into())
        }
    }
}
