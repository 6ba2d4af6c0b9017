//! Graph construction strategies
//!
//! Pure functions from (SchemaModel, rows) to a deduplicated
//! [`GraphPayload`]. Three flavors: the whole-database schema graph, a
//! single-table focus graph with one hop of FK neighbors, and the
//! row-level record graph whose shape forks on the entity/flow
//! classification.
//!
//! Payloads are merged into a [`GraphInstance`](super::instance::GraphInstance)
//! whose id-keyed adds make every builder idempotent: building twice
//! from the same inputs yields the same node/edge set.

use log::warn;
use serde_json::Value;

use crate::provider::models::{FlowEdgeRow, Row};
use crate::schema_catalog::{SchemaCatalogError, SchemaModel, TableShape};

use super::colors::TableColorRegistry;
use super::elements::{EdgeKind, GraphEdge, GraphNode, NodeKind};
use super::identity::{record_node_id, scalar_key};
use super::instance::GraphPayload;

/// Whole-database schema graph: one table node per table, one column
/// node per (table, column), `has-column` and `foreign-key` edges.
pub fn build_schema_graph(schema: &SchemaModel) -> GraphPayload {
    let mut payload = GraphPayload::new();

    for table in schema.tables() {
        payload.push_node(GraphNode::table(table, schema.owner_of(table)));
    }

    for table in schema.tables() {
        let Some(columns) = schema.columns_of(table) else {
            continue;
        };
        for col in columns {
            let column_node = GraphNode::column(col);
            let column_id = column_node.id.clone();
            payload.push_node(column_node);
            payload.push_edge(GraphEdge::new(
                table,
                &column_id,
                EdgeKind::HasColumn,
                "has_column",
            ));

            if let Some((ft, fc)) = col.foreign_ref() {
                let target_id = ensure_fk_target(ft, fc, schema, &mut payload);
                payload.push_edge(GraphEdge::new(
                    &column_id,
                    &target_id,
                    EdgeKind::ForeignKey,
                    "foreign_key",
                ));
            }
        }
    }

    payload
}

/// Focus graph for one table: its node, all of its columns, and one hop
/// of FK neighbors in both directions. Neighbor tables appear as
/// external stubs until separately expanded.
pub fn build_table_focus_graph(
    table: &str,
    schema: &SchemaModel,
) -> Result<GraphPayload, SchemaCatalogError> {
    let columns = schema
        .columns_of(table)
        .ok_or_else(|| SchemaCatalogError::unknown_table(table))?;

    let mut payload = GraphPayload::new();
    payload.push_node(GraphNode::table(table, schema.owner_of(table)));

    for col in columns {
        let column_node = GraphNode::column(col);
        let column_id = column_node.id.clone();
        payload.push_node(column_node);
        payload.push_edge(GraphEdge::new(
            table,
            &column_id,
            EdgeKind::HasColumn,
            "has_column",
        ));
    }

    expand_immediate_neighbors(table, schema, &mut payload);
    Ok(payload)
}

/// Mini-graph centered on a single column: the column, its parent
/// table, and the referenced column when it is a foreign key.
pub fn build_column_focus_graph(
    table: &str,
    column: &str,
    schema: &SchemaModel,
) -> Result<GraphPayload, SchemaCatalogError> {
    let descriptor = schema
        .column(table, column)
        .ok_or_else(|| SchemaCatalogError::unknown_column(table, column))?;

    let mut payload = GraphPayload::new();
    let column_node = GraphNode::column(descriptor);
    let column_id = column_node.id.clone();
    payload.push_node(column_node);
    payload.push_node(GraphNode::table(table, schema.owner_of(table)));
    payload.push_edge(GraphEdge::new(
        table,
        &column_id,
        EdgeKind::HasColumn,
        "has_column",
    ));

    if let Some((ft, fc)) = descriptor.foreign_ref() {
        let target_id = match schema.column(ft, fc) {
            Some(target) => {
                let node = GraphNode::column(target);
                let id = node.id.clone();
                payload.push_node(node);
                id
            }
            None => {
                let node = GraphNode::stub_pk_column(ft, fc);
                let id = node.id.clone();
                payload.push_node(node);
                id
            }
        };
        payload.push_edge(GraphEdge::new(
            &column_id,
            &target_id,
            EdgeKind::ForeignKey,
            "foreign_key",
        ));
    }

    Ok(payload)
}

/// Row-level graph. Entity mode keeps only non-null key-column values
/// and chains the key values of each row pairwise in declaration order
/// — a path through the row's key attributes, deliberately not a star
/// and not a clique. Flow mode turns each row into one edge between a
/// source and a destination endpoint.
pub fn build_record_graph(
    rows: &[Row],
    table: &str,
    shape: TableShape,
    schema: &SchemaModel,
    colors: &mut TableColorRegistry,
) -> GraphPayload {
    match shape {
        TableShape::Flow => build_flow_rows(rows),
        TableShape::Entity => build_entity_rows(rows, table, schema, colors),
    }
}

fn build_entity_rows(
    rows: &[Row],
    table: &str,
    schema: &SchemaModel,
    colors: &mut TableColorRegistry,
) -> GraphPayload {
    let key_columns = schema.key_columns_of(table);
    let primary: Vec<&str> = schema
        .primary_keys_of(table)
        .iter()
        .map(|c| c.column.as_str())
        .collect();
    let color = colors.color_for(table).to_string();

    let mut payload = GraphPayload::new();
    for row in rows {
        let key_values: Vec<(&String, &Value)> = row
            .iter()
            .filter(|(col, value)| !value.is_null() && key_columns.contains(col.as_str()))
            .collect();

        for (col, value) in &key_values {
            let kind = if primary.contains(&col.as_str()) {
                NodeKind::Record
            } else {
                NodeKind::ForeignKeyValue
            };
            payload.push_node(GraphNode::record_value(
                table,
                col,
                value,
                kind,
                format!("{}: {}", col, scalar_key(value)),
                Some(color.clone()),
            ));
        }

        // Pairwise chain: only adjacent key pairs within the row are
        // linked, so wide keys never blow up into a clique.
        for pair in key_values.windows(2) {
            let (source_col, source_val) = pair[0];
            let (target_col, target_val) = pair[1];
            let source = record_node_id(table, source_col, source_val);
            let target = record_node_id(table, target_col, target_val);
            payload.push_edge(
                GraphEdge::new(&source, &target, EdgeKind::RecordLink, "")
                    .with_fk_column(target_col.clone()),
            );
        }
    }
    payload
}

fn build_flow_rows(rows: &[Row]) -> GraphPayload {
    let mut payload = GraphPayload::new();
    for row in rows {
        match serde_json::from_value::<FlowEdgeRow>(Value::Object(row.clone())) {
            Ok(edge_row) => push_flow_edge(&edge_row, &mut payload),
            Err(e) => warn!("skipping malformed flow row: {}", e),
        }
    }
    payload
}

/// Flow graph from already-typed flow edges (endpoint expansion and the
/// initial endpoint-centered view).
pub fn build_flow_graph(edges: &[FlowEdgeRow]) -> GraphPayload {
    let mut payload = GraphPayload::new();
    for edge in edges {
        push_flow_edge(edge, &mut payload);
    }
    payload
}

fn push_flow_edge(row: &FlowEdgeRow, payload: &mut GraphPayload) {
    if row.source_id.is_null() || row.destination_id.is_null() {
        warn!("skipping flow row without both endpoints");
        return;
    }
    payload.push_node(GraphNode::flow_endpoint(
        &row.source_id,
        row.source_name.as_deref(),
        row.source_node_type.as_deref(),
    ));
    payload.push_node(GraphNode::flow_endpoint(
        &row.destination_id,
        row.destination_name.as_deref(),
        row.dest_node_type.as_deref(),
    ));
    payload.push_edge(GraphEdge::flow(row));
}

/// Add one hop of FK neighbors around `table`: outbound to the columns
/// its FKs reference, inbound from columns elsewhere that reference its
/// primary keys. Newly discovered neighbor tables arrive as external
/// stubs with at least their PK column attached.
pub(crate) fn expand_immediate_neighbors(
    table: &str,
    schema: &SchemaModel,
    payload: &mut GraphPayload,
) {
    // Outbound: this table's FK columns point at other tables' keys.
    for fk in schema.references_of(table) {
        if let Some(col) = schema.column(&fk.table, &fk.column) {
            let fk_node = GraphNode::column(col);
            let fk_id = fk_node.id.clone();
            payload.push_node(fk_node);
            payload.push_edge(GraphEdge::new(table, &fk_id, EdgeKind::HasColumn, "has_column"));

            let target_id =
                ensure_fk_target(&fk.referenced_table, &fk.referenced_column, schema, payload);
            payload.push_edge(GraphEdge::new(
                &fk_id,
                &target_id,
                EdgeKind::ForeignKey,
                "foreign_key",
            ));
        }
    }

    // Inbound: FK columns elsewhere point at this table's keys.
    for fk in schema.referenced_by_of(table) {
        // Make sure the referenced key column exists on this table,
        // synthesizing one from the FK reference when none is flagged.
        push_stub_pk_columns(table, Some(&fk.referenced_column), schema, payload);

        payload.push_node(GraphNode::external_table(
            &fk.table,
            schema.owner_of(&fk.table),
        ));
        if let Some(col) = schema.column(&fk.table, &fk.column) {
            let fk_node = GraphNode::column(col);
            let fk_id = fk_node.id.clone();
            payload.push_node(fk_node);
            payload.push_edge(GraphEdge::new(
                &fk.table,
                &fk_id,
                EdgeKind::HasColumn,
                "has_column",
            ));
            let target_id = super::identity::column_node_id(table, &fk.referenced_column);
            payload.push_edge(GraphEdge::new(
                &fk_id,
                &target_id,
                EdgeKind::ForeignKey,
                "foreign_key",
            ));
        }
    }
}

/// Make sure the target column of a foreign key exists in the payload,
/// degrading to an external stub when the catalog cannot resolve it.
/// Returns the target column node id.
fn ensure_fk_target(
    table: &str,
    column: &str,
    schema: &SchemaModel,
    payload: &mut GraphPayload,
) -> String {
    if let Some(descriptor) = schema.column(table, column) {
        let node = GraphNode::column(descriptor);
        let id = node.id.clone();
        payload.push_node(node);
        payload.push_edge(GraphEdge::new(table, &id, EdgeKind::HasColumn, "has_pk"));
        // The owning table may not be in the payload yet when it is
        // only reached through this reference.
        payload.push_node(GraphNode::external_table(table, schema.owner_of(table)));
        return id;
    }

    warn!(
        "foreign key target {}.{} not in catalog; rendering external stub",
        table, column
    );
    payload.push_node(GraphNode::external_table(table, schema.owner_of(table)));
    let node = GraphNode::stub_pk_column(table, column);
    let id = node.id.clone();
    payload.push_node(node);
    payload.push_edge(GraphEdge::new(table, &id, EdgeKind::HasColumn, "has_pk"));
    id
}

/// Attach the (possibly synthetic) primary-key column nodes of a table.
pub(crate) fn push_stub_pk_columns(
    table: &str,
    fallback_column: Option<&str>,
    schema: &SchemaModel,
    payload: &mut GraphPayload,
) {
    for descriptor in schema.stub_primary_keys(table, fallback_column) {
        let node = if schema.column(table, &descriptor.column).is_some() {
            GraphNode::column(&descriptor)
        } else {
            GraphNode::stub_pk_column(table, &descriptor.column)
        };
        let id = node.id.clone();
        payload.push_node(node);
        payload.push_edge(GraphEdge::new(table, &id, EdgeKind::HasColumn, "has_column"));
    }
}
