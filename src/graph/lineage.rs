//! Record lineage tracing over the schema graph
//!
//! Given a matched record (table, matched columns, row key), highlights
//! the record's own columns plus the upstream (referenced) and
//! downstream (referencing) columns and edges. Operates on the schema
//! graph only; the record graph has its own direction tags.
//!
//! Every trace clears all previous lineage marks first — tracing A then
//! B leaves nothing of A behind.

use log::debug;

use crate::schema_catalog::SchemaModel;

use super::elements::EdgeKind;
use super::identity::{column_node_id, edge_id, table_node_id};
use super::instance::GraphInstance;
use super::overlay::LineageMark;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineageSummary {
    pub record_nodes: Vec<String>,
    pub upstream_nodes: Vec<String>,
    pub downstream_nodes: Vec<String>,
}

impl LineageSummary {
    pub fn highlighted_ids(&self) -> impl Iterator<Item = &str> {
        self.record_nodes
            .iter()
            .chain(&self.upstream_nodes)
            .chain(&self.downstream_nodes)
            .map(String::as_str)
    }
}

/// Trace and highlight the lineage of one matched record.
///
/// `matched_columns` empty means the whole row matched: every column of
/// the table is treated as matched. `row_key` identifies the record for
/// logging only; lineage is a schema-level concept.
pub fn trace_lineage(
    graph: &mut GraphInstance,
    schema: &SchemaModel,
    table: &str,
    matched_columns: &[String],
    row_key: &str,
) -> LineageSummary {
    graph.clear_lineage();
    debug!("tracing lineage for {} ({})", table, row_key);

    let columns: Vec<String> = if matched_columns.is_empty() {
        schema
            .columns_of(table)
            .map(|cols| cols.iter().map(|c| c.column.clone()).collect())
            .unwrap_or_default()
    } else {
        matched_columns.to_vec()
    };

    let mut summary = LineageSummary::default();

    if graph.mark_node_lineage(&table_node_id(table), LineageMark::Table) {
        summary.record_nodes.push(table_node_id(table));
    }

    for column in &columns {
        let column_id = column_node_id(table, column);
        if graph.mark_node_lineage(&column_id, LineageMark::Record) {
            summary.record_nodes.push(column_id.clone());
        }

        let Some(descriptor) = schema.column(table, column) else {
            continue;
        };

        // FK side: follow the reference up to the column it points at.
        if let Some((ft, fc)) = descriptor.foreign_ref() {
            let target_id = column_node_id(ft, fc);
            let fk_edge = edge_id(&column_id, &target_id, EdgeKind::ForeignKey);
            graph.mark_edge_lineage(&fk_edge, LineageMark::Upstream);
            if graph.mark_node_lineage(&target_id, LineageMark::Upstream) {
                summary.upstream_nodes.push(target_id);
            }
        }

        // PK side: every FK elsewhere that points at this column.
        if descriptor.is_primary_key {
            for inbound in schema.referenced_by_of(table) {
                if inbound.referenced_column != *column {
                    continue;
                }
                let source_id = column_node_id(&inbound.table, &inbound.column);
                let fk_edge = edge_id(&source_id, &column_id, EdgeKind::ForeignKey);
                graph.mark_edge_lineage(&fk_edge, LineageMark::Downstream);
                if graph.mark_node_lineage(&source_id, LineageMark::Downstream) {
                    summary.downstream_nodes.push(source_id);
                }
            }
        }
    }

    summary
}
