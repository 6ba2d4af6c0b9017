//! Explorer session
//!
//! Application context owning the authoritative state of one
//! exploration session: the loaded [`SchemaModel`], the three graph
//! slots (schema, table focus, record/flow), the per-table color
//! registry and the generation counter that guards stale asynchronous
//! expansion results.
//!
//! The UI layer drives the session exclusively through the hook methods
//! (`on_node_activate`, `on_node_context_action`, `on_search_query`,
//! `on_filter_change`) and renders from the projections; it never owns
//! graph state of its own.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;
use thiserror::Error;

use crate::config::ExplorerConfig;
use crate::graph::builder::{
    build_column_focus_graph, build_flow_graph, build_record_graph, build_table_focus_graph,
    build_schema_graph,
};
use crate::graph::expansion::{
    append_records_to_graph, expand_table_node, plan_record_expansion, ExpansionError,
    ExpansionOutcome, ExpansionReport, RecordRef, RelatedQuery,
};
use crate::graph::identity::table_node_id;
use crate::graph::lineage::{trace_lineage, LineageSummary};
use crate::graph::render::{project, RenderGraph};
use crate::graph::{
    GraphInstance, GraphKind, HiddenItem, NodeKind, TableColorRegistry,
};
use crate::provider::models::{Row, SearchMatch};
use crate::provider::{ExplorerProvider, ProviderError, RowProvider, SchemaProvider};
use crate::schema_catalog::{SchemaCatalogError, SchemaModel, TableShape};

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Catalog(#[from] SchemaCatalogError),
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    #[error("no record graph is currently displayed")]
    NoRecordGraph,
    #[error("no graph of that kind is currently displayed")]
    NoSuchGraph,
    #[error("node `{0}` not found in the current graph")]
    UnknownNode(String),
}

/// What a node activation did.
#[derive(Debug)]
pub enum Activation {
    /// A fresh focus graph was built for this table.
    FocusedTable(String),
    /// A column mini-graph was built.
    FocusedColumn { table: String, column: String },
    /// The node was expanded in place.
    Expanded(ExpansionReport),
    /// Frontier said no: the node was already expanding or expanded.
    NoOp,
    /// The results arrived for a graph generation that is gone.
    StaleDiscarded,
}

/// Context-menu actions the UI can request on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    ShowTopRows,
    ShowJoinedRows,
    ToggleHidden,
}

#[derive(Debug)]
pub enum ActionOutcome {
    /// Row sample plus the query that produced it. An empty `rows` is
    /// the explicit no-results state, not an error.
    Rows { query: String, rows: Vec<Row> },
    /// A record graph was (re)built from joined rows.
    RecordGraphBuilt {
        query: String,
        rows: Vec<Row>,
        shape: TableShape,
        table: String,
    },
    HiddenToggled {
        hidden: bool,
        hidden_items: Vec<HiddenItem>,
    },
}

pub struct Explorer {
    provider: Arc<dyn ExplorerProvider>,
    config: ExplorerConfig,
    schema: Arc<SchemaModel>,
    colors: TableColorRegistry,
    schema_graph: GraphInstance,
    focus_graph: Option<GraphInstance>,
    record_graph: Option<GraphInstance>,
    /// Base table of the current record graph; drives the FK filter UI.
    record_base: Option<String>,
    next_generation: u64,
}

impl Explorer {
    /// Fetch the catalog and build the primary schema graph.
    pub async fn connect(
        provider: Arc<dyn ExplorerProvider>,
        config: ExplorerConfig,
    ) -> Result<Self, ExplorerError> {
        let rows = provider.fetch_schema().await?;
        let rows: Vec<_> = rows
            .into_iter()
            .filter(|r| match &r.owner {
                Some(owner) => !config.excluded_owners.contains(owner),
                None => true,
            })
            .collect();
        let schema = Arc::new(SchemaModel::load(rows));
        if schema.is_empty() {
            warn!("schema catalog is empty; the graph will have nothing to show");
        }
        info!("loaded schema catalog with {} tables", schema.table_count());

        let schema_graph =
            GraphInstance::from_payload(GraphKind::Schema, 1, build_schema_graph(&schema));
        Ok(Explorer {
            provider,
            config,
            schema,
            colors: TableColorRegistry::new(),
            schema_graph,
            focus_graph: None,
            record_graph: None,
            record_base: None,
            next_generation: 1,
        })
    }

    /// Re-fetch the catalog and rebuild the schema graph wholesale,
    /// discarding the focus and record graphs.
    pub async fn reload_schema(&mut self) -> Result<(), ExplorerError> {
        let rows = self.provider.fetch_schema().await?;
        let excluded = self.config.excluded_owners.clone();
        let rows: Vec<_> = rows
            .into_iter()
            .filter(|r| match &r.owner {
                Some(owner) => !excluded.contains(owner),
                None => true,
            })
            .collect();
        self.schema = Arc::new(SchemaModel::load(rows));
        let generation = self.alloc_generation();
        self.schema_graph = GraphInstance::from_payload(
            GraphKind::Schema,
            generation,
            build_schema_graph(&self.schema),
        );
        self.focus_graph = None;
        self.record_graph = None;
        self.record_base = None;
        Ok(())
    }

    fn alloc_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    pub fn schema_model(&self) -> &SchemaModel {
        &self.schema
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn schema_graph(&self) -> &GraphInstance {
        &self.schema_graph
    }

    pub fn focus_graph(&self) -> Option<&GraphInstance> {
        self.focus_graph.as_ref()
    }

    pub fn record_graph(&self) -> Option<&GraphInstance> {
        self.record_graph.as_ref()
    }

    fn graph(&self, kind: GraphKind) -> Option<&GraphInstance> {
        match kind {
            GraphKind::Schema => Some(&self.schema_graph),
            GraphKind::TableFocus => self.focus_graph.as_ref(),
            GraphKind::Record | GraphKind::Flow => self.record_graph.as_ref(),
        }
    }

    fn graph_mut(&mut self, kind: GraphKind) -> Option<&mut GraphInstance> {
        match kind {
            GraphKind::Schema => Some(&mut self.schema_graph),
            GraphKind::TableFocus => self.focus_graph.as_mut(),
            GraphKind::Record | GraphKind::Flow => self.record_graph.as_mut(),
        }
    }

    /// Render-ready projection of a currently displayed graph.
    pub fn render(&self, kind: GraphKind) -> Option<RenderGraph> {
        self.graph(kind).map(project)
    }

    /// Replace the focus graph with a fresh single-table view. The
    /// focused table starts out fully expanded.
    pub fn focus_table(&mut self, table: &str) -> Result<(), ExplorerError> {
        let payload = build_table_focus_graph(table, &self.schema)?;
        let generation = self.alloc_generation();
        let mut graph = GraphInstance::from_payload(GraphKind::TableFocus, generation, payload);
        let node_id = table_node_id(table);
        graph.begin_expansion(&node_id);
        graph.finish_expansion(&node_id);
        self.focus_graph = Some(graph);
        Ok(())
    }

    /// Replace the focus graph with a mini-graph around one column.
    pub fn focus_column(&mut self, table: &str, column: &str) -> Result<(), ExplorerError> {
        let payload = build_column_focus_graph(table, column, &self.schema)?;
        let generation = self.alloc_generation();
        self.focus_graph = Some(GraphInstance::from_payload(
            GraphKind::TableFocus,
            generation,
            payload,
        ));
        Ok(())
    }

    /// Left-click dispatch.
    pub async fn on_node_activate(
        &mut self,
        kind: GraphKind,
        node_id: &str,
    ) -> Result<Activation, ExplorerError> {
        let node = self
            .graph(kind)
            .ok_or(ExplorerError::NoSuchGraph)?
            .node(node_id)
            .ok_or_else(|| ExplorerError::UnknownNode(node_id.to_string()))?;
        let node_kind = node.kind;
        let table = node.table.clone();
        let column = node.column.clone();
        let value = node.value.clone();

        match (kind, node_kind) {
            (GraphKind::Schema, NodeKind::Table) => {
                let table = table.unwrap_or_else(|| node_id.to_string());
                self.focus_table(&table)?;
                Ok(Activation::FocusedTable(table))
            }
            (GraphKind::Schema, NodeKind::Column) => {
                let table = table.ok_or_else(|| ExplorerError::UnknownNode(node_id.to_string()))?;
                let column =
                    column.ok_or_else(|| ExplorerError::UnknownNode(node_id.to_string()))?;
                self.focus_column(&table, &column)?;
                Ok(Activation::FocusedColumn { table, column })
            }
            (GraphKind::TableFocus, NodeKind::ExternalTable) => {
                let table = table.unwrap_or_else(|| node_id.to_string());
                let graph = self.focus_graph.as_mut().ok_or(ExplorerError::NoSuchGraph)?;
                match expand_table_node(graph, &table, &self.schema)? {
                    ExpansionOutcome::Applied(report) => Ok(Activation::Expanded(report)),
                    ExpansionOutcome::AlreadyExpanded => Ok(Activation::NoOp),
                }
            }
            (GraphKind::Record | GraphKind::Flow, NodeKind::Record)
            | (GraphKind::Record | GraphKind::Flow, NodeKind::ForeignKeyValue) => {
                let origin = RecordRef::new(
                    table.unwrap_or_default(),
                    column.unwrap_or_default(),
                    value.unwrap_or(Value::Null),
                );
                self.expand_record(node_id, origin).await
            }
            (GraphKind::Record | GraphKind::Flow, NodeKind::FlowEndpoint) => {
                self.expand_flow(node_id).await
            }
            _ => {
                debug!("activation of {:?} node `{}` is a no-op", node_kind, node_id);
                Ok(Activation::NoOp)
            }
        }
    }

    /// Record expansion, split into a fetch phase (no graph borrow) and
    /// an apply phase guarded by the generation ticket: results landing
    /// after the record graph was replaced are discarded, never applied
    /// to the wrong instance.
    async fn expand_record(
        &mut self,
        node_id: &str,
        origin: RecordRef,
    ) -> Result<Activation, ExplorerError> {
        let ticket = {
            let graph = self.record_graph.as_mut().ok_or(ExplorerError::NoRecordGraph)?;
            let ticket = graph.ticket();
            // Claimed synchronously, before the first await.
            if !graph.begin_expansion(node_id) {
                return Ok(Activation::NoOp);
            }
            ticket
        };

        let plan = plan_record_expansion(&self.schema, &origin.table);
        let mut fetched: Vec<(RelatedQuery, Vec<Row>)> = Vec::new();
        let mut notices: Vec<String> = Vec::new();
        let mut failures = 0usize;
        for query in plan {
            match self
                .provider
                .fetch_related_rows(&query.table, &query.column, &origin.value)
                .await
            {
                Ok(related) => fetched.push((query, related.rows)),
                Err(e) => {
                    failures += 1;
                    warn!("related fetch from {} failed: {}", query.table, e);
                    notices.push(format!(
                        "Could not load related rows from {}: {}",
                        query.table, e
                    ));
                }
            }
        }

        let Some(graph) = self.record_graph.as_mut() else {
            info!("record graph gone; discarding expansion of `{}`", node_id);
            return Ok(Activation::StaleDiscarded);
        };
        if !graph.accepts(&ticket) {
            info!(
                "record graph generation moved on; discarding expansion of `{}`",
                node_id
            );
            return Ok(Activation::StaleDiscarded);
        }

        if fetched.is_empty() && failures > 0 {
            graph.abort_expansion(node_id);
            return Err(ExplorerError::Provider(ProviderError::request(
                "records/expand",
                format!("all {} related fetches failed", failures),
            )));
        }

        let mut report = ExpansionReport {
            notices,
            ..Default::default()
        };
        for (query, rows) in fetched {
            if rows.is_empty() {
                continue;
            }
            let (nodes, edges) = append_records_to_graph(
                graph,
                &rows,
                &query.table,
                Some(&origin),
                query.direction,
                &self.schema,
                &mut self.colors,
            );
            report.nodes_added += nodes;
            report.edges_added += edges;
        }
        graph.finish_expansion(node_id);
        Ok(Activation::Expanded(report))
    }

    /// Flow-endpoint expansion with the same stale-result guard.
    async fn expand_flow(&mut self, node_id: &str) -> Result<Activation, ExplorerError> {
        let ticket = {
            let graph = self.record_graph.as_mut().ok_or(ExplorerError::NoRecordGraph)?;
            let ticket = graph.ticket();
            if !graph.begin_expansion(node_id) {
                return Ok(Activation::NoOp);
            }
            ticket
        };

        let result = self.provider.fetch_flow_edges(node_id).await;

        let Some(graph) = self.record_graph.as_mut() else {
            return Ok(Activation::StaleDiscarded);
        };
        if !graph.accepts(&ticket) {
            info!("discarding stale flow expansion of `{}`", node_id);
            return Ok(Activation::StaleDiscarded);
        }

        match result {
            Ok(edges) => {
                let mut report = ExpansionReport::default();
                if edges.is_empty() {
                    report
                        .notices
                        .push(format!("No flows found for endpoint {}", node_id));
                }
                let (nodes, links) = graph.merge(build_flow_graph(&edges));
                report.nodes_added = nodes;
                report.edges_added = links;
                graph.finish_expansion(node_id);
                Ok(Activation::Expanded(report))
            }
            Err(e) => {
                graph.abort_expansion(node_id);
                Err(e.into())
            }
        }
    }

    /// Right-click dispatch.
    pub async fn on_node_context_action(
        &mut self,
        kind: GraphKind,
        node_id: &str,
        action: ContextAction,
    ) -> Result<ActionOutcome, ExplorerError> {
        match action {
            ContextAction::ShowTopRows => {
                let table = self.table_of_node(kind, node_id)?;
                let sample = self.provider.fetch_table_rows(&table).await?;
                Ok(ActionOutcome::Rows {
                    query: sample.query,
                    rows: sample.rows,
                })
            }
            ContextAction::ShowJoinedRows => {
                let table = self.table_of_node(kind, node_id)?;
                let joined = self.provider.fetch_joined_rows(&table).await?;
                // The provider classified the shape server-side; reuse
                // it rather than re-deriving.
                let shape = joined.table_type;
                let base = joined.table_used.clone();
                let payload =
                    build_record_graph(&joined.rows, &base, shape, &self.schema, &mut self.colors);
                let generation = self.alloc_generation();
                let graph_kind = match shape {
                    TableShape::Entity => GraphKind::Record,
                    TableShape::Flow => GraphKind::Flow,
                };
                self.record_graph = Some(GraphInstance::from_payload(
                    graph_kind, generation, payload,
                ));
                self.record_base = Some(base.clone());
                Ok(ActionOutcome::RecordGraphBuilt {
                    query: joined.query,
                    rows: joined.rows,
                    shape,
                    table: base,
                })
            }
            ContextAction::ToggleHidden => {
                let graph = self.graph_mut(kind).ok_or(ExplorerError::NoSuchGraph)?;
                let hidden = graph
                    .toggle_node_hidden(node_id)
                    .ok_or_else(|| ExplorerError::UnknownNode(node_id.to_string()))?;
                Ok(ActionOutcome::HiddenToggled {
                    hidden,
                    hidden_items: graph.hidden_items(),
                })
            }
        }
    }

    fn table_of_node(&self, kind: GraphKind, node_id: &str) -> Result<String, ExplorerError> {
        let node = self
            .graph(kind)
            .ok_or(ExplorerError::NoSuchGraph)?
            .node(node_id)
            .ok_or_else(|| ExplorerError::UnknownNode(node_id.to_string()))?;
        Ok(node.table.clone().unwrap_or_else(|| node_id.to_string()))
    }

    /// Seed a record graph from one (table, column, value) triple by
    /// fetching the matching rows. Returns false when there is nothing
    /// to show (the current record graph is left untouched).
    pub async fn open_record_graph(
        &mut self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<bool, ExplorerError> {
        let related = self
            .provider
            .fetch_related_rows(table, column, value)
            .await?;
        if related.rows.is_empty() {
            info!("no related records for {}.{}", table, column);
            return Ok(false);
        }
        let generation = self.alloc_generation();
        let mut graph = GraphInstance::new(GraphKind::Record, generation);
        append_records_to_graph(
            &mut graph,
            &related.rows,
            table,
            None,
            crate::graph::Direction::Downstream,
            &self.schema,
            &mut self.colors,
        );
        self.record_graph = Some(graph);
        self.record_base = Some(table.to_string());
        Ok(true)
    }

    /// Seed a flow graph centered on one endpoint.
    pub async fn open_flow_graph(&mut self, endpoint_id: &str) -> Result<bool, ExplorerError> {
        let edges = self.provider.fetch_flow_edges(endpoint_id).await?;
        if edges.is_empty() {
            info!("no flows found for endpoint {}", endpoint_id);
            return Ok(false);
        }
        let generation = self.alloc_generation();
        let mut graph =
            GraphInstance::from_payload(GraphKind::Flow, generation, build_flow_graph(&edges));
        graph.select_node(endpoint_id);
        self.record_graph = Some(graph);
        self.record_base = None;
        Ok(true)
    }

    /// Search the schema graph by label/id; highlights matches and
    /// returns their node ids.
    pub fn on_search_query(&mut self, text: &str) -> Vec<String> {
        self.schema_graph.search_highlight(text)
    }

    /// Keyword search across table rows via the provider.
    pub async fn search_records(&self, keyword: &str) -> Result<Vec<SearchMatch>, ExplorerError> {
        Ok(self.provider.search_records(keyword).await?)
    }

    /// Highlight the lineage of one matched record on the schema graph.
    pub fn trace_record_lineage(
        &mut self,
        table: &str,
        matched_columns: &[String],
        row_key: &str,
    ) -> LineageSummary {
        trace_lineage(
            &mut self.schema_graph,
            &self.schema,
            table,
            matched_columns,
            row_key,
        )
    }

    /// Move the selection highlight to one schema-graph node.
    pub fn select_schema_node(&mut self, node_id: &str) -> bool {
        self.schema_graph.select_node(node_id)
    }

    /// FK columns of the record graph's base table, for the filter UI.
    pub fn fk_filter_columns(&self) -> Vec<String> {
        let Some(base) = &self.record_base else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.schema
            .foreign_keys_of(base)
            .iter()
            .map(|c| c.column.clone())
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }

    /// Recompute the record graph's derived filter state from the set
    /// of checked FK columns.
    pub fn on_filter_change(&mut self, checked: &[String]) -> Result<(), ExplorerError> {
        let graph = self.record_graph.as_mut().ok_or(ExplorerError::NoRecordGraph)?;
        let checked: HashSet<String> = checked.iter().cloned().collect();
        graph.apply_fk_filter(&checked);
        Ok(())
    }

    pub fn hidden_items(&self, kind: GraphKind) -> Vec<HiddenItem> {
        self.graph(kind)
            .map(|g| g.hidden_items())
            .unwrap_or_default()
    }

    /// Unhide one entry of the hidden-items list.
    pub fn unhide(&mut self, kind: GraphKind, node_id: &str) -> bool {
        self.graph_mut(kind)
            .map(|g| g.unhide_node(node_id))
            .unwrap_or(false)
    }

    /// Tooltip text for a node, assembled from the catalog.
    pub fn tooltip(&self, kind: GraphKind, node_id: &str) -> Option<String> {
        let node = self.graph(kind)?.node(node_id)?;
        match node.kind {
            NodeKind::Table | NodeKind::ExternalTable => {
                let table = node.table.as_deref().unwrap_or(node_id);
                let columns = self.schema.columns_of(table).unwrap_or_default();
                let pks: Vec<&str> = columns
                    .iter()
                    .filter(|c| c.is_primary_key)
                    .map(|c| c.column.as_str())
                    .collect();
                let fks: Vec<String> = columns
                    .iter()
                    .filter_map(|c| {
                        c.foreign_ref()
                            .map(|(ft, fc)| format!("{} → {}.{}", c.column, ft, fc))
                    })
                    .collect();
                Some(format!(
                    "Schema: {}\nTable: {}\nPKs: {}\nFKs: {}",
                    node.owner.as_deref().unwrap_or("unknown"),
                    table,
                    if pks.is_empty() { "None".to_string() } else { pks.join(", ") },
                    if fks.is_empty() { "None".to_string() } else { fks.join(", ") },
                ))
            }
            NodeKind::Column => {
                let table = node.table.as_deref()?;
                let column = node.column.as_deref()?;
                let tags = self
                    .schema
                    .column(table, column)
                    .map(|c| c.tag_suffix())
                    .unwrap_or_default();
                Some(format!("Column: {}{}\nTable: {}", node.label, tags, table))
            }
            _ => None,
        }
    }
}
