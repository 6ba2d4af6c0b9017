//! Graph node and edge types
//!
//! Nodes are a tagged union over the kinds a schema-exploration graph
//! can contain; edges carry their kind plus the attributes the UI
//! filters and styles on (FK column for the filter checkboxes, a
//! direction tag for record expansion, transport attributes for flows).

use serde::Serialize;
use serde_json::Value;

use crate::provider::models::FlowEdgeRow;
use crate::schema_catalog::{ColumnDescriptor, KeyRole};

use super::identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Table,
    Column,
    ExternalTable,
    Record,
    ForeignKeyValue,
    FlowEndpoint,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Table => "table",
            NodeKind::Column => "column",
            NodeKind::ExternalTable => "external",
            NodeKind::Record => "record",
            NodeKind::ForeignKeyValue => "foreign-key",
            NodeKind::FlowEndpoint => "flow-endpoint",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    HasColumn,
    ForeignKey,
    HasRecord,
    RecordLink,
    Flow,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::HasColumn => "has-column",
            EdgeKind::ForeignKey => "foreign-key",
            EdgeKind::HasRecord => "has-record",
            EdgeKind::RecordLink => "record-link",
            EdgeKind::Flow => "flow",
        }
    }
}

/// Which way a record-expansion edge points relative to the origin:
/// upstream toward referenced tables, downstream toward referencing
/// ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upstream,
    Downstream,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Upstream => "upstream",
            Direction::Downstream => "downstream",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_role: Option<KeyRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<String>,
    /// Set when an external stub was upgraded in place to a full table.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub promoted: bool,
}

impl GraphNode {
    fn base(id: String, kind: NodeKind, label: String) -> Self {
        GraphNode {
            id,
            kind,
            label,
            table: None,
            column: None,
            value: None,
            data_type: None,
            key_role: None,
            foreign_table: None,
            foreign_column: None,
            owner: None,
            color: None,
            endpoint_type: None,
            promoted: false,
        }
    }

    pub fn table(name: &str, owner: Option<&str>) -> Self {
        let mut node = Self::base(
            identity::table_node_id(name),
            NodeKind::Table,
            format!("Table: {}", name),
        );
        node.table = Some(name.to_string());
        node.owner = owner.map(str::to_string);
        node
    }

    /// Minimal stub for a table discovered via FK reference but not yet
    /// expanded. Shares its id with the full table node so a later
    /// upgrade relabels in place instead of duplicating.
    pub fn external_table(name: &str, owner: Option<&str>) -> Self {
        let mut node = Self::table(name, owner);
        node.kind = NodeKind::ExternalTable;
        node
    }

    pub fn column(descriptor: &ColumnDescriptor) -> Self {
        let mut node = Self::base(
            identity::column_node_id(&descriptor.table, &descriptor.column),
            NodeKind::Column,
            format!("{} ({})", descriptor.column, descriptor.data_type),
        );
        node.table = Some(descriptor.table.clone());
        node.column = Some(descriptor.column.clone());
        node.data_type = Some(descriptor.data_type.clone());
        node.key_role = Some(descriptor.key_role());
        node.foreign_table = descriptor.foreign_table.clone();
        node.foreign_column = descriptor.foreign_column.clone();
        node.owner = Some(descriptor.owner.clone());
        node
    }

    /// Column node for a stub table where only the PK is known.
    pub fn stub_pk_column(table: &str, column: &str) -> Self {
        let mut node = Self::base(
            identity::column_node_id(table, column),
            NodeKind::Column,
            format!("{} [PK]", column),
        );
        node.table = Some(table.to_string());
        node.column = Some(column.to_string());
        node.key_role = Some(KeyRole::Primary);
        node
    }

    /// One record-value node per distinct (column, value) pair.
    pub fn record_value(
        table: &str,
        column: &str,
        value: &Value,
        kind: NodeKind,
        label: String,
        color: Option<String>,
    ) -> Self {
        let mut node = Self::base(identity::record_node_id(table, column, value), kind, label);
        node.table = Some(table.to_string());
        node.column = Some(column.to_string());
        node.value = Some(value.clone());
        node.color = color;
        node
    }

    pub fn flow_endpoint(id: &Value, name: Option<&str>, endpoint_type: Option<&str>) -> Self {
        let key = identity::scalar_key(id);
        let label = format!(
            "{}\n{}\n({})",
            key,
            name.unwrap_or(&key),
            endpoint_type.unwrap_or("unknown")
        );
        let mut node = Self::base(identity::flow_node_id(id), NodeKind::FlowEndpoint, label);
        node.value = Some(id.clone());
        node.endpoint_type = endpoint_type.map(str::to_string);
        node
    }
}

/// Transport attributes carried by a flow edge.
#[derive(Debug, Clone, Serialize)]
pub struct FlowAttributes {
    pub method: Option<String>,
    pub bandwidth_gb_per_second: Option<f64>,
    pub encrypted: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub label: String,
    /// FK column this edge represents; drives the filter checkboxes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fk_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowAttributes>,
}

impl GraphEdge {
    pub fn new(source: &str, target: &str, kind: EdgeKind, label: impl Into<String>) -> Self {
        GraphEdge {
            id: identity::edge_id(source, target, kind),
            source: source.to_string(),
            target: target.to_string(),
            kind,
            label: label.into(),
            fk_column: None,
            direction: None,
            flow: None,
        }
    }

    pub fn with_fk_column(mut self, column: impl Into<String>) -> Self {
        self.fk_column = Some(column.into());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Flow edge keyed by its dataflow identifier rather than by its
    /// endpoints, so one row equals one edge.
    pub fn flow(row: &FlowEdgeRow) -> Self {
        GraphEdge {
            id: identity::flow_edge_id(&row.dataflow_id),
            source: identity::flow_node_id(&row.source_id),
            target: identity::flow_node_id(&row.destination_id),
            kind: EdgeKind::Flow,
            label: identity::scalar_key(&row.dataflow_id),
            fk_column: None,
            direction: None,
            flow: Some(FlowAttributes {
                method: row.etl_method.clone(),
                bandwidth_gb_per_second: row.max_gb_per_second,
                encrypted: row.fully_encrypted,
                description: row.dataflow_description.clone(),
            }),
        }
    }
}
