//! Render-ready projection
//!
//! The rendering/layout engine is an external capability that accepts
//! nodes and edges with style classes. This module projects a
//! [`GraphInstance`]'s authoritative state — base elements plus overlay
//! flags — into that shape. The projection is one-way: the renderer
//! syncs from it and is never queried back as a source of truth.

use serde::Serialize;

use super::instance::{GraphInstance, GraphKind};
use super::overlay::LineageMarks;

#[derive(Debug, Clone, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub classes: Vec<String>,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub classes: Vec<String>,
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub struct RenderGraph {
    pub kind: GraphKind,
    pub generation: u64,
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

fn push_lineage_classes(classes: &mut Vec<String>, marks: LineageMarks) {
    if marks.record {
        classes.push("highlight-record".to_string());
    }
    if marks.table {
        classes.push("highlight-table".to_string());
    }
    if marks.upstream {
        classes.push("highlight-upstream".to_string());
    }
    if marks.downstream {
        classes.push("highlight-downstream".to_string());
    }
}

/// Project the full graph with overlay flags resolved into visibility
/// and style-class annotations.
pub fn project(graph: &GraphInstance) -> RenderGraph {
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| {
            let mut classes: Vec<String> = vec![node.kind.as_str().to_string()];
            if let Some(role) = node.key_role {
                classes.push(role.style_class().to_string());
            }
            if node.promoted {
                classes.push("expanded".to_string());
            }
            if graph.node_hidden(&node.id) {
                classes.push("hidden".to_string());
            }
            if !graph.node_visible(&node.id) && !graph.node_hidden(&node.id) {
                classes.push("filtered-out".to_string());
            }
            if graph.node_searched(&node.id) {
                classes.push("highlight-search".to_string());
            }
            if graph.node_selected(&node.id) {
                classes.push("highlight-selected".to_string());
            }
            push_lineage_classes(&mut classes, graph.node_lineage(&node.id));

            RenderNode {
                id: node.id.clone(),
                label: node.label.clone(),
                classes,
                visible: graph.node_visible(&node.id),
                color: node.color.clone(),
            }
        })
        .collect();

    let edges = graph
        .edges()
        .iter()
        .map(|edge| {
            let mut classes: Vec<String> = vec![edge.kind.as_str().to_string()];
            if let Some(direction) = edge.direction {
                classes.push(format!("edge-{}", direction.as_str()));
            }
            if graph.edge_hidden(&edge.id) {
                classes.push("hidden".to_string());
            }
            if !graph.edge_visible(&edge.id) && !graph.edge_hidden(&edge.id) {
                classes.push("filtered-out".to_string());
            }
            push_lineage_classes(&mut classes, graph.edge_lineage(&edge.id));

            RenderEdge {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: edge.label.clone(),
                classes,
                visible: graph.edge_visible(&edge.id),
            }
        })
        .collect();

    RenderGraph {
        kind: graph.kind(),
        generation: graph.generation(),
        nodes,
        edges,
    }
}
