//! Mutable graph state
//!
//! A [`GraphInstance`] owns the authoritative node/edge sets for one
//! displayed graph, the visibility/highlight overlay layered on top of
//! them, and the expansion frontier that makes node expansion
//! at-most-once. The rendering engine is a projection of this state and
//! is never consulted as a source of truth.
//!
//! All additions are id-keyed: adding a node or edge whose id is
//! already present is a no-op, never an error. That makes concurrent
//! expansion completions commutative — whichever merge lands last finds
//! its ids present and does nothing.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde::Serialize;

use super::elements::{GraphEdge, GraphNode, NodeKind};
use super::overlay::Overlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphKind {
    /// Whole-database schema graph.
    Schema,
    /// One table plus its immediate FK neighborhood.
    TableFocus,
    /// Row-level graph grown incrementally by record expansion.
    Record,
    /// Endpoint/flow graph grown by flow-node expansion.
    Flow,
}

/// Expansion state machine per expandable node. `Expanded` is terminal;
/// re-entry is a no-op guarded by the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionState {
    #[default]
    Collapsed,
    Expanding,
    Expanded,
}

/// Generation stamp handed out before an asynchronous expansion begins.
/// If the instance it targeted was replaced before the results arrive,
/// the stamp no longer matches and the results are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionTicket {
    generation: u64,
}

/// A batch of nodes and edges produced by a builder or expansion step,
/// deduplicated internally by id.
#[derive(Debug, Default)]
pub struct GraphPayload {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    seen: HashSet<String>,
}

impl GraphPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_node(&mut self, node: GraphNode) -> bool {
        if self.seen.contains(&node.id) {
            return false;
        }
        self.seen.insert(node.id.clone());
        self.nodes.push(node);
        true
    }

    pub fn push_edge(&mut self, edge: GraphEdge) -> bool {
        if self.seen.contains(&edge.id) {
            return false;
        }
        self.seen.insert(edge.id.clone());
        self.edges.push(edge);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Debug)]
pub struct GraphInstance {
    kind: GraphKind,
    generation: u64,
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) node_index: HashMap<String, usize>,
    pub(crate) edges: Vec<GraphEdge>,
    pub(crate) edge_index: HashMap<String, usize>,
    pub(crate) overlay: Overlay,
    frontier: HashMap<String, ExpansionState>,
}

impl GraphInstance {
    pub fn new(kind: GraphKind, generation: u64) -> Self {
        GraphInstance {
            kind,
            generation,
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
            overlay: Overlay::default(),
            frontier: HashMap::new(),
        }
    }

    pub fn from_payload(kind: GraphKind, generation: u64, payload: GraphPayload) -> Self {
        let mut graph = Self::new(kind, generation);
        graph.merge(payload);
        graph
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ticket(&self) -> ExpansionTicket {
        ExpansionTicket {
            generation: self.generation,
        }
    }

    /// Whether results stamped with `ticket` may still be applied here.
    pub fn accepts(&self, ticket: &ExpansionTicket) -> bool {
        self.generation == ticket.generation
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edge_index.get(id).map(|&i| &self.edges[i])
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Add a node; a second add of the same id is a no-op.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Add an edge; a second add of the same id is a no-op. An edge
    /// whose endpoints are not both present is rejected so the graph
    /// never carries a dangling edge.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        if self.edge_index.contains_key(&edge.id) {
            return false;
        }
        if !self.contains_node(&edge.source) || !self.contains_node(&edge.target) {
            warn!(
                "dropping edge `{}`: missing endpoint ({} -> {})",
                edge.id, edge.source, edge.target
            );
            return false;
        }
        self.edge_index.insert(edge.id.clone(), self.edges.len());
        self.edges.push(edge);
        true
    }

    /// Merge a payload; returns (nodes added, edges added).
    pub fn merge(&mut self, payload: GraphPayload) -> (usize, usize) {
        let mut added_nodes = 0;
        let mut added_edges = 0;
        for node in payload.nodes {
            if self.add_node(node) {
                added_nodes += 1;
            }
        }
        for edge in payload.edges {
            if self.add_edge(edge) {
                added_edges += 1;
            }
        }
        debug!(
            "graph merge: +{} nodes, +{} edges ({} / {} total)",
            added_nodes,
            added_edges,
            self.nodes.len(),
            self.edges.len()
        );
        (added_nodes, added_edges)
    }

    /// Upgrade an external stub to a full table node in place, keeping
    /// its id and incident edges.
    pub fn promote_external(&mut self, id: &str) -> bool {
        let Some(&index) = self.node_index.get(id) else {
            return false;
        };
        let node = &mut self.nodes[index];
        if node.kind != NodeKind::ExternalTable {
            return false;
        }
        node.kind = NodeKind::Table;
        node.label = format!("Table: {}", node.table.as_deref().unwrap_or(id));
        node.promoted = true;
        true
    }

    /// Ids of all edges touching a node.
    pub fn incident_edge_ids(&self, node_id: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|e| e.source == node_id || e.target == node_id)
            .map(|e| e.id.clone())
            .collect()
    }

    pub fn expansion_state(&self, node_id: &str) -> ExpansionState {
        self.frontier.get(node_id).copied().unwrap_or_default()
    }

    /// Claim a node for expansion. Returns false when the node is
    /// already expanding or expanded; callers must treat that as a
    /// no-op. The claim is made synchronously before any fetch starts,
    /// so a rapid double-activation cannot race two expansions.
    pub fn begin_expansion(&mut self, node_id: &str) -> bool {
        match self.expansion_state(node_id) {
            ExpansionState::Collapsed => {
                self.frontier
                    .insert(node_id.to_string(), ExpansionState::Expanding);
                true
            }
            state => {
                debug!("expansion of `{}` skipped: already {:?}", node_id, state);
                false
            }
        }
    }

    pub fn finish_expansion(&mut self, node_id: &str) {
        self.frontier
            .insert(node_id.to_string(), ExpansionState::Expanded);
    }

    /// Revert a failed expansion to `Collapsed` so a retry is possible.
    pub fn abort_expansion(&mut self, node_id: &str) {
        self.frontier
            .insert(node_id.to_string(), ExpansionState::Collapsed);
    }
}
