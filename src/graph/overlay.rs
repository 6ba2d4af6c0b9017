//! Highlight/visibility overlay
//!
//! Per-instance flags layered onto the base node/edge set, independent
//! of the underlying data: explicit hides, the derived FK-filter state,
//! search/selection highlights and lineage marks. Rendering visibility
//! is `!hidden && !filtered_out`.
//!
//! Hiding a node hides its incident edges in lockstep. Each edge tracks
//! *which* hide action covered it, so unhiding a node releases only the
//! edges that node's hide claimed — an edge also hidden by its other
//! endpoint stays hidden.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::identity::scalar_key;
use super::instance::GraphInstance;

/// Lineage annotations. A column that is simultaneously PK and FK can
/// carry several of these at once; they never overwrite each other.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineageMarks {
    pub record: bool,
    pub table: bool,
    pub upstream: bool,
    pub downstream: bool,
}

impl LineageMarks {
    pub fn any(&self) -> bool {
        self.record || self.table || self.upstream || self.downstream
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineageMark {
    Record,
    Table,
    Upstream,
    Downstream,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NodeFlags {
    pub hidden: bool,
    pub filtered_out: bool,
    pub search: bool,
    pub selected: bool,
    pub lineage: LineageMarks,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct EdgeFlags {
    /// Node ids whose hide action currently covers this edge.
    pub hidden_by: HashSet<String>,
    pub filtered_out: bool,
    pub lineage: LineageMarks,
}

#[derive(Debug, Default)]
pub struct Overlay {
    nodes: HashMap<String, NodeFlags>,
    edges: HashMap<String, EdgeFlags>,
}

impl Overlay {
    pub(crate) fn node(&self, id: &str) -> NodeFlags {
        self.nodes.get(id).copied().unwrap_or_default()
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> &mut NodeFlags {
        self.nodes.entry(id.to_string()).or_default()
    }

    pub(crate) fn edge_hidden(&self, id: &str) -> bool {
        self.edges
            .get(id)
            .map(|f| !f.hidden_by.is_empty())
            .unwrap_or(false)
    }

    pub(crate) fn edge_filtered(&self, id: &str) -> bool {
        self.edges.get(id).map(|f| f.filtered_out).unwrap_or(false)
    }

    pub(crate) fn edge_lineage(&self, id: &str) -> LineageMarks {
        self.edges.get(id).map(|f| f.lineage).unwrap_or_default()
    }

    pub(crate) fn edge_mut(&mut self, id: &str) -> &mut EdgeFlags {
        self.edges.entry(id.to_string()).or_default()
    }
}

/// An entry of the hidden-items side list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenItem {
    pub id: String,
    pub label: String,
}

impl GraphInstance {
    pub fn node_hidden(&self, id: &str) -> bool {
        self.overlay.node(id).hidden
    }

    pub fn edge_hidden(&self, id: &str) -> bool {
        self.overlay.edge_hidden(id)
    }

    pub fn node_visible(&self, id: &str) -> bool {
        let flags = self.overlay.node(id);
        !flags.hidden && !flags.filtered_out
    }

    pub fn edge_visible(&self, id: &str) -> bool {
        !self.overlay.edge_hidden(id) && !self.overlay.edge_filtered(id)
    }

    /// Hide a node and, in lockstep, all its incident edges.
    pub fn hide_node(&mut self, id: &str) -> bool {
        if !self.contains_node(id) {
            return false;
        }
        let incident = self.incident_edge_ids(id);
        self.overlay.node_mut(id).hidden = true;
        for edge_id in incident {
            self.overlay.edge_mut(&edge_id).hidden_by.insert(id.to_string());
        }
        true
    }

    /// Unhide a node, releasing only the edge hides this node's own
    /// hide action claimed.
    pub fn unhide_node(&mut self, id: &str) -> bool {
        if !self.contains_node(id) {
            return false;
        }
        let incident = self.incident_edge_ids(id);
        self.overlay.node_mut(id).hidden = false;
        for edge_id in incident {
            self.overlay.edge_mut(&edge_id).hidden_by.remove(id);
        }
        true
    }

    /// Toggle a node's hidden flag; returns the new state.
    pub fn toggle_node_hidden(&mut self, id: &str) -> Option<bool> {
        if !self.contains_node(id) {
            return None;
        }
        if self.node_hidden(id) {
            self.unhide_node(id);
            Some(false)
        } else {
            self.hide_node(id);
            Some(true)
        }
    }

    /// Current hidden node set, sorted by label for the side list.
    pub fn hidden_items(&self) -> Vec<HiddenItem> {
        let mut items: Vec<HiddenItem> = self
            .nodes
            .iter()
            .filter(|n| self.node_hidden(&n.id))
            .map(|n| HiddenItem {
                id: n.id.clone(),
                label: n.label.clone(),
            })
            .collect();
        items.sort_by_key(|item| item.label.to_lowercase());
        items
    }

    /// Recompute the derived filter state from the set of checked FK
    /// columns: an edge is filtered out when its FK column is
    /// unchecked; a node is filtered out when it is not hidden and has
    /// zero visible connected edges.
    pub fn apply_fk_filter(&mut self, checked: &HashSet<String>) {
        let fk_edges: Vec<(String, String)> = self
            .edges
            .iter()
            .filter_map(|e| e.fk_column.as_ref().map(|col| (e.id.clone(), col.clone())))
            .collect();
        for (edge_id, column) in fk_edges {
            self.overlay.edge_mut(&edge_id).filtered_out = !checked.contains(&column);
        }

        let node_ids: Vec<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        for node_id in node_ids {
            if self.node_hidden(&node_id) {
                self.overlay.node_mut(&node_id).filtered_out = false;
                continue;
            }
            let has_visible_edge = self
                .incident_edge_ids(&node_id)
                .iter()
                .any(|eid| self.edge_visible(eid));
            self.overlay.node_mut(&node_id).filtered_out = !has_visible_edge;
        }
    }

    /// Clear previous search highlights and apply new ones. Matches on
    /// label, id, column name and value; an empty query only clears.
    pub fn search_highlight(&mut self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        let matched: Vec<String> = if needle.is_empty() {
            Vec::new()
        } else {
            self.nodes
                .iter()
                .filter(|node| {
                    node.label.to_lowercase().contains(&needle)
                        || node.id.to_lowercase().contains(&needle)
                        || node
                            .column
                            .as_deref()
                            .is_some_and(|c| c.to_lowercase().contains(&needle))
                        || node
                            .value
                            .as_ref()
                            .is_some_and(|v: &Value| scalar_key(v).to_lowercase().contains(&needle))
                })
                .map(|node| node.id.clone())
                .collect()
        };

        let all_ids: Vec<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        for id in all_ids {
            self.overlay.node_mut(&id).search = false;
        }
        for id in &matched {
            self.overlay.node_mut(id).search = true;
        }
        matched
    }

    /// Move the single selection highlight to the given node.
    pub fn select_node(&mut self, id: &str) -> bool {
        if !self.contains_node(id) {
            return false;
        }
        let all_ids: Vec<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        for node_id in all_ids {
            self.overlay.node_mut(&node_id).selected = false;
        }
        self.overlay.node_mut(id).selected = true;
        true
    }

    /// Remove every lineage mark from every node and edge. Each trace
    /// starts from a clean slate; lineage is never cumulative.
    pub fn clear_lineage(&mut self) {
        let node_ids: Vec<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        for id in node_ids {
            self.overlay.node_mut(&id).lineage = LineageMarks::default();
        }
        let edge_ids: Vec<String> = self.edges.iter().map(|e| e.id.clone()).collect();
        for id in edge_ids {
            self.overlay.edge_mut(&id).lineage = LineageMarks::default();
        }
    }

    pub fn mark_node_lineage(&mut self, id: &str, mark: LineageMark) -> bool {
        if !self.contains_node(id) {
            return false;
        }
        apply_mark(&mut self.overlay.node_mut(id).lineage, mark);
        true
    }

    pub fn mark_edge_lineage(&mut self, id: &str, mark: LineageMark) -> bool {
        if !self.contains_edge(id) {
            return false;
        }
        apply_mark(&mut self.overlay.edge_mut(id).lineage, mark);
        true
    }

    pub fn node_lineage(&self, id: &str) -> LineageMarks {
        self.overlay.node(id).lineage
    }

    pub fn edge_lineage(&self, id: &str) -> LineageMarks {
        self.overlay.edge_lineage(id)
    }

    pub fn node_searched(&self, id: &str) -> bool {
        self.overlay.node(id).search
    }

    pub fn node_selected(&self, id: &str) -> bool {
        self.overlay.node(id).selected
    }
}

fn apply_mark(marks: &mut LineageMarks, mark: LineageMark) {
    match mark {
        LineageMark::Record => marks.record = true,
        LineageMark::Table => marks.table = true,
        LineageMark::Upstream => marks.upstream = true,
        LineageMark::Downstream => marks.downstream = true,
    }
}
