//! Classification of nodes and edges for the paint layer.
//!
//! The engine's closed list, open list and path are applied in that order,
//! each overriding the previous one, and the chosen endpoints are marked
//! last.

use std::collections::HashMap;

use stepgraph_core::{EdgeId, Graph, NodeId};
use stepgraph_paths::{NodePack, PathFinder};

/// How a node or edge should be drawn while a search is shown.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Highlight {
    #[default]
    Plain,
    Obstacle,
    Closed,
    Open,
    Path,
    Start,
    End,
}

/// Per-element highlights for one repaint.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    nodes: HashMap<NodeId, Highlight>,
    edges: HashMap<EdgeId, Highlight>,
}

impl Overlay {
    /// Snapshot `finder`'s lists and classify every element of `graph`.
    pub fn build(
        graph: &Graph,
        finder: &PathFinder,
        start: Option<NodeId>,
        end: Option<NodeId>,
    ) -> Self {
        let snap = finder.snapshot();
        Self::from_lists(graph, &snap.closed, &snap.open, &snap.path, start, end)
    }

    /// Classify from explicit lists.
    pub fn from_lists<P: NodePack>(
        graph: &Graph,
        closed: &[P],
        open: &[P],
        path: &[P],
        start: Option<NodeId>,
        end: Option<NodeId>,
    ) -> Self {
        let mut overlay = Self::default();
        for (id, node) in graph.nodes() {
            if !node.is_walkable() {
                overlay.nodes.insert(id, Highlight::Obstacle);
            }
        }
        for (list, mark) in [
            (closed, Highlight::Closed),
            (open, Highlight::Open),
            (path, Highlight::Path),
        ] {
            for rec in list {
                overlay.mark(graph, rec, mark);
            }
        }
        if let Some(id) = start.filter(|&id| graph.contains_node(id)) {
            overlay.nodes.insert(id, Highlight::Start);
        }
        if let Some(id) = end.filter(|&id| graph.contains_node(id)) {
            overlay.nodes.insert(id, Highlight::End);
        }
        overlay
    }

    fn mark<P: NodePack>(&mut self, graph: &Graph, rec: &P, mark: Highlight) {
        // Records may reference elements removed from the graph since the
        // run started.
        if graph.contains_node(rec.node()) {
            self.nodes.insert(rec.node(), mark);
        }
        if let Some(e) = rec.edge().filter(|&e| graph.contains_edge(e)) {
            self.edges.insert(e, mark);
        }
    }

    pub fn node(&self, id: NodeId) -> Highlight {
        self.nodes.get(&id).copied().unwrap_or_default()
    }

    pub fn edge(&self, id: EdgeId) -> Highlight {
        self.edges.get(&id).copied().unwrap_or_default()
    }
}
