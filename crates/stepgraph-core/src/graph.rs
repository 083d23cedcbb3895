//! The editable directed graph: [`Graph`], [`Node`], [`Edge`].
//!
//! Nodes and edges live in arenas owned by the [`Graph`] and are addressed
//! by [`NodeId`] / [`EdgeId`] handles. A node's adjacency lists hold edge
//! handles, never edge values, so there are no ownership cycles and the
//! whole graph can be cloned as a snapshot.
//!
//! Removed slots are left as tombstones: handles are never reused and
//! iteration always follows insertion order.

use std::fmt;

use crate::geom::{Point, Rect, Vec2};

/// Default node extent used by the editor.
pub const DEFAULT_NODE_SIZE: Point = Point::new(48, 48);

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Stable handle of a node inside a [`Graph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

/// Stable handle of an edge inside a [`Graph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(pub(crate) usize);

impl NodeId {
    /// Arena index of the handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeId {
    /// Arena index of the handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by graph mutations given a stale or foreign handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// The node handle does not refer to a live node.
    UnknownNode(NodeId),
    /// The edge handle does not refer to a live edge.
    UnknownEdge(EdgeId),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "graph: unknown node {id}"),
            Self::UnknownEdge(id) => write!(f, "graph: unknown edge {id}"),
        }
    }
}

impl std::error::Error for GraphError {}

// ---------------------------------------------------------------------------
// Node / Edge
// ---------------------------------------------------------------------------

/// Whether a search may enter a node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    #[default]
    Walkable,
    Obstacle,
}

/// A graph vertex with a caller-assigned name and a rectangle in the plane.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub name: String,
    pub bounds: Rect,
    pub kind: NodeKind,
    outgoing: Vec<EdgeId>,
    incoming: Vec<EdgeId>,
}

impl Node {
    /// A walkable node occupying `bounds`.
    pub fn new(name: impl Into<String>, bounds: Rect) -> Self {
        Self {
            name: name.into(),
            bounds,
            kind: NodeKind::Walkable,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// A walkable node of [`DEFAULT_NODE_SIZE`] whose top-left corner is `origin`.
    pub fn at(name: impl Into<String>, origin: Point) -> Self {
        Self::new(name, Rect::from_origin_size(origin, DEFAULT_NODE_SIZE))
    }

    /// Builder-style kind override.
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Edges leaving this node, in creation order.
    #[inline]
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    /// Edges arriving at this node, in creation order.
    #[inline]
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    #[inline]
    pub fn is_walkable(&self) -> bool {
        self.kind == NodeKind::Walkable
    }

    /// Centre of the node's bounds.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.bounds.center()
    }
}

/// A directed, named connection between two nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub name: String,
    start: NodeId,
    end: NodeId,
}

impl Edge {
    #[inline]
    pub fn start(&self) -> NodeId {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NodeId {
        self.end
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Owner of all nodes and edges.
///
/// Referential integrity is kept by every mutation: an edge only exists
/// while both of its endpoints exist, and it is listed in exactly its
/// start node's outgoing list and its end node's incoming list.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Graph {
    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    node_count: usize,
    edge_count: usize,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of live edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable access to a node's name, bounds and kind.
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    #[inline]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// Live nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId(i), n)))
    }

    /// Live edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId(i), e)))
    }

    /// First node carrying `name`, if any. Names are not required to be
    /// unique; prefer handles.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|(_, n)| n.name == name).map(|(id, _)| id)
    }

    /// Append a node.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = node;
        node.outgoing.clear();
        node.incoming.clear();
        self.nodes.push(Some(node));
        self.node_count += 1;
        id
    }

    /// Remove a node together with every edge that starts or ends at it.
    ///
    /// The returned node has empty adjacency lists.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let node = self.node(id).ok_or(GraphError::UnknownNode(id))?;
        let mut incident: Vec<EdgeId> = node.outgoing.clone();
        for &e in &node.incoming {
            // A self-loop sits in both lists.
            if !incident.contains(&e) {
                incident.push(e);
            }
        }
        self.remove_edges(&incident);

        let mut node = self.nodes[id.0].take().ok_or(GraphError::UnknownNode(id))?;
        self.node_count -= 1;
        node.outgoing.clear();
        node.incoming.clear();
        Ok(node)
    }

    /// Create a directed edge from `start` to `end`.
    ///
    /// Self-loops and parallel edges are allowed.
    pub fn add_edge(
        &mut self,
        start: NodeId,
        end: NodeId,
        name: impl Into<String>,
    ) -> Result<EdgeId, GraphError> {
        if !self.contains_node(start) {
            return Err(GraphError::UnknownNode(start));
        }
        if !self.contains_node(end) {
            return Err(GraphError::UnknownNode(end));
        }
        let id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge {
            name: name.into(),
            start,
            end,
        }));
        self.edge_count += 1;
        if let Some(n) = self.node_mut(start) {
            n.outgoing.push(id);
        }
        if let Some(n) = self.node_mut(end) {
            n.incoming.push(id);
        }
        Ok(id)
    }

    /// Remove one edge from the edge set and both endpoints' lists.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, GraphError> {
        let edge = self
            .edges
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(GraphError::UnknownEdge(id))?;
        self.edge_count -= 1;
        if let Some(n) = self.node_mut(edge.start) {
            n.outgoing.retain(|&e| e != id);
        }
        if let Some(n) = self.node_mut(edge.end) {
            n.incoming.retain(|&e| e != id);
        }
        Ok(edge)
    }

    /// Remove every listed edge. Unknown handles are skipped; returns the
    /// number of edges actually removed.
    pub fn remove_edges(&mut self, ids: &[EdgeId]) -> usize {
        ids.iter()
            .filter(|&&id| self.remove_edge(id).is_ok())
            .count()
    }

    /// Change whether a node can be entered by a search.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) -> Result<(), GraphError> {
        let node = self.node_mut(id).ok_or(GraphError::UnknownNode(id))?;
        node.kind = kind;
        Ok(())
    }

    /// Move a node so its top-left corner is `origin`, keeping its size.
    pub fn move_node(&mut self, id: NodeId, origin: Point) -> Result<(), GraphError> {
        let node = self.node_mut(id).ok_or(GraphError::UnknownNode(id))?;
        node.bounds = node.bounds.with_origin(origin);
        Ok(())
    }

    /// Drop every node and edge. Previously issued handles become stale.
    pub fn clear(&mut self) {
        for slot in self.nodes.iter_mut() {
            *slot = None;
        }
        for slot in self.edges.iter_mut() {
            *slot = None;
        }
        self.node_count = 0;
        self.edge_count = 0;
    }

    // -----------------------------------------------------------------------
    // Derived edge geometry
    // -----------------------------------------------------------------------

    /// Centre of the edge's start node.
    pub fn edge_start_center(&self, id: EdgeId) -> Option<Vec2> {
        let edge = self.edge(id)?;
        Some(self.node(edge.start)?.center())
    }

    /// Centre of the edge's end node.
    pub fn edge_end_center(&self, id: EdgeId) -> Option<Vec2> {
        let edge = self.edge(id)?;
        Some(self.node(edge.end)?.center())
    }

    /// Euclidean distance between the centres of the edge's endpoints.
    pub fn edge_length(&self, id: EdgeId) -> Option<f64> {
        Some(self.edge_start_center(id)?.distance(self.edge_end_center(id)?))
    }

    /// Unit vector from start centre to end centre (zero for a self-loop).
    pub fn edge_direction(&self, id: EdgeId) -> Option<Vec2> {
        Some((self.edge_end_center(id)? - self.edge_start_center(id)?).normalize())
    }

    /// Axis-aligned rectangle spanning the bounds of every node, zero-size
    /// nodes included. Empty for an empty graph.
    pub fn bounding_rect(&self) -> Rect {
        let mut bounds = self.nodes().map(|(_, n)| n.bounds);
        let Some(first) = bounds.next() else {
            return Rect::default();
        };
        bounds.fold(first, |acc, b| Rect {
            min: Point::new(acc.min.x.min(b.min.x), acc.min.y.min(b.min.y)),
            max: Point::new(acc.max.x.max(b.max.x), acc.max.y.max(b.max.y)),
        })
    }
}
