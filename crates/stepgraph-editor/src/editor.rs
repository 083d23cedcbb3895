//! The headless editor: owns the graph and the engine, and turns pointer
//! positions into graph edits and run-mode selections.

use rand::Rng;
use stepgraph_core::{
    DEFAULT_NODE_SIZE, Edge, EdgeId, Graph, GraphError, Node, NodeId, NodeKind, Point, Rect, Vec2,
};
use stepgraph_paths::{Algorithm, PathFinder, RunConfig, SearchError};

use crate::generate::{GridConfig, generate_grid};
use crate::names::NameSeq;
use crate::overlay::Overlay;

/// Size of the rectangle probed around the pointer when hit testing.
const PROBE_SIZE: Point = Point::new(2, 2);

/// Side of the square grab handle drawn on every edge.
const HANDLE_SIZE: i32 = 10;

/// The grab handle of an edge: a square centred 10/16 of the way from the
/// start node's centre to the end node's centre.
pub fn edge_handle(graph: &Graph, id: EdgeId) -> Option<Rect> {
    let start = graph.edge_start_center(id)?;
    let along = graph.edge_direction(id)? * (graph.edge_length(id)? * 10.0 / 16.0);
    let half = f64::from(HANDLE_SIZE) / 2.0;
    let origin = (start + along - Vec2::new(half, half)).trunc();
    Some(Rect::from_origin_size(origin, Point::new(HANDLE_SIZE, HANDLE_SIZE)))
}

fn probe(point: Point) -> Rect {
    Rect::from_origin_size(point, PROBE_SIZE)
}

/// Editor state shared by the edit and run modes.
#[derive(Debug)]
pub struct Editor {
    graph: Graph,
    finder: PathFinder,
    node_names: NameSeq,
    edge_names: NameSeq,
    start: Option<NodeId>,
    end: Option<NodeId>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Algorithm::default())
    }
}

impl Editor {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            graph: Graph::new(),
            finder: PathFinder::new(algorithm),
            node_names: NameSeq::upper(),
            edge_names: NameSeq::lower(),
            start: None,
            end: None,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    pub fn algorithm(&self) -> Algorithm {
        self.finder.algorithm()
    }

    /// Switch algorithms. The current run is stopped and a fresh engine
    /// replaces it; listeners and subscriptions of the old engine are
    /// dropped with it.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        if algorithm == self.algorithm() {
            return;
        }
        log::debug!("switching algorithm to {algorithm}");
        self.finder.stop();
        self.finder = PathFinder::new(algorithm);
    }

    // -----------------------------------------------------------------------
    // Hit testing
    // -----------------------------------------------------------------------

    /// First node (in insertion order) under `point`.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        let probe = probe(point);
        self.graph
            .nodes()
            .find(|(_, n)| n.bounds.overlaps(probe))
            .map(|(id, _)| id)
    }

    /// First edge whose grab handle is under `point`.
    pub fn edge_at(&self, point: Point) -> Option<EdgeId> {
        let probe = probe(point);
        self.graph
            .edges()
            .map(|(id, _)| id)
            .find(|&id| edge_handle(&self.graph, id).is_some_and(|h| h.overlaps(probe)))
    }

    // -----------------------------------------------------------------------
    // Edit mode
    // -----------------------------------------------------------------------

    /// Add a default-size node centred on `point`, unless a node is
    /// already there.
    pub fn add_node_at(&mut self, point: Point) -> Option<NodeId> {
        if self.node_at(point).is_some() {
            return None;
        }
        let origin = point - DEFAULT_NODE_SIZE / 2;
        let id = self.graph.add_node(Node::at(self.node_names.next_name(), origin));
        log::trace!("added node {id} at {origin}");
        Some(id)
    }

    /// Remove the node under `point` and its edges. A removed endpoint is
    /// deselected.
    pub fn remove_node_at(&mut self, point: Point) -> Option<Node> {
        let id = self.node_at(point)?;
        let node = self.graph.remove_node(id).ok()?;
        if self.start == Some(id) {
            self.start = None;
        }
        if self.end == Some(id) {
            self.end = None;
        }
        Some(node)
    }

    /// Add a named edge from `from` to `to`.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId, GraphError> {
        // Validate before consuming a name.
        for id in [from, to] {
            if !self.graph.contains_node(id) {
                return Err(GraphError::UnknownNode(id));
            }
        }
        self.graph.add_edge(from, to, self.edge_names.next_name())
    }

    /// Remove the edge whose handle is under `point`.
    pub fn remove_edge_at(&mut self, point: Point) -> Option<Edge> {
        let id = self.edge_at(point)?;
        self.graph.remove_edge(id).ok()
    }

    /// Move a node so it is centred on `point`.
    pub fn move_node_to(&mut self, id: NodeId, point: Point) -> Result<(), GraphError> {
        let size = self
            .graph
            .node(id)
            .ok_or(GraphError::UnknownNode(id))?
            .bounds
            .size();
        let origin = (point.to_vec2() - size.to_vec2() * 0.5).trunc();
        self.graph.move_node(id, origin)
    }

    /// Move both endpoints of an edge so that its midpoint lands on `point`
    /// while its length and direction stay the same.
    pub fn move_edge_to(&mut self, id: EdgeId, point: Point) -> Result<(), GraphError> {
        let edge = self.graph.edge(id).ok_or(GraphError::UnknownEdge(id))?;
        let (from, to) = (edge.start(), edge.end());
        let (Some(a), Some(b)) = (self.graph.node(from), self.graph.node(to)) else {
            return Err(GraphError::UnknownEdge(id));
        };
        let (a_center, b_center) = (a.center(), b.center());
        let (a_size, b_size) = (a.bounds.size().to_vec2(), b.bounds.size().to_vec2());

        let half = (a_center - b_center) * 0.5;
        let p = point.to_vec2();
        let a_origin = (p + half - a_size * 0.5).trunc();
        let b_origin = (p - half - b_size * 0.5).trunc();
        self.graph.move_node(from, a_origin)?;
        self.graph.move_node(to, b_origin)
    }

    /// Set the kind of the node under `point`.
    pub fn paint_obstacle(&mut self, point: Point, kind: NodeKind) -> Option<NodeId> {
        let id = self.node_at(point)?;
        self.graph.set_kind(id, kind).ok()?;
        Some(id)
    }

    /// Replace the graph with a random grid filling `area`.
    ///
    /// Returns the node handles indexed as `columns[x][y]`.
    pub fn generate_grid(
        &mut self,
        area: Point,
        config: &GridConfig,
        rng: &mut impl Rng,
    ) -> Result<Vec<Vec<NodeId>>, GraphError> {
        self.reset_graph();
        generate_grid(
            &mut self.graph,
            area,
            config,
            rng,
            &mut self.node_names,
            &mut self.edge_names,
        )
    }

    /// Stop the engine and start over with an empty graph.
    pub fn reset_graph(&mut self) {
        self.finder.stop();
        self.graph = Graph::new();
        self.node_names.reset();
        self.edge_names.reset();
        self.start = None;
        self.end = None;
    }

    // -----------------------------------------------------------------------
    // Run mode
    // -----------------------------------------------------------------------

    /// Handle a run-mode click: the first click picks the start node, the
    /// second the end node, and a third begins a new selection. Clicks on
    /// obstacles are ignored.
    pub fn select_endpoint(&mut self, point: Point) -> (Option<NodeId>, Option<NodeId>) {
        let hovered = self.node_at(point);
        let blocked = hovered
            .and_then(|id| self.graph.node(id))
            .is_some_and(|n| !n.is_walkable());
        if !blocked {
            match (self.start, self.end) {
                (None, _) => self.start = hovered,
                (Some(_), None) => self.end = hovered,
                (Some(_), Some(_)) => {
                    self.start = hovered;
                    self.end = None;
                }
            }
        }
        self.endpoints()
    }

    pub fn endpoints(&self) -> (Option<NodeId>, Option<NodeId>) {
        (self.start, self.end)
    }

    /// Start the engine between the selected endpoints. Returns `Ok(false)`
    /// without touching the engine when either endpoint is missing.
    pub fn start_search(&self, config: RunConfig) -> Result<bool, SearchError> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Ok(false);
        };
        self.finder.start(&self.graph, start, end, config)?;
        Ok(true)
    }

    pub fn step(&self) {
        self.finder.step();
    }

    pub fn stop(&self) {
        self.finder.stop();
    }

    /// Classification of every element for the next repaint.
    pub fn overlay(&self) -> Overlay {
        Overlay::build(&self.graph, &self.finder, self.start, self.end)
    }
}
