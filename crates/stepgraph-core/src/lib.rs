//! **stepgraph-core**: geometry and the editable graph model.
//!
//! This crate provides the foundational types used across the *stepgraph*
//! workspace: integer points and rectangles in the editor plane, a
//! floating-point vector for lengths and directions, and the arena-backed
//! directed [`Graph`] the pathfinding engine walks.

pub mod geom;
pub mod graph;

pub use geom::{Point, Rect, Vec2};
pub use graph::{DEFAULT_NODE_SIZE, Edge, EdgeId, Graph, GraphError, Node, NodeId, NodeKind};
