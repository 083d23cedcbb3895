use stepgraph_core::{EdgeId, NodeId};

/// Minimal record that can flow through the engine's open, closed and path
/// lists: a node plus the edge it was reached through.
pub trait NodePack {
    /// The node this record stands for.
    fn node(&self) -> NodeId;

    /// The edge the node was reached through. `None` for the search root.
    fn edge(&self) -> Option<EdgeId>;
}
