use stepgraph_core::Node;

/// Euclidean distance between the top-left corners of two nodes' bounds.
#[inline]
pub fn corner_distance(a: &Node, b: &Node) -> f64 {
    a.bounds.origin().distance(b.bounds.origin())
}

/// Euclidean distance between the centres of two nodes' bounds.
#[inline]
pub fn center_distance(a: &Node, b: &Node) -> f64 {
    a.center().distance(b.center())
}
