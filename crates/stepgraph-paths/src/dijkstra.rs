use stepgraph_core::{Graph, NodeId};

use crate::algorithm::Algorithm;
use crate::search::{NodeInfo, Search, SearchStatus};

/// Compute a path from `from` to `to` with Dijkstra's algorithm, running the
/// search to completion in the calling thread.
///
/// Returns the root-to-goal records, or `None` if the goal is unreachable.
pub fn dijkstra_path(graph: &Graph, from: NodeId, to: NodeId) -> Option<Vec<NodeInfo>> {
    let mut search = Search::new(Algorithm::Dijkstra, from, to);
    match search.run_to_end(graph) {
        SearchStatus::Found => Some(search.path().to_vec()),
        _ => None,
    }
}
