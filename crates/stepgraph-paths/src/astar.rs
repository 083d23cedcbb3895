use stepgraph_core::{Graph, NodeId};

use crate::algorithm::{Algorithm, Heuristic};
use crate::search::{NodeInfo, Search, SearchStatus};

/// Compute a path from `from` to `to` with A*, running the search to
/// completion in the calling thread.
///
/// Returns the root-to-goal records, or `None` if the goal is unreachable.
pub fn astar_path(
    graph: &Graph,
    from: NodeId,
    to: NodeId,
    heuristic: Heuristic,
) -> Option<Vec<NodeInfo>> {
    let mut search = Search::new(Algorithm::AStar(heuristic), from, to);
    match search.run_to_end(graph) {
        SearchStatus::Found => Some(search.path().to_vec()),
        _ => None,
    }
}
