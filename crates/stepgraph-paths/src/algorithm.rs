use stepgraph_core::{Graph, NodeId};

use crate::distance::{center_distance, corner_distance};

/// Which points of the node rectangles the A* estimate measures between.
///
/// Edge lengths are always centre-to-centre. [`Heuristic::Corner`] measures
/// between top-left corners instead, so it is only admissible when nodes
/// share a size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    /// Top-left corner to top-left corner.
    #[default]
    Corner,
    /// Centre to centre.
    Center,
}

/// The search algorithms the engine can drive.
///
/// Both share one relaxation rule; they differ only in the estimate added
/// to the accumulated cost to form the priority key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Best-first on `f = g + h`.
    AStar(Heuristic),
    /// Uniform cost: best-first on `g`.
    Dijkstra,
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::AStar(Heuristic::default())
    }
}

impl Algorithm {
    /// Remaining-cost estimate from `node` to `goal`.
    ///
    /// Missing nodes estimate to zero.
    pub fn estimate(self, graph: &Graph, node: NodeId, goal: NodeId) -> f64 {
        let Self::AStar(heuristic) = self else {
            return 0.0;
        };
        let (Some(n), Some(g)) = (graph.node(node), graph.node(goal)) else {
            return 0.0;
        };
        match heuristic {
            Heuristic::Corner => corner_distance(n, g),
            Heuristic::Center => center_distance(n, g),
        }
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::AStar(_) => "A*",
            Self::Dijkstra => "Dijkstra",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AStar(Heuristic::Corner) => f.write_str("A* (corner)"),
            Self::AStar(Heuristic::Center) => f.write_str("A* (center)"),
            Self::Dijkstra => f.write_str("Dijkstra"),
        }
    }
}
