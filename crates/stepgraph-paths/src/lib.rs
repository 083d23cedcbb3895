//! Incremental, steppable pathfinding over an editable directed graph.
//!
//! The crate is built in two layers:
//!
//! - [`Search`] performs one best-first iteration per call over a
//!   [`Graph`](stepgraph_core::Graph), exposing its open list, closed list
//!   and reconstructed path between iterations. [`astar_path`] and
//!   [`dijkstra_path`] run it to completion.
//! - [`PathFinder`] drives a [`Search`] on a worker thread so a UI can
//!   animate it: [`start`](PathFinder::start), [`step`](PathFinder::step)
//!   and [`stop`](PathFinder::stop) never block on an iteration, and the
//!   list accessors return consistent snapshots at any time.
//!
//! # Algorithms
//!
//! | [`Algorithm`] | Priority key |
//! |---|---|
//! | [`Algorithm::Dijkstra`] | `g`, accumulated centre-to-centre edge length |
//! | [`Algorithm::AStar`] | `f = g + h`, with `h` chosen by [`Heuristic`] |
//!
//! Search records ([`NodeInfo`]) live in the search, not on the graph's
//! nodes. Anything exposing a node and its predecessor edge implements
//! [`NodePack`].

mod algorithm;
mod astar;
mod context;
mod dijkstra;
mod distance;
mod engine;
mod search;
mod traits;

pub use algorithm::{Algorithm, Heuristic};
pub use astar::astar_path;
pub use context::Context;
pub use dijkstra::dijkstra_path;
pub use distance::{center_distance, corner_distance};
pub use engine::{
    EngineState, PathFinder, RunConfig, SearchError, SearchEvent, Snapshot, StepListener,
};
pub use search::{NodeInfo, Search, SearchStatus, total_cost};
pub use traits::NodePack;
