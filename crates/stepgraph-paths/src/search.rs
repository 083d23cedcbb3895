use std::collections::HashSet;

use stepgraph_core::{EdgeId, Graph, NodeId};

use crate::algorithm::Algorithm;
use crate::traits::NodePack;

/// A per-search record binding a node to the way the search reached it.
///
/// Records are owned by one [`Search`]; the graph's nodes carry no search
/// state, so any number of searches may walk the same graph.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeInfo {
    pub node: NodeId,
    /// Edge the node was reached through; `None` for the root.
    pub edge: Option<EdgeId>,
    /// Accumulated edge length from the root.
    pub g: f64,
    /// Estimated remaining cost to the goal.
    pub h: f64,
    /// Priority key, `g + h`.
    pub f: f64,
    /// Index of the predecessor record in the closed list.
    pub parent: Option<usize>,
}

impl NodeInfo {
    /// The zero-cost root record.
    pub fn root(node: NodeId) -> Self {
        Self {
            node,
            edge: None,
            g: 0.0,
            h: 0.0,
            f: 0.0,
            parent: None,
        }
    }
}

impl NodePack for NodeInfo {
    #[inline]
    fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    fn edge(&self) -> Option<EdgeId> {
        self.edge
    }
}

/// Total cost of a root-to-goal path: the goal record's `g`.
pub fn total_cost(path: &[NodeInfo]) -> f64 {
    path.last().map_or(0.0, |n| n.g)
}

/// Progress of a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    /// More iterations are needed.
    Running,
    /// The goal was popped; [`Search::path`] holds the result.
    Found,
    /// The open list ran dry before the goal was reached.
    Exhausted,
}

impl SearchStatus {
    #[inline]
    pub fn is_finished(self) -> bool {
        self != Self::Running
    }
}

/// Single-threaded, incremental best-first search from `start` to `goal`.
///
/// Every call to [`step`](Self::step) performs exactly one iteration: pop
/// the open record with the smallest key (first one in list order on ties),
/// finish if it is the goal, otherwise close it and relax its walkable,
/// not-yet-closed successors.
#[derive(Debug, Clone)]
pub struct Search {
    algorithm: Algorithm,
    start: NodeId,
    goal: NodeId,
    open: Vec<NodeInfo>,
    closed: Vec<NodeInfo>,
    closed_set: HashSet<NodeId>,
    path: Vec<NodeInfo>,
    status: SearchStatus,
    iterations: usize,
}

impl Search {
    /// Seed a search with the root record for `start` on the open list.
    pub fn new(algorithm: Algorithm, start: NodeId, goal: NodeId) -> Self {
        Self {
            algorithm,
            start,
            goal,
            open: vec![NodeInfo::root(start)],
            closed: Vec::new(),
            closed_set: HashSet::new(),
            path: Vec::new(),
            status: SearchStatus::Running,
            iterations: 0,
        }
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[inline]
    pub fn start(&self) -> NodeId {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> NodeId {
        self.goal
    }

    /// Frontier records, in insertion order.
    #[inline]
    pub fn open(&self) -> &[NodeInfo] {
        &self.open
    }

    /// Expanded records, in expansion order.
    #[inline]
    pub fn closed(&self) -> &[NodeInfo] {
        &self.closed
    }

    /// Root-to-goal path. Empty unless the status is [`SearchStatus::Found`].
    #[inline]
    pub fn path(&self) -> &[NodeInfo] {
        &self.path
    }

    #[inline]
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Number of iterations performed so far.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Perform one iteration. A finished search is left untouched.
    pub fn step(&mut self, graph: &Graph) -> SearchStatus {
        if self.status.is_finished() {
            return self.status;
        }
        self.iterations += 1;

        let Some(best) = self
            .open
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.f.total_cmp(&b.1.f))
            .map(|(i, _)| i)
        else {
            self.status = SearchStatus::Exhausted;
            return self.status;
        };

        if self.open[best].node == self.goal {
            self.path = self.trace(self.open[best]);
            self.status = SearchStatus::Found;
            return self.status;
        }

        let current = self.open.remove(best);
        let parent = self.closed.len();
        self.closed.push(current);
        self.closed_set.insert(current.node);

        let Some(node) = graph.node(current.node) else {
            return self.status;
        };
        for &edge_id in node.outgoing() {
            let Some(edge) = graph.edge(edge_id) else {
                continue;
            };
            let target = edge.end();
            if self.closed_set.contains(&target) {
                continue;
            }
            if !graph.node(target).is_some_and(|n| n.is_walkable()) {
                continue;
            }
            let g = current.g + graph.edge_length(edge_id).unwrap_or(0.0);
            self.relax(graph, target, edge_id, g, parent);
        }

        self.status
    }

    /// Run until the search finishes, returning the final status.
    pub fn run_to_end(&mut self, graph: &Graph) -> SearchStatus {
        while !self.step(graph).is_finished() {}
        self.status
    }

    /// Merge a candidate into the open list: insert it, or overwrite the
    /// existing record for the same node in place when `g` improves on it.
    fn relax(&mut self, graph: &Graph, target: NodeId, edge: EdgeId, g: f64, parent: usize) {
        if let Some(existing) = self.open.iter_mut().find(|r| r.node == target) {
            if g < existing.g {
                let h = self.algorithm.estimate(graph, target, self.goal);
                existing.g = g;
                existing.h = h;
                existing.f = g + h;
                existing.edge = Some(edge);
                existing.parent = Some(parent);
            }
            return;
        }
        let h = self.algorithm.estimate(graph, target, self.goal);
        self.open.push(NodeInfo {
            node: target,
            edge: Some(edge),
            g,
            h,
            f: g + h,
            parent: Some(parent),
        });
    }

    /// Follow parent links from `goal` back to the root, root first.
    fn trace(&self, goal: NodeInfo) -> Vec<NodeInfo> {
        let mut path = vec![goal];
        let mut next = goal.parent;
        while let Some(i) = next {
            let rec = self.closed[i];
            path.push(rec);
            next = rec.parent;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Heuristic;
    use stepgraph_core::{Node, NodeKind, Point, Rect};

    /// A node whose bounds collapse to a single point, so corner and centre
    /// coincide and edge lengths are plain point distances.
    fn point_node(g: &mut Graph, name: &str, x: i32, y: i32) -> NodeId {
        g.add_node(Node::new(name, Rect::from_origin_size(Point::new(x, y), Point::ZERO)))
    }

    fn names(g: &Graph, recs: &[NodeInfo]) -> Vec<String> {
        recs.iter()
            .map(|r| g.node(r.node).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn first_step_expands_start() {
        let mut g = Graph::new();
        let a = point_node(&mut g, "A", 0, 0);
        let b = point_node(&mut g, "B", 3, 4);
        let c = point_node(&mut g, "C", 0, 5);
        g.add_edge(a, b, "ab").unwrap();
        g.add_edge(a, c, "ac").unwrap();

        let mut s = Search::new(Algorithm::Dijkstra, a, c);
        assert_eq!(s.open(), &[NodeInfo::root(a)]);
        assert_eq!(s.step(&g), SearchStatus::Running);
        assert_eq!(names(&g, s.closed()), ["A"]);
        assert_eq!(names(&g, s.open()), ["B", "C"]);
        assert_eq!(s.open()[0].parent, Some(0));
        assert_eq!(s.open()[0].g, 5.0);
        assert!(s.path().is_empty());
    }

    #[test]
    fn goal_stays_on_open_list_when_found() {
        let mut g = Graph::new();
        let a = point_node(&mut g, "A", 0, 0);
        let b = point_node(&mut g, "B", 3, 4);
        g.add_edge(a, b, "ab").unwrap();

        let mut s = Search::new(Algorithm::Dijkstra, a, b);
        assert_eq!(s.run_to_end(&g), SearchStatus::Found);
        assert_eq!(s.iterations(), 2);
        assert_eq!(names(&g, s.open()), ["B"]);
        assert_eq!(names(&g, s.closed()), ["A"]);
        assert_eq!(names(&g, s.path()), ["A", "B"]);
        assert_eq!(s.path()[1].edge, g.node(a).unwrap().outgoing().first().copied());
    }

    #[test]
    fn start_equal_to_goal_yields_single_record() {
        let mut g = Graph::new();
        let a = point_node(&mut g, "A", 0, 0);
        let mut s = Search::new(Algorithm::default(), a, a);
        assert_eq!(s.step(&g), SearchStatus::Found);
        assert_eq!(s.path(), &[NodeInfo::root(a)]);
    }

    #[test]
    fn exhausts_without_path() {
        let mut g = Graph::new();
        let a = point_node(&mut g, "A", 0, 0);
        let b = point_node(&mut g, "B", 10, 0);
        let c = point_node(&mut g, "C", 20, 0);
        g.add_edge(a, b, "ab").unwrap();
        g.add_edge(c, b, "cb").unwrap();

        let mut s = Search::new(Algorithm::default(), a, c);
        assert_eq!(s.run_to_end(&g), SearchStatus::Exhausted);
        assert!(s.path().is_empty());
        assert!(s.open().is_empty());
        assert_eq!(names(&g, s.closed()), ["A", "B"]);
    }

    #[test]
    fn finished_search_ignores_further_steps() {
        let mut g = Graph::new();
        let a = point_node(&mut g, "A", 0, 0);
        let b = point_node(&mut g, "B", 10, 0);
        g.add_edge(a, b, "ab").unwrap();
        let mut s = Search::new(Algorithm::Dijkstra, a, b);
        s.run_to_end(&g);
        let before = (s.open().to_vec(), s.closed().to_vec(), s.iterations());
        assert_eq!(s.step(&g), SearchStatus::Found);
        assert_eq!((s.open().to_vec(), s.closed().to_vec(), s.iterations()), before);
    }

    #[test]
    fn self_loops_and_parallel_edges_terminate() {
        let mut g = Graph::new();
        let a = point_node(&mut g, "A", 0, 0);
        let b = point_node(&mut g, "B", 10, 0);
        let c = point_node(&mut g, "C", 20, 0);
        g.add_edge(a, a, "aa").unwrap();
        g.add_edge(a, b, "ab1").unwrap();
        g.add_edge(a, b, "ab2").unwrap();
        g.add_edge(b, b, "bb").unwrap();
        g.add_edge(b, c, "bc").unwrap();

        let mut s = Search::new(Algorithm::Dijkstra, a, c);
        assert_eq!(s.run_to_end(&g), SearchStatus::Found);
        assert_eq!(names(&g, s.path()), ["A", "B", "C"]);
        // Parallel edges merge into one open record.
        assert_eq!(s.closed().iter().filter(|r| r.node == b).count(), 1);
        assert_eq!(total_cost(s.path()), 20.0);
    }

    #[test]
    fn obstacles_never_enter_the_lists() {
        let mut g = Graph::new();
        let a = point_node(&mut g, "A", 0, 0);
        let wall = g.add_node(
            Node::new("W", Rect::from_origin_size(Point::new(10, 0), Point::ZERO))
                .with_kind(NodeKind::Obstacle),
        );
        let b = point_node(&mut g, "B", 0, 10);
        let c = point_node(&mut g, "C", 20, 0);
        g.add_edge(a, wall, "aw").unwrap();
        g.add_edge(wall, c, "wc").unwrap();
        g.add_edge(a, b, "ab").unwrap();
        g.add_edge(b, c, "bc").unwrap();

        let mut s = Search::new(Algorithm::default(), a, c);
        while !s.step(&g).is_finished() {
            assert!(s.open().iter().all(|r| r.node != wall));
            assert!(s.closed().iter().all(|r| r.node != wall));
        }
        assert_eq!(names(&g, s.path()), ["A", "B", "C"]);
    }

    #[test]
    fn relaxation_updates_record_in_place() {
        // D is first reached through the detour X, then through B for less;
        // the existing open record is rewired instead of duplicated.
        let mut g = Graph::new();
        let a = point_node(&mut g, "A", 0, 0);
        let d = point_node(&mut g, "D", 100, 0);
        let x = point_node(&mut g, "X", 10, 30);
        let b = point_node(&mut g, "B", 50, 0);
        let goal = point_node(&mut g, "G", 500, 500);
        g.add_edge(a, x, "ax").unwrap();
        g.add_edge(a, b, "ab").unwrap();
        g.add_edge(x, d, "xd").unwrap();
        let bd = g.add_edge(b, d, "bd").unwrap();

        let mut s = Search::new(Algorithm::Dijkstra, a, goal);
        s.step(&g);
        assert_eq!(names(&g, s.open()), ["X", "B"]);
        s.step(&g);
        assert_eq!(names(&g, s.open()), ["B", "D"]);
        assert!(s.open()[1].g > 100.0);
        s.step(&g);
        assert_eq!(names(&g, s.open()), ["D"]);
        let rec = s.open()[0];
        assert_eq!(rec.g, 100.0);
        assert_eq!(rec.edge, Some(bd));
        assert_eq!(rec.parent, Some(2));
        assert_eq!(names(&g, s.closed()), ["A", "X", "B"]);
    }

    #[test]
    fn ties_pick_first_in_list_order() {
        let mut g = Graph::new();
        let a = point_node(&mut g, "A", 0, 0);
        let b = point_node(&mut g, "B", 10, 0);
        let c = point_node(&mut g, "C", 0, 10);
        let goal = point_node(&mut g, "G", 100, 100);
        g.add_edge(a, b, "ab").unwrap();
        g.add_edge(a, c, "ac").unwrap();

        let mut s = Search::new(Algorithm::Dijkstra, a, goal);
        s.step(&g);
        s.step(&g);
        assert_eq!(names(&g, s.closed()), ["A", "B"]);
    }

    #[test]
    fn repeated_searches_are_identical_per_step() {
        let mut g = Graph::new();
        let ids: Vec<NodeId> = (0..16)
            .map(|i| point_node(&mut g, &format!("N{i}"), (i % 4) * 10, (i / 4) * 10))
            .collect();
        for i in 0..16usize {
            for j in [i + 1, i + 4] {
                if j < 16 && !(j == i + 1 && j % 4 == 0) {
                    g.add_edge(ids[i], ids[j], "e").unwrap();
                    g.add_edge(ids[j], ids[i], "e").unwrap();
                }
            }
        }
        let algo = Algorithm::AStar(Heuristic::Center);
        let mut s1 = Search::new(algo, ids[0], ids[15]);
        let mut s2 = Search::new(algo, ids[0], ids[15]);
        loop {
            let st1 = s1.step(&g);
            let st2 = s2.step(&g);
            assert_eq!(st1, st2);
            assert_eq!(s1.open(), s2.open());
            assert_eq!(s1.closed(), s2.closed());
            assert_eq!(s1.path(), s2.path());
            if st1.is_finished() {
                break;
            }
        }
        assert_eq!(total_cost(s1.path()), 60.0);
    }
}
