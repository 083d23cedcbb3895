//! Random grid graph generation.
//!
//! Nodes are laid out column by column on a regular grid filling an area;
//! each one is an obstacle with a fixed probability, and every node gets an
//! outgoing edge to each of its (up to eight) grid neighbours.

use rand::Rng;
use stepgraph_core::{DEFAULT_NODE_SIZE, Graph, GraphError, Node, NodeId, NodeKind, Point, Rect};

use crate::names::NameSeq;

/// Parameters for [`generate_grid`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    /// Extent of every generated node.
    pub node_size: Point,
    /// Gap between neighbouring nodes, and before the first one.
    pub spacing: i32,
    /// Extra offset above the first row.
    pub top_margin: i32,
    /// Probability in `[0, 1]` that a node is an obstacle.
    pub obstacle_ratio: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            node_size: DEFAULT_NODE_SIZE,
            spacing: 50,
            top_margin: 30,
            obstacle_ratio: 0.2,
        }
    }
}

impl GridConfig {
    /// Number of columns and rows that fit in `area`.
    pub fn dimensions(&self, area: Point) -> (i32, i32) {
        let step_x = self.node_size.x + self.spacing;
        let step_y = self.node_size.y + self.spacing;
        if step_x <= 0 || step_y <= 0 {
            return (0, 0);
        }
        ((area.x / step_x).max(0), (area.y / step_y).max(0))
    }

    /// Top-left corner of the node in column `x`, row `y`.
    pub fn origin(&self, x: i32, y: i32) -> Point {
        Point::new(
            x * self.node_size.x + (x + 1) * self.spacing,
            y * self.node_size.y + (y + 1) * self.spacing + self.top_margin,
        )
    }
}

/// Add a grid of nodes filling `area` to `graph`, drawing node and edge
/// names from the given sequences.
///
/// Returns the node handles indexed as `columns[x][y]`.
pub fn generate_grid(
    graph: &mut Graph,
    area: Point,
    config: &GridConfig,
    rng: &mut impl Rng,
    node_names: &mut NameSeq,
    edge_names: &mut NameSeq,
) -> Result<Vec<Vec<NodeId>>, GraphError> {
    let (cols, rows) = config.dimensions(area);

    let columns: Vec<Vec<NodeId>> = (0..cols)
        .map(|x| {
            (0..rows)
                .map(|y| {
                    let r: f64 = rng.random();
                    let kind = if r < config.obstacle_ratio {
                        NodeKind::Obstacle
                    } else {
                        NodeKind::Walkable
                    };
                    let bounds = Rect::from_origin_size(config.origin(x, y), config.node_size);
                    graph.add_node(Node::new(node_names.next_name(), bounds).with_kind(kind))
                })
                .collect()
        })
        .collect();

    for x in 0..cols {
        for y in 0..rows {
            let from = columns[x as usize][y as usize];
            for nx in (x - 1).max(0)..=(x + 1).min(cols - 1) {
                for ny in (y - 1).max(0)..=(y + 1).min(rows - 1) {
                    if nx == x && ny == y {
                        continue;
                    }
                    let to = columns[nx as usize][ny as usize];
                    graph.add_edge(from, to, edge_names.next_name())?;
                }
            }
        }
    }

    log::debug!(
        "generated {cols}x{rows} grid: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(columns)
}
