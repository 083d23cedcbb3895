//! Shared scene model for the terminal demos: a generated grid graph with
//! chosen endpoints, rendered as one character per node.

use rand::SeedableRng;
use rand::rngs::StdRng;
use stepgraph_core::{GraphError, NodeId, Point};
use stepgraph_editor::{Editor, GridConfig, Highlight};
use stepgraph_paths::Algorithm;

/// A generated grid and the editor that owns it.
pub struct Scene {
    pub editor: Editor,
    columns: Vec<Vec<NodeId>>,
}

impl Scene {
    /// Generate a `cols` x `rows` grid and pick the walkable nodes closest
    /// to the top-left and bottom-right corners as start and end.
    pub fn generate(
        algorithm: Algorithm,
        cols: i32,
        rows: i32,
        obstacle_ratio: f64,
        seed: u64,
    ) -> Result<Self, GraphError> {
        let config = GridConfig {
            obstacle_ratio,
            ..GridConfig::default()
        };
        let area = Point::new(
            cols * (config.node_size.x + config.spacing),
            rows * (config.node_size.y + config.spacing),
        );
        let mut editor = Editor::new(algorithm);
        let mut rng = StdRng::seed_from_u64(seed);
        let columns = editor.generate_grid(area, &config, &mut rng)?;
        let mut scene = Self { editor, columns };

        let walkable: Vec<NodeId> = scene
            .cells()
            .filter(|&id| scene.editor.graph().node(id).is_some_and(|n| n.is_walkable()))
            .collect();
        if let (Some(&first), Some(&last)) = (walkable.first(), walkable.last()) {
            if first != last {
                scene.click(first);
                scene.click(last);
            }
        }
        Ok(scene)
    }

    /// Node handles in row-major order.
    fn cells(&self) -> impl Iterator<Item = NodeId> + '_ {
        let rows = self.columns.first().map_or(0, Vec::len);
        (0..rows).flat_map(move |y| self.columns.iter().map(move |col| col[y]))
    }

    fn click(&mut self, id: NodeId) {
        let Some(node) = self.editor.graph().node(id) else {
            return;
        };
        let c = node.center().trunc();
        self.editor.select_endpoint(c);
    }

    /// Whether both endpoints could be chosen.
    pub fn has_endpoints(&self) -> bool {
        matches!(self.editor.endpoints(), (Some(_), Some(_)))
    }

    /// The grid with the current search state, one line per row.
    pub fn render(&self) -> String {
        let overlay = self.editor.overlay();
        let rows = self.columns.first().map_or(0, Vec::len);
        let mut out = String::with_capacity((self.columns.len() + 1) * rows);
        for y in 0..rows {
            for col in &self.columns {
                out.push(glyph(overlay.node(col[y])));
            }
            out.push('\n');
        }
        out
    }
}

fn glyph(h: Highlight) -> char {
    match h {
        Highlight::Plain => '.',
        Highlight::Obstacle => '#',
        Highlight::Closed => 'x',
        Highlight::Open => 'o',
        Highlight::Path => '*',
        Highlight::Start => 'S',
        Highlight::End => 'E',
    }
}
