//! Headless editor model for stepgraph: the state behind a canvas where
//! nodes are placed, connected, painted as obstacles and searched.

pub mod editor;
pub mod generate;
pub mod names;
pub mod overlay;

pub use editor::{Editor, edge_handle};
pub use generate::{GridConfig, generate_grid};
pub use names::{LetterCase, NameSeq};
pub use overlay::{Highlight, Overlay};
