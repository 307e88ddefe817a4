//! Road/path network model

pub mod components;
pub mod graph;

pub use components::{Edge, Node, Orientation};
pub use graph::{BoundingBox, IndexedPoint, Network};
