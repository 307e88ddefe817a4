//! Path search over trajectory networks

pub mod dijkstra;

pub use dijkstra::{DISTANCE, EDGE_ID, Label, Path, SearchContext};
