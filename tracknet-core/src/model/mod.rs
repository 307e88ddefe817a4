//! Data model for trajectory networks
//!
//! Contains the node/edge/network types over which path search runs.

pub mod network;

pub use network::{BoundingBox, Edge, IndexedPoint, Network, Node, Orientation};
