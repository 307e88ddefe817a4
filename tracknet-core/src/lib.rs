//! Track analysis and shortest paths over trajectory networks.
//!
//! The crate is organised around the [`Track`] primitive: network edges are
//! tracks, shortest paths come back as tracks and the segmentation and stop
//! detection engines partition tracks.

pub mod algo;
pub mod error;
pub mod export;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod track;

pub use error::Error;
pub use loading::{NetworkFormat, read_network, read_network_from_reader};
pub use model::{BoundingBox, Edge, Network, Node, Orientation};
pub use routing::{Path, SearchContext};
pub use track::{Observation, Position, Track, TrackCollection};
