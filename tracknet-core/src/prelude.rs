// Re-export key components
pub use crate::algo::{
    ComparisonMode, Stop, StopCollection, StopMode, find_stops, find_stops_global,
    find_stops_local, remove_stops, segment, split,
};
pub use crate::loading::{NetworkFormat, read_network, read_network_from_reader};
pub use crate::model::{BoundingBox, Edge, Network, Node, Orientation};
pub use crate::routing::{DISTANCE, EDGE_ID, Path, SearchContext};

// Core types for trajectories
pub use crate::track::{
    ABS_CURV, Observation, Operator, Position, SPEED, Track, TrackCollection, timestamp_from_secs,
};

pub use crate::Error;
