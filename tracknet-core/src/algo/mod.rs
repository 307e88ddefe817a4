//! Track analysis algorithms
//!
//! Threshold segmentation and stop detection over [`crate::track::Track`].

pub mod segmentation;
pub mod stops;

pub use segmentation::{ComparisonMode, segment, split};
pub use stops::{
    Stop, StopCollection, StopMode, find_stops, find_stops_global, find_stops_local, remove_stops,
};
