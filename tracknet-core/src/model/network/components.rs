//! Network components - nodes, edges and circulation orientation

use crate::track::{Position, Track};

/// Network node (junction or dead end)
#[derive(Debug, Clone)]
pub struct Node {
    /// Identifier, unique within a network
    pub id: String,
    /// Node coordinates
    pub coord: Position,
}

impl Node {
    pub fn new(id: impl Into<String>, coord: Position) -> Self {
        Self {
            id: id.into(),
            coord,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Permitted direction of circulation along an edge.
///
/// Refers to the edge's source and target nodes, never to the point order
/// of its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Both directions
    #[default]
    Double,
    /// Source to target only
    Forward,
    /// Target to source only
    Backward,
}

impl Orientation {
    /// Decodes `0`, `1` and `-1`; any other code is read as [`Orientation::Double`]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Orientation::Forward,
            -1 => Orientation::Backward,
            _ => Orientation::Double,
        }
    }

    pub fn code(self) -> i8 {
        match self {
            Orientation::Double => 0,
            Orientation::Forward => 1,
            Orientation::Backward => -1,
        }
    }

    /// Whether the edge may be travelled from its source to its target
    pub fn allows_forward(self) -> bool {
        self != Orientation::Backward
    }

    /// Whether the edge may be travelled from its target to its source
    pub fn allows_backward(self) -> bool {
        self != Orientation::Forward
    }
}

/// Network edge carrying a polyline geometry
#[derive(Debug, Clone)]
pub struct Edge {
    /// Identifier, unique within a network
    pub id: String,
    /// Polyline, not necessarily stored from source to target
    pub geometry: Track,
    pub orientation: Orientation,
    /// Traversal cost, the planar geometry length unless overridden
    pub weight: f64,
}

impl Edge {
    /// Double-sens edge weighted by its geometric length
    pub fn new(id: impl Into<String>, geometry: Track) -> Self {
        let weight = geometry.length();
        Self {
            id: id.into(),
            geometry,
            orientation: Orientation::Double,
            weight,
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}
