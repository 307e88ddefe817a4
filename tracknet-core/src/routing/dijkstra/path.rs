use petgraph::graph::{EdgeIndex, NodeIndex};

use super::context::SearchContext;
use crate::{
    Error,
    model::Network,
    track::{Observation, Position, Track},
};

/// Cumulative distance feature of a path
pub const DISTANCE: &str = "distance";
/// Index (in insertion order) of the edge producing each path point
pub const EDGE_ID: &str = "edge_id";

/// Shortest path as a polyline with per-point distance and edge annotations
#[derive(Debug, Clone)]
pub struct Path {
    track: Track,
    edge_ids: Vec<String>,
    nodes: Vec<String>,
}

impl Path {
    /// Polyline carrying the [`DISTANCE`] and [`EDGE_ID`] features
    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn into_track(self) -> Track {
        self.track
    }

    pub fn len(&self) -> usize {
        self.track.size()
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }

    /// Cumulative distance from the source, one value per point
    pub fn distances(&self) -> &[f64] {
        self.track.feature(DISTANCE).unwrap_or(&[])
    }

    /// Distance of the last point
    pub fn total_distance(&self) -> f64 {
        self.distances().last().copied().unwrap_or(0.0)
    }

    /// Id of the edge producing each point, empty for a source-only path
    pub fn edge_ids(&self) -> &[String] {
        &self.edge_ids
    }

    /// Node ids from source to target
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Single point path of a node to itself
    pub(super) fn trivial(network: &Network, node: NodeIndex) -> Path {
        let node = &network.graph[node];
        let mut track = Track::new("path");
        track.push(Observation::untimed(node.coord));
        track.create_feature_filled(DISTANCE, 0.0);
        track.create_feature_filled(EDGE_ID, f64::NAN);

        Path {
            track,
            edge_ids: vec![String::new()],
            nodes: vec![node.id.clone()],
        }
    }

    /// Walks predecessors back from `target` and concatenates the edge
    /// geometries, each oriented from the node it is entered at
    pub(super) fn reconstruct(
        network: &Network,
        ctx: &SearchContext,
        target: NodeIndex,
    ) -> Result<Path, Error> {
        let graph = &network.graph;
        let mut steps: Vec<(NodeIndex, NodeIndex, EdgeIndex)> = Vec::new();

        let mut current = target;
        while current != ctx.source() {
            let label = ctx
                .label(current)
                .ok_or_else(|| broken_chain(network, current))?;
            let (Some(edge), Some(from)) = (label.predecessor_edge, label.predecessor_node) else {
                return Err(broken_chain(network, current));
            };
            steps.push((from, current, edge));
            current = from;
        }
        steps.reverse();

        let mut track = Track::new("path");
        let mut distances = Vec::new();
        let mut edge_indices = Vec::new();
        let mut edge_ids = Vec::new();
        let mut nodes = vec![graph[ctx.source()].id.clone()];

        for (step, &(from, to, edge_idx)) in steps.iter().enumerate() {
            let edge = &graph[edge_idx];
            let to_distance = ctx.distance(to).unwrap_or(f64::NAN);
            let oriented = oriented_from(&edge.geometry, &graph[from].coord);

            for (i, obs) in oriented.iter().enumerate() {
                track.push(*obs);
                // The very first point is the source itself
                distances.push(if step == 0 && i == 0 { 0.0 } else { to_distance });
                #[allow(clippy::cast_precision_loss)]
                edge_indices.push(edge_idx.index() as f64);
                edge_ids.push(edge.id.clone());
            }
            nodes.push(graph[to].id.clone());
        }

        track.create_feature(DISTANCE, distances)?;
        track.create_feature(EDGE_ID, edge_indices)?;

        Ok(Path {
            track,
            edge_ids,
            nodes,
        })
    }
}

/// Edge observations ordered so the polyline starts at `start`.
///
/// Geometry may be stored against the circulation direction: the points are
/// reversed when the last point, rather than the first, sits on `start`.
fn oriented_from(geometry: &Track, start: &Position) -> Vec<Observation> {
    let observations = geometry.observations();
    let (Some(first), Some(last)) = (observations.first(), observations.last()) else {
        return Vec::new();
    };

    let reversed = last.position.distance_2d(start) < first.position.distance_2d(start);
    if reversed {
        observations.iter().rev().copied().collect()
    } else {
        observations.to_vec()
    }
}

fn broken_chain(network: &Network, node: NodeIndex) -> Error {
    Error::InvalidData(format!(
        "no predecessor recorded for node {}",
        network.graph[node].id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oriented_from() {
        let geometry = Track::with_observations(
            "g",
            vec![
                Observation::untimed(Position::planar(0.0, 0.0)),
                Observation::untimed(Position::planar(1.0, 1.0)),
                Observation::untimed(Position::planar(2.0, 0.0)),
            ],
        );
        let forward = oriented_from(&geometry, &Position::planar(0.0, 0.0));
        assert_eq!(forward[0].position, Position::planar(0.0, 0.0));
        let backward = oriented_from(&geometry, &Position::planar(2.0, 0.0));
        assert_eq!(backward[0].position, Position::planar(2.0, 0.0));
        assert_eq!(backward[2].position, Position::planar(0.0, 0.0));
    }
}
