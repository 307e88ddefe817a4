//! Shortest paths over a [`Network`] respecting circulation direction

mod context;
mod path;
mod search;
mod state;

use hashbrown::HashMap;
use log::debug;

pub use context::{Label, SearchContext};
pub use path::{DISTANCE, EDGE_ID, Path};
pub(crate) use search::{Outcome, directional_neighbors, label_setting};

use crate::{Error, model::Network};

fn validate_cutoff(cutoff: f64) -> Result<(), Error> {
    if cutoff.is_nan() || cutoff < 0.0 {
        return Err(Error::InvalidData(format!(
            "cutoff must be a non-negative distance, got {cutoff}"
        )));
    }
    Ok(())
}

impl Network {
    /// Shortest path from `source` to `target` following edge orientations.
    ///
    /// A `cutoff` of zero is unbounded. `Ok(None)` means the target is
    /// unreachable or lies beyond the cutoff; the two cases are not
    /// distinguished.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if either node is not part of the
    /// network and [`Error::InvalidData`] for a negative cutoff
    pub fn shortest_path(
        &self,
        source: &str,
        target: &str,
        cutoff: f64,
    ) -> Result<Option<Path>, Error> {
        validate_cutoff(cutoff)?;
        let source_idx = self.require_node(source)?;
        let target_idx = self.require_node(target)?;

        if source_idx == target_idx {
            return Ok(Some(Path::trivial(self, source_idx)));
        }

        let (ctx, outcome) = label_setting(self, source_idx, Some(target_idx), cutoff);
        debug!(
            "Shortest path {source} -> {target}: {outcome:?} after settling {} nodes",
            ctx.settled_nodes().len()
        );

        match outcome {
            Outcome::Reached => Path::reconstruct(self, &ctx, target_idx).map(Some),
            Outcome::Exhausted | Outcome::CutoffExceeded => Ok(None),
        }
    }

    /// Length of the shortest path, `None` when unreachable within `cutoff`
    ///
    /// # Errors
    ///
    /// Same as [`Network::shortest_path`]
    pub fn shortest_path_distance(
        &self,
        source: &str,
        target: &str,
        cutoff: f64,
    ) -> Result<Option<f64>, Error> {
        Ok(self
            .shortest_path(source, target, cutoff)?
            .map(|path| path.total_distance()))
    }

    /// Distances from `source` to every reachable node (the source included).
    ///
    /// With a positive `cutoff`, nodes farther than `cutoff` are left out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] for an unknown source and
    /// [`Error::InvalidData`] for a negative cutoff
    pub fn shortest_path_all_distances(
        &self,
        source: &str,
        cutoff: f64,
    ) -> Result<HashMap<String, f64>, Error> {
        let ctx = self.shortest_path_tree(source, cutoff)?;
        Ok(ctx
            .settled_distances(self)
            .map(|(node, distance)| (node.id.clone(), distance))
            .collect())
    }

    /// Alias of [`Network::shortest_path_all_distances`]: one omnidirectional
    /// search instead of one search per target
    ///
    /// # Errors
    ///
    /// Same as [`Network::shortest_path_all_distances`]
    pub fn shortest_path_distances(
        &self,
        source: &str,
        cutoff: f64,
    ) -> Result<HashMap<String, f64>, Error> {
        self.shortest_path_all_distances(source, cutoff)
    }

    /// Full search state of an omnidirectional search from `source`
    ///
    /// # Errors
    ///
    /// Same as [`Network::shortest_path_all_distances`]
    pub fn shortest_path_tree(&self, source: &str, cutoff: f64) -> Result<SearchContext, Error> {
        validate_cutoff(cutoff)?;
        let source_idx = self.require_node(source)?;
        let (ctx, _) = label_setting(self, source_idx, None, cutoff);
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Edge, Node, Orientation},
        track::{Observation, Position, Track},
    };

    fn straight(a: Position, b: Position) -> Track {
        Track::with_observations("g", vec![Observation::untimed(a), Observation::untimed(b)])
    }

    /// A(0,0) - B(3,0) - C(3,4), weights 3, 4 and 10 for the direct A-C edge
    fn triangle() -> Network {
        let a = Position::planar(0.0, 0.0);
        let b = Position::planar(3.0, 0.0);
        let c = Position::planar(3.0, 4.0);
        let mut network = Network::new();
        network.add_node(Node::new("A", a)).unwrap();
        network.add_node(Node::new("B", b)).unwrap();
        network.add_node(Node::new("C", c)).unwrap();
        network.add_edge(Edge::new("AB", straight(a, b)), "A", "B").unwrap();
        network.add_edge(Edge::new("BC", straight(b, c)), "B", "C").unwrap();
        network
            .add_edge(Edge::new("AC", straight(a, c)).with_weight(10.0), "A", "C")
            .unwrap();
        network
    }

    #[test]
    fn test_triangle_prefers_detour() {
        let network = triangle();
        let path = network.shortest_path("A", "C", 0.0).unwrap().unwrap();
        assert_eq!(path.total_distance(), 7.0);
        assert_eq!(path.nodes(), &["A", "B", "C"]);
        assert_eq!(path.edge_ids(), &["AB", "AB", "BC", "BC"]);
        assert_eq!(path.distances(), &[0.0, 3.0, 7.0, 7.0]);
    }

    #[test]
    fn test_cutoff_hides_path() {
        let network = triangle();
        assert!(network.shortest_path("A", "C", 5.0).unwrap().is_none());
        assert_eq!(network.shortest_path_distance("A", "C", 7.0).unwrap(), Some(7.0));
    }

    #[test]
    fn test_same_node() {
        let network = triangle();
        for cutoff in [0.0, 0.5, 100.0] {
            let path = network.shortest_path("B", "B", cutoff).unwrap().unwrap();
            assert_eq!(path.len(), 1);
            assert_eq!(path.total_distance(), 0.0);
            assert_eq!(path.track().get(0).unwrap().position, Position::planar(3.0, 0.0));
        }
    }

    #[test]
    fn test_forward_only() {
        let a = Position::planar(0.0, 0.0);
        let b = Position::planar(2.0, 0.0);
        let mut network = Network::new();
        network.add_node(Node::new("A", a)).unwrap();
        network.add_node(Node::new("B", b)).unwrap();
        network
            .add_edge(
                Edge::new("AB", straight(a, b)).with_orientation(Orientation::Forward),
                "A",
                "B",
            )
            .unwrap();
        assert_eq!(network.shortest_path_distance("A", "B", 0.0).unwrap(), Some(2.0));
        assert_eq!(network.shortest_path_distance("B", "A", 0.0).unwrap(), None);
    }

    #[test]
    fn test_unknown_node_and_bad_cutoff() {
        let network = triangle();
        assert!(matches!(
            network.shortest_path("A", "Z", 0.0),
            Err(Error::UnknownNode(_))
        ));
        assert!(matches!(
            network.shortest_path("A", "C", -1.0),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_all_distances() {
        let network = triangle();
        let distances = network.shortest_path_all_distances("A", 0.0).unwrap();
        assert_eq!(distances.len(), 3);
        assert_eq!(distances["A"], 0.0);
        assert_eq!(distances["B"], 3.0);
        assert_eq!(distances["C"], 7.0);

        let within = network.shortest_path_distances("A", 5.0).unwrap();
        assert_eq!(within.len(), 2);
        assert!(!within.contains_key("C"));
    }

    #[test]
    fn test_repeated_queries_do_not_leak_state() {
        let network = triangle();
        let first = network.shortest_path_distance("A", "C", 0.0).unwrap();
        let second = network.shortest_path_distance("C", "A", 0.0).unwrap();
        let third = network.shortest_path_distance("A", "C", 0.0).unwrap();
        assert_eq!(first, Some(7.0));
        assert_eq!(second, Some(7.0));
        assert_eq!(third, first);
    }
}
