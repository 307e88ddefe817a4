use std::sync::OnceLock;

use hashbrown::HashMap;
use itertools::{Itertools, MinMaxResult};
use log::debug;
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};
use rstar::{RTree, primitives::GeomWithData};

use super::components::{Edge, Node};
use crate::Error;

/// Node location paired with its graph index for nearest-node lookups
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Axis aligned extent of the network geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundingBox {
    fn union(self, other: BoundingBox) -> BoundingBox {
        BoundingBox {
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// Extent as `(xmin, xmax, ymin, ymax)`
    pub fn as_tuple(self) -> (f64, f64, f64, f64) {
        (self.xmin, self.xmax, self.ymin, self.ymax)
    }
}

/// Road/path network whose edges are polylines.
///
/// Edges are stored in the graph from their source to their target node, so
/// an edge is listed in the outgoing edges of its source and the incoming
/// edges of its target. Nodes and edges iterate in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(crate) graph: DiGraph<Node, Edge>,
    node_lookup: HashMap<String, NodeIndex>,
    edge_lookup: HashMap<String, EdgeIndex>,
    rtree: OnceLock<RTree<IndexedPoint>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateNode`] if a node with the same id exists
    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex, Error> {
        if self.node_lookup.contains_key(&node.id) {
            return Err(Error::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_lookup.insert(id, index);
        self.rtree = OnceLock::new();
        Ok(index)
    }

    /// Registers an edge between two existing nodes
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if an endpoint is not part of the
    /// network, [`Error::DuplicateEdge`] if the edge id is taken and
    /// [`Error::InvalidData`] for a negative or non finite weight
    pub fn add_edge(&mut self, edge: Edge, source: &str, target: &str) -> Result<EdgeIndex, Error> {
        let source_idx = self.require_node(source)?;
        let target_idx = self.require_node(target)?;
        if self.edge_lookup.contains_key(&edge.id) {
            return Err(Error::DuplicateEdge(edge.id));
        }
        if !edge.weight.is_finite() || edge.weight < 0.0 {
            return Err(Error::InvalidData(format!(
                "edge {} has invalid weight {}",
                edge.id, edge.weight
            )));
        }

        let id = edge.id.clone();
        let index = self.graph.add_edge(source_idx, target_idx, edge);
        self.edge_lookup.insert(id, index);
        Ok(index)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_lookup.contains_key(id)
    }

    pub fn has_edge(&self, id: &str) -> bool {
        self.edge_lookup.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_lookup.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_lookup.get(id).copied()
    }

    fn edge_index(&self, id: &str) -> Option<EdgeIndex> {
        self.edge_lookup.get(id).copied()
    }

    pub(crate) fn require_node(&self, id: &str) -> Result<NodeIndex, Error> {
        self.node_index(id)
            .ok_or_else(|| Error::UnknownNode(id.to_string()))
    }

    /// Edge by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEdge`] if no edge has this id
    pub fn require_edge(&self, id: &str) -> Result<&Edge, Error> {
        self.edge(id)
            .ok_or_else(|| Error::UnknownEdge(id.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Edges with their source and target nodes
    pub fn edges_with_endpoints(&self) -> impl Iterator<Item = (&Edge, &Node, &Node)> {
        self.graph
            .edge_references()
            .map(|e| (e.weight(), &self.graph[e.source()], &self.graph[e.target()]))
    }

    /// Source and target nodes of an edge
    pub fn endpoints(&self, edge_id: &str) -> Option<(&Node, &Node)> {
        let idx = self.edge_index(edge_id)?;
        let (source, target) = self.graph.edge_endpoints(idx)?;
        Some((&self.graph[source], &self.graph[target]))
    }

    /// Edges whose target is `id`
    pub fn incoming(&self, id: &str) -> Result<Vec<&Edge>, Error> {
        self.adjacent(id, Direction::Incoming)
    }

    /// Edges whose source is `id`
    pub fn outgoing(&self, id: &str) -> Result<Vec<&Edge>, Error> {
        self.adjacent(id, Direction::Outgoing)
    }

    fn adjacent(&self, id: &str, direction: Direction) -> Result<Vec<&Edge>, Error> {
        let idx = self.require_node(id)?;
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        // petgraph walks adjacency lists newest first
        edges.sort_by_key(|e| e.id());
        Ok(edges.into_iter().map(|e| e.weight()).collect())
    }

    /// Nodes lying within `radius` (inclusive) of `node`, the node itself
    /// included
    pub fn select(&self, node: &Node, radius: f64) -> Vec<&Node> {
        self.nodes()
            .filter(|n| n.coord.distance_2d(&node.coord) <= radius)
            .collect()
    }

    /// Closest node to a planar location
    pub fn nearest_node(&self, x: f64, y: f64) -> Option<&Node> {
        let rtree = self.rtree.get_or_init(|| {
            debug!("Building spatial index over {} nodes", self.node_count());
            let points = self
                .graph
                .node_indices()
                .map(|idx| {
                    let coord = self.graph[idx].coord;
                    IndexedPoint::new([coord.x, coord.y], idx)
                })
                .collect();
            RTree::bulk_load(points)
        });
        rtree
            .nearest_neighbor(&[x, y])
            .map(|point| &self.graph[point.data])
    }

    /// Extent of all edge geometries, `None` for a network without edge
    /// points
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.edges()
            .filter_map(|edge| {
                let (xmin, xmax) = extent(edge.geometry.positions().map(|p| p.x))?;
                let (ymin, ymax) = extent(edge.geometry.positions().map(|p| p.y))?;
                Some(BoundingBox {
                    xmin,
                    xmax,
                    ymin,
                    ymax,
                })
            })
            .reduce(BoundingBox::union)
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    match values.minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}
