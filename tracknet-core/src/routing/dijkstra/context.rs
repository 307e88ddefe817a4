use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::model::{Network, Node};

/// Tentative distance and predecessor of a reached node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label {
    pub distance: f64,
    pub predecessor_edge: Option<EdgeIndex>,
    pub predecessor_node: Option<NodeIndex>,
}

/// Per-query search state.
///
/// Each query owns a fresh context, so the network itself is never mutated
/// by a search and can be shared between concurrent queries. A node without
/// a label is unvisited; a labelled node is on the frontier until settled.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub(super) source: NodeIndex,
    pub(super) labels: HashMap<NodeIndex, Label>,
    pub(super) settled: FixedBitSet,
    /// Settled nodes in settlement order
    pub(super) order: Vec<NodeIndex>,
}

impl SearchContext {
    pub(super) fn new(network: &Network, source: NodeIndex) -> Self {
        let mut labels = HashMap::new();
        labels.insert(
            source,
            Label {
                distance: 0.0,
                predecessor_edge: None,
                predecessor_node: None,
            },
        );
        Self {
            source,
            labels,
            settled: FixedBitSet::with_capacity(network.node_count()),
            order: Vec::new(),
        }
    }

    pub(super) fn settle(&mut self, node: NodeIndex) {
        self.settled.insert(node.index());
        self.order.push(node);
    }

    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn label(&self, node: NodeIndex) -> Option<&Label> {
        self.labels.get(&node)
    }

    /// Tentative distance, `None` while unvisited
    pub fn distance(&self, node: NodeIndex) -> Option<f64> {
        self.labels.get(&node).map(|label| label.distance)
    }

    pub fn is_settled(&self, node: NodeIndex) -> bool {
        self.settled.contains(node.index())
    }

    /// Settled nodes in the order they were settled, the source first
    pub fn settled_nodes(&self) -> &[NodeIndex] {
        &self.order
    }

    /// Settled nodes with their final distances, resolved against `network`
    pub fn settled_distances<'a>(
        &'a self,
        network: &'a Network,
    ) -> impl Iterator<Item = (&'a Node, f64)> + 'a {
        self.order.iter().filter_map(move |&idx| {
            let label = self.labels.get(&idx)?;
            Some((&network.graph[idx], label.distance))
        })
    }
}
