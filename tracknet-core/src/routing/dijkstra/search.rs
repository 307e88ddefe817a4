use std::collections::BinaryHeap;

use hashbrown::hash_map::Entry;
use petgraph::{
    Direction,
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use super::{
    context::{Label, SearchContext},
    state::State,
};
use crate::model::Network;

/// How a label-setting search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The target was settled
    Reached,
    /// The frontier emptied without settling the target
    Exhausted,
    /// The closest frontier node lies beyond the cutoff
    CutoffExceeded,
}

/// Neighbors reachable from `node` with respect to circulation direction.
///
/// Incoming edges may be travelled backwards unless they are forward-only,
/// outgoing edges forwards unless they are backward-only. Yields
/// `(edge, neighbor, weight)`.
pub(crate) fn directional_neighbors(
    network: &Network,
    node: NodeIndex,
) -> impl Iterator<Item = (EdgeIndex, NodeIndex, f64)> + '_ {
    let graph = &network.graph;
    let against = graph
        .edges_directed(node, Direction::Incoming)
        .filter(|e| e.weight().orientation.allows_backward())
        .map(|e| (e.id(), e.source(), e.weight().weight));
    let along = graph
        .edges_directed(node, Direction::Outgoing)
        .filter(|e| e.weight().orientation.allows_forward())
        .map(|e| (e.id(), e.target(), e.weight().weight));
    against.chain(along)
}

/// Single-source label-setting search.
///
/// Stops when `target` is settled, when the frontier is exhausted, or (with
/// `cutoff > 0`) as soon as the closest frontier node lies beyond `cutoff`.
/// Nodes beyond the cutoff are never settled.
pub(crate) fn label_setting(
    network: &Network,
    source: NodeIndex,
    target: Option<NodeIndex>,
    cutoff: f64,
) -> (SearchContext, Outcome) {
    let mut ctx = SearchContext::new(network, source);
    let mut heap = BinaryHeap::new();

    ctx.settle(source);
    if target == Some(source) {
        return (ctx, Outcome::Reached);
    }

    // Seed the frontier with the neighbors of the source
    for (edge, neighbor, weight) in directional_neighbors(network, source) {
        relax(&mut ctx, &mut heap, source, edge, neighbor, weight);
    }

    while let Some(State { cost, node }) = heap.pop() {
        if ctx.is_settled(node) {
            continue;
        }
        // Skip if we've found a better path
        if ctx.distance(node).is_some_and(|best| cost > best) {
            continue;
        }

        if cutoff > 0.0 && cost > cutoff {
            log::trace!("Search aborted at distance {cost} beyond cutoff {cutoff}");
            return (ctx, Outcome::CutoffExceeded);
        }

        ctx.settle(node);
        if target == Some(node) {
            return (ctx, Outcome::Reached);
        }

        for (edge, neighbor, weight) in directional_neighbors(network, node) {
            relax(&mut ctx, &mut heap, node, edge, neighbor, cost + weight);
        }
    }

    (ctx, Outcome::Exhausted)
}

fn relax(
    ctx: &mut SearchContext,
    heap: &mut BinaryHeap<State>,
    from: NodeIndex,
    edge: EdgeIndex,
    neighbor: NodeIndex,
    distance: f64,
) {
    if ctx.is_settled(neighbor) {
        return;
    }
    let label = Label {
        distance,
        predecessor_edge: Some(edge),
        predecessor_node: Some(from),
    };

    match ctx.labels.entry(neighbor) {
        Entry::Vacant(entry) => {
            entry.insert(label);
        }
        Entry::Occupied(mut entry) => {
            // Only a strictly shorter path replaces the predecessor
            if distance >= entry.get().distance {
                return;
            }
            *entry.get_mut() = label;
        }
    }
    heap.push(State {
        cost: distance,
        node: neighbor,
    });
}
