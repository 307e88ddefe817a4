use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

/// Frontier entry of the label-setting search
#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) cost: f64,
    pub(super) node: NodeIndex,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap),
        // equal costs pop the oldest node first
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::*;

    #[test]
    fn test_heap_pops_cheapest_first() {
        let mut heap = BinaryHeap::new();
        for (cost, node) in [(3.0, 0), (1.0, 1), (2.0, 2), (1.0, 3)] {
            heap.push(State {
                cost,
                node: NodeIndex::new(node),
            });
        }
        let order: Vec<_> = std::iter::from_fn(|| heap.pop())
            .map(|s| s.node.index())
            .collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }
}
