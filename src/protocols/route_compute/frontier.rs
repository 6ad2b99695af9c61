use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::model::{LinkCost, RouterId};

#[derive(Debug, Clone)]
struct QueueEntry<C> {
    node: RouterId,
    cost: C,
}

impl<C: LinkCost> PartialEq for QueueEntry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<C: LinkCost> Eq for QueueEntry<C> {}

// Reversed so the max-heap pops the cheapest entry, lowest id first on ties.
impl<C: LinkCost> Ord for QueueEntry<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl<C: LinkCost> PartialOrd for QueueEntry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
pub struct DistanceFrontier<C> {
    heap: BinaryHeap<QueueEntry<C>>,
}

impl<C: LinkCost> Default for DistanceFrontier<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: LinkCost> DistanceFrontier<C> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, node: RouterId, cost: C) {
        self.heap.push(QueueEntry { node, cost });
    }

    /// Pops the cheapest entry that `is_stale` does not reject.
    pub fn pop_min<F>(&mut self, mut is_stale: F) -> Option<(RouterId, C)>
    where
        F: FnMut(&RouterId, C) -> bool,
    {
        while let Some(entry) = self.heap.pop() {
            if is_stale(&entry.node, entry.cost) {
                continue;
            }
            return Some((entry.node, entry.cost));
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
