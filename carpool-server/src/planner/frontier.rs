//! Priority queue of nodes awaiting expansion.
//!
//! There is no decrease-key: when a cheaper path to a node is found, a new
//! entry is pushed and the old one is left behind. The search skips entries
//! for nodes it has already finalized.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::rc::Rc;

use ordered_float::OrderedFloat;

use super::node::Node;

/// Equal costs pop in insertion order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    cost: OrderedFloat<f64>,
    seq: u64,
    node: Rc<Node>,
}

/// Min-queue of `(cumulative cost, node)`.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Frontier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, cost: f64, node: Rc<Node>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            cost: OrderedFloat(cost),
            seq,
            node,
        }));
    }

    /// Remove and return the cheapest entry.
    pub(crate) fn pop(&mut self) -> Option<(f64, Rc<Node>)> {
        self.heap
            .pop()
            .map(|Reverse(entry)| (entry.cost.into_inner(), entry.node))
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    /// Iterate over queued nodes, in no particular order.
    #[cfg(test)]
    pub(crate) fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.heap.iter().map(|Reverse(entry)| entry.node.as_ref())
    }

    /// Keep only entries whose node satisfies `keep`.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&Node) -> bool) {
        self.heap.retain(|Reverse(entry)| keep(entry.node.as_ref()));
    }

    /// Drop the more expensive half of the queue, returning what was dropped.
    pub(crate) fn truncate_to_cheaper_half(&mut self) -> Vec<(f64, Rc<Node>)> {
        let mut entries: Vec<Entry> = std::mem::take(&mut self.heap)
            .into_iter()
            .map(|Reverse(entry)| entry)
            .collect();
        entries.sort_unstable();

        let dropped = entries
            .split_off(entries.len() / 2)
            .into_iter()
            .map(|entry| (entry.cost.into_inner(), entry.node))
            .collect();

        self.heap = entries.into_iter().map(Reverse).collect();
        dropped
    }
}
