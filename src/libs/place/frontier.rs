use crate::libs::phylo::NodeId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Min-priority queue of tree nodes.
///
/// Equal priorities pop in the order they were pushed, which makes subtree
/// growth and nearest-leaf searches deterministic.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<Entry>,
    counter: usize,
}

#[derive(Debug)]
struct Entry {
    priority: f64,
    seq: usize,
    node: NodeId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, priority: f64, node: NodeId) {
        self.heap.push(Entry {
            priority,
            seq: self.counter,
            node,
        });
        self.counter += 1;
    }

    pub fn pop(&mut self) -> Option<(f64, NodeId)> {
        self.heap.pop().map(|e| (e.priority, e.node))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
