//! The agenda: edges waiting to be expanded, best first.

use super::edge::EdgeId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct Entry {
    priority: f64,
    id: EdgeId,
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
    /// Higher priority first; on ties the earlier-inserted edge.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority).then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Debug, Default)]
pub(crate) struct Agenda {
    heap: BinaryHeap<Entry>,
}

impl Agenda {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, id: EdgeId, priority: f64) {
        self.heap.push(Entry { priority, id });
    }

    pub(crate) fn pop(&mut self) -> Option<EdgeId> {
        self.heap.pop().map(|e| e.id)
    }

    pub(crate) fn peek(&self) -> Option<EdgeId> {
        self.heap.peek().map(|e| e.id)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_by_priority_then_insertion_order() {
        let mut agenda = Agenda::new();
        agenda.push(3, 1.0);
        agenda.push(1, 2.0);
        agenda.push(2, 1.0);
        agenda.push(0, -0.5);

        assert_eq!(agenda.len(), 4);
        let order: Vec<EdgeId> = std::iter::from_fn(|| agenda.pop()).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
        assert!(agenda.is_empty());
    }
}
