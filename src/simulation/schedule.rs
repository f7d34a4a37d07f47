use std::cmp::Ordering;
use std::collections::BinaryHeap;

use delegate::delegate;

use super::event::Event;

/// Min-priority queue over events, keyed by time. Events pushed at the same
/// timestamp pop in insertion order, which keeps runs reproducible.
#[derive(Debug, Default)]
pub(crate) struct Schedule {
    inner: BinaryHeap<Scheduled>,
    seq: u64,
}

impl Schedule {
    pub(crate) fn push(&mut self, event: Event) {
        let seq = self.seq;
        self.seq += 1;
        self.inner.push(Scheduled { event, seq });
    }

    pub(crate) fn pop(&mut self) -> Option<Event> {
        self.inner.pop().map(|s| s.event)
    }

    delegate! {
        to self.inner {
            pub(crate) fn is_empty(&self) -> bool;
            pub(crate) fn len(&self) -> usize;
        }
    }
}

#[derive(Debug)]
struct Scheduled {
    event: Event,
    seq: u64,
}

// Reversed so that `BinaryHeap`'s max-heap pops the earliest time first, and
// the lowest sequence number among equal times.
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .event
            .cmp(&self.event)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}
