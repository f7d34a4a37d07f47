use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::queue::QueueId;

// A single transition schedules at most a completion and a follow-up arrival
pub(crate) type EventList = SmallVec<[Event; 2]>;

/// A timestamped action record. Immutable once created; consumed exactly once
/// when it becomes the earliest pending event.
#[derive(Debug, Copy, Clone, derive_new::new)]
pub(crate) struct Event {
    pub(crate) time: f64,
    pub(crate) kind: EventKind,
    pub(crate) queue: QueueId,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, derive_new::new)]
pub(crate) enum EventKind {
    Arrival,
    Departure,
    Passage { dest: QueueId },
}

// Events are totally ordered by time alone; kind and queue identity are not
// comparison keys. The schedule layers an insertion-order tie-break on top.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.total_cmp(&other.time)
    }
}
