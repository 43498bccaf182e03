use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::Event;

/// Returned when popping from an empty [`EventQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event queue is empty")]
pub struct EmptyQueueError;

/// Heap entry. Events are ordered by time, and events with equal times by insertion order.
#[derive(Debug)]
struct Entry {
    time: OrderedFloat<f64>,
    order: u64,
    event: Event,
}

impl Entry {
    fn key(&self) -> (OrderedFloat<f64>, u64) {
        (self.time, self.order)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Queue of the future events that will be processed in order of time.
///
/// Events with equal times come out in the order they were inserted.
///
/// # Examples
///
/// ```
/// # use qsim::{Event, EventKind, EventQueue, SequenceId};
/// let mut queue = EventQueue::default();
/// queue.insert(Event::new(EventKind::Departure, 2.0, SequenceId::from(1)));
/// queue.insert(Event::new(EventKind::Arrival, 1.0, SequenceId::from(1)));
/// assert_eq!(queue.pop_earliest().unwrap().kind(), EventKind::Arrival);
/// assert_eq!(queue.pop_earliest().unwrap().kind(), EventKind::Departure);
/// assert!(queue.pop_earliest().is_err());
/// ```
#[derive(Debug, Default)]
pub struct EventQueue {
    events: BinaryHeap<Reverse<Entry>>,
    inserted: u64,
}

impl EventQueue {
    /// Inserts `event` into the queue.
    pub fn insert(&mut self, event: Event) {
        self.events.push(Reverse(Entry {
            time: OrderedFloat(event.time()),
            order: self.inserted,
            event,
        }));
        self.inserted += 1;
    }

    /// Removes and returns the earliest event.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueueError`] if there are no events left.
    pub fn pop_earliest(&mut self) -> Result<Event, EmptyQueueError> {
        self.events
            .pop()
            .map(|Reverse(entry)| entry.event)
            .ok_or(EmptyQueueError)
    }

    /// Returns the earliest event without removing it.
    #[must_use]
    pub fn peek_earliest(&self) -> Option<&Event> {
        self.events.peek().map(|Reverse(entry)| &entry.event)
    }

    /// Returns the number of events in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Answers whether the event queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{EventKind, SequenceId};

    use quickcheck_macros::quickcheck;

    fn arrival(time: f64, id: usize) -> Event {
        Event::new(EventKind::Arrival, time, SequenceId::from(id))
    }

    #[test]
    fn test_pop_empty() {
        let mut queue = EventQueue::default();
        assert!(queue.is_empty());
        assert!(queue.peek_earliest().is_none());
        assert_eq!(queue.pop_earliest(), Err(EmptyQueueError));
    }

    #[test]
    fn test_time_order() {
        let mut queue = EventQueue::default();
        queue.insert(arrival(3.0, 1));
        queue.insert(arrival(1.0, 2));
        queue.insert(Event::new(EventKind::Departure, 2.0, SequenceId::from(1)));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek_earliest().map(Event::time), Some(1.0));
        let times: Vec<_> = std::iter::from_fn(|| queue.pop_earliest().ok())
            .map(|e| e.time())
            .collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_are_fifo() {
        let mut queue = EventQueue::default();
        queue.insert(Event::new(EventKind::Departure, 1.0, SequenceId::from(1)));
        queue.insert(arrival(1.0, 1));
        queue.insert(arrival(0.5, 2));
        queue.insert(arrival(1.0, 3));
        let popped: Vec<_> = std::iter::from_fn(|| queue.pop_earliest().ok())
            .map(|e| (e.kind(), usize::from(e.sequence_id())))
            .collect();
        assert_eq!(
            popped,
            vec![
                (EventKind::Arrival, 2),
                (EventKind::Departure, 1),
                (EventKind::Arrival, 1),
                (EventKind::Arrival, 3),
            ]
        );
    }

    #[quickcheck]
    fn pops_in_time_order(times: Vec<u16>) -> bool {
        let mut queue = EventQueue::default();
        for (id, time) in times.iter().enumerate() {
            queue.insert(arrival(f64::from(*time) / 8.0, id));
        }
        let popped: Vec<_> = std::iter::from_fn(|| queue.pop_earliest().ok()).collect();
        popped.len() == times.len()
            && popped.windows(2).all(|w| {
                w[0].time() < w[1].time()
                    || (w[0].time() == w[1].time() && w[0].sequence_id() < w[1].sequence_id())
            })
    }
}
