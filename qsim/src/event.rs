use std::fmt;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// 1-based ordinal of an arriving or departing customer.
///
/// Arrivals and departures are numbered independently, and there is no link between the arrival
/// and the departure of the same customer: the simulation tracks aggregate counts only.
#[derive(
    From,
    Into,
    Debug,
    PartialEq,
    PartialOrd,
    Eq,
    Ord,
    Serialize,
    Deserialize,
    Copy,
    Clone,
    Hash,
    Display,
)]
pub struct SequenceId(usize);

/// Type of event.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A customer arrives at the system.
    Arrival,
    /// A customer finishes service and leaves the system.
    Departure,
}

/// A single event of the simulation.
///
/// Events are created by the scheduling primitive of [`Simulation`](crate::Simulation) and
/// consumed exactly once by its event loop.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    kind: EventKind,
    time: f64,
    sequence_id: SequenceId,
}

impl Event {
    /// Constructs a new event of type `kind` occurring at `time`.
    #[must_use]
    pub fn new(kind: EventKind, time: f64, sequence_id: SequenceId) -> Self {
        Self {
            kind,
            time,
            sequence_id,
        }
    }

    /// Type of the event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Simulated time at which the event occurs.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ordinal of the customer among events of the same kind.
    #[must_use]
    pub fn sequence_id(&self) -> SequenceId {
        self.sequence_id
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PID: {}  Type: {:<11}Time: {:.6}",
            self.sequence_id,
            self.kind.as_ref(),
            self.time
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let arrival = Event::new(EventKind::Arrival, 1.5, SequenceId::from(3));
        assert_eq!(arrival.to_string(), "PID: 3  Type: Arrival    Time: 1.500000");
        let departure = Event::new(EventKind::Departure, 0.25, SequenceId::from(12));
        assert_eq!(
            departure.to_string(),
            "PID: 12  Type: Departure  Time: 0.250000"
        );
    }

    #[test]
    fn test_serialize() {
        let event = Event::new(EventKind::Departure, 2.0, SequenceId::from(7));
        assert_eq!(
            &serde_json::to_string(&event).unwrap(),
            r#"{"kind":"departure","time":2.0,"sequence_id":7}"#
        );
        assert_eq!(EventKind::Arrival.to_string(), "Arrival");
    }
}
