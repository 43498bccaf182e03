//! Observability sinks receiving one record per processed event.
//!
//! The simulation never reads anything back from a sink; they exist only to produce a
//! human-readable (or machine-readable) history of the run.

use std::io;

use thiserror::Error;

use crate::Event;

/// Logging target of [`LogTrace`] records.
const TRACE_TARGET: &str = "qsim::trace";

/// Error while recording an event.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Error writing a CSV record.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// I/O error of the underlying writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Implementors receive every event processed by the simulation, in processing order.
pub trait Trace {
    /// Records a single processed event.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn record(&mut self, event: &Event) -> Result<(), TraceError>;
}

/// Discards all events.
impl Trace for () {
    fn record(&mut self, _: &Event) -> Result<(), TraceError> {
        Ok(())
    }
}

/// Collects all events in memory.
impl Trace for Vec<Event> {
    fn record(&mut self, event: &Event) -> Result<(), TraceError> {
        self.push(*event);
        Ok(())
    }
}

impl<T: Trace + ?Sized> Trace for &mut T {
    fn record(&mut self, event: &Event) -> Result<(), TraceError> {
        (**self).record(event)
    }
}

/// Records events only if the sink is present.
impl<T: Trace> Trace for Option<T> {
    fn record(&mut self, event: &Event) -> Result<(), TraceError> {
        match self {
            Some(trace) => trace.record(event),
            None => Ok(()),
        }
    }
}

/// Passes each event to both sinks.
impl<A: Trace, B: Trace> Trace for (A, B) {
    fn record(&mut self, event: &Event) -> Result<(), TraceError> {
        self.0.record(event)?;
        self.1.record(event)
    }
}

/// Emits each event as an `info` log record with target `qsim::trace`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTrace;

impl Trace for LogTrace {
    fn record(&mut self, event: &Event) -> Result<(), TraceError> {
        log::info!(target: TRACE_TARGET, "{}", event);
        Ok(())
    }
}

/// Writes one line per event, e.g., `PID: 1  Type: Arrival    Time: 0.693147`.
#[derive(Debug)]
pub struct TextTrace<W> {
    writer: W,
}

impl<W: io::Write> TextTrace<W> {
    /// Constructs a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Trace for TextTrace<W> {
    fn record(&mut self, event: &Event) -> Result<(), TraceError> {
        writeln!(self.writer, "{}", event)?;
        Ok(())
    }
}

/// Writes events as CSV records with the header `kind,time,sequence_id`.
pub struct CsvTrace<W: io::Write> {
    writer: csv::Writer<W>,
}

impl<W: io::Write> CsvTrace<W> {
    /// Constructs a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Flushes buffered records.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn flush(&mut self) -> Result<(), TraceError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes buffered records and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn into_inner(self) -> Result<W, TraceError> {
        self.writer
            .into_inner()
            .map_err(|err| TraceError::Io(err.into_error()))
    }
}

impl<W: io::Write> Trace for CsvTrace<W> {
    fn record(&mut self, event: &Event) -> Result<(), TraceError> {
        self.writer.serialize(event)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{EventKind, SequenceId};

    use rstest::{fixture, rstest};

    #[fixture]
    fn events() -> Vec<Event> {
        vec![
            Event::new(EventKind::Arrival, 0.5, SequenceId::from(1)),
            Event::new(EventKind::Arrival, 0.75, SequenceId::from(2)),
            Event::new(EventKind::Departure, 1.25, SequenceId::from(1)),
        ]
    }

    #[rstest]
    fn test_vec(events: Vec<Event>) {
        let mut trace: Vec<Event> = Vec::new();
        for event in &events {
            trace.record(event).unwrap();
        }
        assert_eq!(trace, events);
    }

    #[rstest]
    fn test_text(events: Vec<Event>) {
        let mut trace = TextTrace::new(Vec::new());
        for event in &events {
            trace.record(event).unwrap();
        }
        let text = String::from_utf8(trace.into_inner()).unwrap();
        assert_eq!(
            text,
            "PID: 1  Type: Arrival    Time: 0.500000\n\
             PID: 2  Type: Arrival    Time: 0.750000\n\
             PID: 1  Type: Departure  Time: 1.250000\n"
        );
    }

    #[rstest]
    fn test_csv(events: Vec<Event>) {
        let mut trace = CsvTrace::new(Vec::new());
        for event in &events {
            trace.record(event).unwrap();
        }
        let text = String::from_utf8(trace.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "kind,time,sequence_id\narrival,0.5,1\narrival,0.75,2\ndeparture,1.25,1\n"
        );
    }

    #[rstest]
    fn test_fan_out(events: Vec<Event>) {
        let mut first: Vec<Event> = Vec::new();
        let mut second: Vec<Event> = Vec::new();
        {
            let mut trace = (&mut first, &mut second);
            for event in &events {
                trace.record(event).unwrap();
            }
        }
        assert_eq!(first, events);
        assert_eq!(second, events);
    }

    #[rstest]
    fn test_optional(events: Vec<Event>) {
        let mut absent: Option<Vec<Event>> = None;
        let mut present: Option<Vec<Event>> = Some(Vec::new());
        for event in &events {
            absent.record(event).unwrap();
            present.record(event).unwrap();
        }
        assert!(absent.is_none());
        assert_eq!(present, Some(events));
    }
}
