use thiserror::Error;

use crate::{EmptyQueueError, TraceError};

/// Errors that can terminate a simulation.
///
/// None of them is recoverable within a single run: the simulation is a deterministic batch
/// computation, so the caller is expected to report the error and exit.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Parameters are out of range, e.g., non-positive arrival rate or service time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The event queue ran dry. Each arrival schedules the next one, so this is a bug.
    #[error("internal invariant violated: {0}")]
    EmptyQueue(#[from] EmptyQueueError),

    /// [`run`](crate::Simulation::run) or [`step`](crate::Simulation::step) was called before
    /// [`initialize`](crate::Simulation::initialize).
    #[error("simulation has not been initialized")]
    NotInitialized,

    /// [`initialize`](crate::Simulation::initialize) was called more than once.
    #[error("simulation has already been initialized")]
    AlreadyInitialized,

    /// Metrics were requested before the departure closing the measurement window.
    #[error("metrics are not available until departure #{threshold} has been processed")]
    MetricsNotReady {
        /// Sequence ID of the departure closing the measurement window.
        threshold: usize,
    },

    /// The server was busy for the entire measurement window and the queue metrics diverge.
    #[error("server is saturated (utilization = {utilization}); queue metrics are undefined")]
    Saturated {
        /// Observed utilization.
        utilization: f64,
    },

    /// Failed to pass an event to the trace sink.
    #[error("failed to record event trace")]
    Trace(#[from] TraceError),
}
