//! Single-server queue simulation.
//!
//! The simulation is driven by discrete events: customers arrive according to a Poisson process
//! and are served one at a time by a single server with exponentially distributed service times.
//! Simulated time advances only when the next event is taken out of the [`EventQueue`].
//!
//! # Examples
//!
//! ```
//! # use qsim::{Simulation, SimulationConfig, RngSource};
//! # fn main() -> Result<(), qsim::SimulationError> {
//! let config = SimulationConfig::new(1.0, 0.5).with_seed(17);
//! let mut simulation = Simulation::new(config, RngSource::seeded(17))?;
//! simulation.initialize()?;
//! simulation.run(&mut ())?;
//! let metrics = simulation.metrics()?;
//! assert!(metrics.utilization > 0.0 && metrics.utilization < 1.0);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::default_trait_access,
    clippy::cast_precision_loss
)]

mod config;
pub use config::{SimulationConfig, DEFAULT_MAX_DEPARTURES};

mod error;
pub use error::SimulationError;

mod event;
pub use event::{Event, EventKind, SequenceId};

mod event_queue;
pub use event_queue::{EmptyQueueError, EventQueue};

mod metrics;
pub use metrics::Metrics;

mod random;
pub use random::{exponential, Replay, RngSource, UniformSource};

mod replication;
pub use replication::{replicate, Replications, Spread, Summary};

mod simulation;
pub use simulation::{Simulation, Statistics};

mod trace;
pub use trace::{CsvTrace, LogTrace, TextTrace, Trace, TraceError};
