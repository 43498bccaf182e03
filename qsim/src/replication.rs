//! Independent replications of the same simulation.
//!
//! Each replication owns its own engine and random number generator, so replications never
//! share any state.

use std::fmt;

use itertools::{Itertools, MinMaxResult};
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{Metrics, Simulation, SimulationConfig, SimulationError};

/// Iterator running one simulation per item.
///
/// Replication `i` is seeded with `seed + i` if the configuration has a seed, and from entropy
/// otherwise.
pub struct Replications {
    config: SimulationConfig,
    next: usize,
    total: usize,
}

impl Replications {
    /// Constructs an iterator over `total` replications of `config`.
    #[must_use]
    pub fn new(config: SimulationConfig, total: usize) -> Self {
        Self {
            config,
            next: 0,
            total,
        }
    }

    fn run(&self, index: usize) -> Result<Metrics, SimulationError> {
        let mut config = self.config.clone();
        config.seed = config.seed.map(|seed| seed.wrapping_add(index as u64));
        log::debug!("Running replication {} with seed {:?}", index, config.seed);
        let mut simulation = Simulation::from_config(config)?;
        simulation.initialize()?;
        simulation.run(&mut ())?;
        simulation.metrics()
    }
}

impl Iterator for Replications {
    type Item = Result<Metrics, SimulationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next < self.total {
            let result = self.run(self.next);
            self.next += 1;
            Some(result)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Replications {}

/// Runs `replications` independent simulations and collects their metrics.
///
/// # Errors
///
/// Returns the first error encountered by any of the replications.
pub fn replicate(
    config: &SimulationConfig,
    replications: usize,
) -> Result<Vec<Metrics>, SimulationError> {
    Replications::new(config.clone(), replications).collect()
}

/// Mean and range of a single metric across replications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    /// Arithmetic mean.
    pub mean: f64,
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
}

impl Spread {
    fn of<I: Iterator<Item = f64>>(values: I) -> Option<Self> {
        let values = values.collect_vec();
        let (min, max) = match values.iter().copied().map(OrderedFloat).minmax() {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(value) => (value, value),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        Some(Self {
            mean: values.iter().sum::<f64>() / values.len() as f64,
            min: min.into_inner(),
            max: max.into_inner(),
        })
    }
}

/// Aggregated metrics of multiple replications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of aggregated replications.
    pub replications: usize,
    /// See [`Metrics::turnaround_time`].
    pub turnaround_time: Spread,
    /// See [`Metrics::throughput`].
    pub throughput: Spread,
    /// See [`Metrics::utilization`].
    pub utilization: Spread,
    /// See [`Metrics::mean_queue_length`].
    pub mean_queue_length: Spread,
}

impl Summary {
    /// Aggregates `metrics`. Returns `None` if the slice is empty.
    #[must_use]
    pub fn from_metrics(metrics: &[Metrics]) -> Option<Self> {
        Some(Self {
            replications: metrics.len(),
            turnaround_time: Spread::of(metrics.iter().map(|m| m.turnaround_time))?,
            throughput: Spread::of(metrics.iter().map(|m| m.throughput))?,
            utilization: Spread::of(metrics.iter().map(|m| m.utilization))?,
            mean_queue_length: Spread::of(metrics.iter().map(|m| m.mean_queue_length))?,
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary of {} replications:", self.replications)?;
        writeln!(
            f,
            "{:<20} {:>10} {:>10} {:>10}",
            "metric", "mean", "min", "max"
        )?;
        let rows = [
            ("turnaround time [s]", &self.turnaround_time),
            ("throughput [1/s]", &self.throughput),
            ("utilization", &self.utilization),
            ("mean queue length", &self.mean_queue_length),
        ];
        let lines = rows.iter().map(|(name, spread)| {
            format!(
                "{:<20} {:>10.4} {:>10.4} {:>10.4}",
                name, spread.mean, spread.min, spread.max
            )
        });
        write!(f, "{}", lines.format("\n"))
    }
}
