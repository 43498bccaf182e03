use std::fmt;

use serde::Serialize;

use crate::{SimulationError, Statistics};

/// Performance metrics derived from the counters of a finished simulation.
///
/// The queue metrics follow the M/M/1 relations: with utilization `ρ`, the mean number of
/// customers in the system is `ρ / (1 - ρ)`, and the mean turnaround time follows from
/// Little's law with effective arrival rate `ρ * throughput`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Average time a customer spends in the system, in seconds.
    pub turnaround_time: f64,
    /// Scheduled departures per second.
    pub throughput: f64,
    /// Fraction of time the server was busy, between 0 and 1.
    pub utilization: f64,
    /// Average number of customers waiting in the queue, excluding the one in service.
    pub mean_queue_length: f64,
}

impl Metrics {
    /// Derives the metrics from accumulated statistics.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::MetricsNotReady`] if the final departure has not been processed
    /// yet, and [`SimulationError::Saturated`] if the server never idled.
    pub fn from_statistics(statistics: &Statistics) -> Result<Self, SimulationError> {
        let end = statistics
            .final_departure_time
            .filter(|&time| time > 0.0)
            .ok_or(SimulationError::MetricsNotReady {
                threshold: statistics.max_departures,
            })?;
        // Counts the departure scheduled after the window closed.
        let throughput = statistics.departures_scheduled as f64 / end;
        let utilization = statistics.cumulative_service_time / end;
        if utilization >= 1.0 {
            return Err(SimulationError::Saturated { utilization });
        }
        let in_system = utilization / (1.0 - utilization);
        Ok(Self {
            turnaround_time: in_system / (utilization * throughput),
            throughput,
            utilization,
            mean_queue_length: in_system - utilization,
        })
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Average turnaround time of the processes was {:.4} seconds.",
            self.turnaround_time
        )?;
        writeln!(
            f,
            "Total throughput was {:.4} processes done per second.",
            self.throughput
        )?;
        writeln!(
            f,
            "Average CPU utilization was {:.4}%.",
            self.utilization * 100.0
        )?;
        write!(
            f,
            "Average number of processes in the Ready Queue was {:.4}.",
            self.mean_queue_length
        )
    }
}
