use serde::{Deserialize, Serialize};

use crate::SimulationError;

/// The simulation stops after the departure with this sequence ID unless configured otherwise.
pub const DEFAULT_MAX_DEPARTURES: usize = 50;

fn default_max_departures() -> usize {
    DEFAULT_MAX_DEPARTURES
}

/// Parameters of a single simulation run. Immutable once the simulation is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Average number of arrivals per second (λ).
    pub arrival_rate: f64,

    /// Average service time in seconds.
    pub mean_service_time: f64,

    /// Sequence ID of the departure closing the measurement window.
    #[serde(default = "default_max_departures")]
    pub max_departures: usize,

    /// Seed of the random number generator. If `None`, the generator is seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Constructs a configuration with the default number of departures and no seed.
    #[must_use]
    pub fn new(arrival_rate: f64, mean_service_time: f64) -> Self {
        Self {
            arrival_rate,
            mean_service_time,
            max_departures: DEFAULT_MAX_DEPARTURES,
            seed: None,
        }
    }

    /// Overrides the number of departures after which the simulation terminates.
    #[must_use]
    pub fn with_max_departures(mut self, max_departures: usize) -> Self {
        self.max_departures = max_departures;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Average time between two consecutive arrivals.
    #[must_use]
    pub fn mean_interarrival_time(&self) -> f64 {
        1.0 / self.arrival_rate
    }

    /// Checks that all parameters are in their valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] if the arrival rate or the service time
    /// is not a positive finite number, or if the number of departures is zero.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(self.arrival_rate) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "arrival rate must be positive, but is {}",
                self.arrival_rate
            )));
        }
        if !positive(self.mean_service_time) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "mean service time must be positive, but is {}",
                self.mean_service_time
            )));
        }
        if self.max_departures == 0 {
            return Err(SimulationError::InvalidConfiguration(String::from(
                "number of departures must be at least 1",
            )));
        }
        Ok(())
    }
}
