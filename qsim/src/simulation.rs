use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::{
    exponential, Event, EventKind, EventQueue, Metrics, RngSource, SequenceId, SimulationConfig,
    SimulationError, Trace, UniformSource,
};

/// Snapshot of the counters accumulated by a [`Simulation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    /// Time of the most recently processed event.
    pub current_time: f64,
    /// Number of arrivals scheduled so far.
    pub arrivals_scheduled: usize,
    /// Number of departures scheduled so far.
    pub departures_scheduled: usize,
    /// Sequence ID of the departure closing the measurement window.
    pub max_departures: usize,
    /// Total service time consumed within the measurement window.
    pub cumulative_service_time: f64,
    /// Time of the departure closing the measurement window, once processed.
    pub final_departure_time: Option<f64>,
}

/// Single-server, single-queue discrete-event simulation.
///
/// Customers arrive in a Poisson stream and wait in an unbounded line for a single server.
/// Inter-arrival and service times are exponential, drawn lazily from the injected
/// [`UniformSource`]: the service time of a waiting customer is drawn only once the customer
/// reaches the server.
///
/// The measurement window ends at the departure whose sequence ID equals
/// [`SimulationConfig::max_departures`]. The event loop keeps draining events already in the
/// queue until one more departure gets scheduled, but service time generated past the end of
/// the window is not accumulated.
pub struct Simulation<S> {
    config: SimulationConfig,
    source: S,
    queue: EventQueue,
    initialized: bool,
    current_time: f64,
    server_busy: bool,
    queue_length: usize,
    arrivals_scheduled: usize,
    departures_scheduled: usize,
    cumulative_service_time: f64,
    final_departure_time: Option<f64>,
}

impl Simulation<RngSource<ChaCha8Rng>> {
    /// Constructs a simulation drawing from a generator seeded with
    /// [`SimulationConfig::seed`], or from entropy if no seed is given.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] if the configuration is invalid.
    pub fn from_config(config: SimulationConfig) -> Result<Self, SimulationError> {
        let source = match config.seed {
            Some(seed) => RngSource::seeded(seed),
            None => RngSource::from_entropy(),
        };
        Self::new(config, source)
    }
}

impl<S: UniformSource> Simulation<S> {
    /// Constructs a new simulation with the given parameters and source of randomness.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] if the configuration is invalid.
    pub fn new(config: SimulationConfig, source: S) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            queue: EventQueue::default(),
            initialized: false,
            current_time: 0.0,
            server_busy: false,
            queue_length: 0,
            arrivals_scheduled: 0,
            departures_scheduled: 0,
            cumulative_service_time: 0.0,
            final_departure_time: None,
        })
    }

    /// Resets the clock and the server, and schedules the first arrival.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::AlreadyInitialized`] if called more than once.
    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        if self.initialized {
            return Err(SimulationError::AlreadyInitialized);
        }
        self.initialized = true;
        self.current_time = 0.0;
        self.server_busy = false;
        self.queue_length = 0;
        let first_arrival = self.interarrival_time();
        self.schedule_event(EventKind::Arrival, first_arrival);
        log::info!(
            "Initialized simulation with arrival rate {} and mean service time {}",
            self.config.arrival_rate,
            self.config.mean_service_time
        );
        Ok(())
    }

    /// Processes events until the threshold number of departures has been scheduled, passing
    /// each processed event to `trace`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NotInitialized`] if [`Self::initialize`] was not called,
    /// or an error raised by the trace sink.
    pub fn run<T: Trace + ?Sized>(&mut self, trace: &mut T) -> Result<(), SimulationError> {
        if !self.initialized {
            return Err(SimulationError::NotInitialized);
        }
        while !self.is_finished() {
            let event = self.step()?;
            trace.record(&event)?;
        }
        log::info!(
            "Simulation finished at {:.6} after {} arrivals and {} departures",
            self.current_time,
            self.arrivals_scheduled,
            self.departures_scheduled
        );
        Ok(())
    }

    /// Processes the earliest pending event and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NotInitialized`] if [`Self::initialize`] was not called.
    pub fn step(&mut self) -> Result<Event, SimulationError> {
        if !self.initialized {
            return Err(SimulationError::NotInitialized);
        }
        let event = self.queue.pop_earliest()?;
        self.current_time = event.time();
        match event.kind() {
            EventKind::Arrival => self.handle_arrival(),
            EventKind::Departure => {
                if usize::from(event.sequence_id()) == self.config.max_departures
                    && self.final_departure_time.is_none()
                {
                    log::debug!("[{:.6}] Measurement window closed", self.current_time);
                    self.final_departure_time = Some(self.current_time);
                }
                self.handle_departure();
            }
        }
        Ok(event)
    }

    /// Whether the event loop has reached its termination condition.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.departures_scheduled > self.config.max_departures
    }

    fn handle_arrival(&mut self) {
        if self.server_busy {
            self.queue_length += 1;
            log::debug!(
                "[{:.6}] Server busy, {} customer(s) waiting",
                self.current_time,
                self.queue_length
            );
        } else {
            log::debug!("[{:.6}] Server becomes busy", self.current_time);
            self.server_busy = true;
            self.start_service();
        }
        let next_arrival = self.current_time + self.interarrival_time();
        self.schedule_event(EventKind::Arrival, next_arrival);
    }

    fn handle_departure(&mut self) {
        if self.queue_length == 0 {
            log::debug!("[{:.6}] Server becomes idle", self.current_time);
            self.server_busy = false;
        } else {
            self.queue_length -= 1;
            log::debug!(
                "[{:.6}] Serving next customer, {} customer(s) waiting",
                self.current_time,
                self.queue_length
            );
            self.start_service();
        }
    }

    /// Draws the service time of the customer at the server and schedules its departure.
    fn start_service(&mut self) {
        let service_time = exponential(&mut self.source, self.config.mean_service_time);
        if self.final_departure_time.is_none() {
            self.cumulative_service_time += service_time;
        }
        let departure = self.current_time + service_time;
        self.schedule_event(EventKind::Departure, departure);
    }

    fn interarrival_time(&mut self) -> f64 {
        exponential(&mut self.source, self.config.mean_interarrival_time())
    }

    /// Schedules a new event of type `kind` at `time`, assigning it the next sequence ID of its
    /// kind. This is the only place where the counters advance.
    fn schedule_event(&mut self, kind: EventKind, time: f64) {
        let counter = match kind {
            EventKind::Arrival => &mut self.arrivals_scheduled,
            EventKind::Departure => &mut self.departures_scheduled,
        };
        *counter += 1;
        let event = Event::new(kind, time, SequenceId::from(*counter));
        log::trace!("Scheduled {:?}", event);
        self.queue.insert(event);
    }

    /// Computes the performance metrics.
    ///
    /// # Errors
    ///
    /// See [`Metrics::from_statistics`].
    pub fn metrics(&self) -> Result<Metrics, SimulationError> {
        Metrics::from_statistics(&self.statistics())
    }

    /// Takes a snapshot of the accumulated counters.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        Statistics {
            current_time: self.current_time,
            arrivals_scheduled: self.arrivals_scheduled,
            departures_scheduled: self.departures_scheduled,
            max_departures: self.config.max_departures,
            cumulative_service_time: self.cumulative_service_time,
            final_departure_time: self.final_departure_time,
        }
    }

    /// The configuration of this simulation.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The current simulated time.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Whether the server is occupied.
    #[must_use]
    pub fn is_server_busy(&self) -> bool {
        self.server_busy
    }

    /// Number of customers waiting for service, excluding the one being served.
    #[must_use]
    pub fn queue_length(&self) -> usize {
        self.queue_length
    }

    /// Number of arrivals scheduled so far.
    #[must_use]
    pub fn arrivals_scheduled(&self) -> usize {
        self.arrivals_scheduled
    }

    /// Number of departures scheduled so far.
    #[must_use]
    pub fn departures_scheduled(&self) -> usize {
        self.departures_scheduled
    }

    /// Total service time consumed within the measurement window.
    #[must_use]
    pub fn cumulative_service_time(&self) -> f64 {
        self.cumulative_service_time
    }

    /// Time of the departure closing the measurement window, or `None` if not yet processed.
    #[must_use]
    pub fn final_departure_time(&self) -> Option<f64> {
        self.final_departure_time
    }

    /// Number of events waiting in the event queue.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// The earliest pending event, if any.
    #[must_use]
    pub fn next_event(&self) -> Option<&Event> {
        self.queue.peek_earliest()
    }
}
