use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Open01;

use crate::SimulationError;

/// Source of independent draws from the uniform distribution on the open interval `(0, 1)`.
///
/// The simulation derives all its random quantities from these draws, so two simulations
/// reading identical sequences of draws will produce identical results.
pub trait UniformSource {
    /// Returns the next draw, strictly between 0 and 1.
    fn next_uniform(&mut self) -> f64;
}

impl<U: UniformSource + ?Sized> UniformSource for &mut U {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Uniform source backed by a random number generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wraps the given generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<ChaCha8Rng> {
    /// Generator deterministically seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system's entropy source.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> UniformSource for RngSource<R> {
    fn next_uniform(&mut self) -> f64 {
        self.rng.sample(Open01)
    }
}

/// Replays a fixed sequence of draws, starting over once it is exhausted.
///
/// # Examples
///
/// ```
/// # use qsim::{Replay, UniformSource};
/// let mut source = Replay::new(vec![0.25, 0.5]).unwrap();
/// assert_eq!(source.next_uniform(), 0.25);
/// assert_eq!(source.next_uniform(), 0.5);
/// assert_eq!(source.next_uniform(), 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct Replay {
    draws: Vec<f64>,
    position: usize,
}

impl Replay {
    /// Constructs a source replaying `draws`.
    ///
    /// # Errors
    ///
    /// Fails if `draws` is empty or any value falls outside of `(0, 1)`.
    pub fn new(draws: Vec<f64>) -> Result<Self, SimulationError> {
        if draws.is_empty() {
            return Err(SimulationError::InvalidConfiguration(String::from(
                "replayed draws cannot be empty",
            )));
        }
        if let Some(draw) = draws.iter().find(|&&u| !(u > 0.0 && u < 1.0)) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "replayed draw {} is outside of (0, 1)",
                draw
            )));
        }
        Ok(Self { draws, position: 0 })
    }

    /// Number of draws taken so far, including repeated ones.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.position
    }
}

impl UniformSource for Replay {
    fn next_uniform(&mut self) -> f64 {
        let draw = self.draws[self.position % self.draws.len()];
        self.position += 1;
        draw
    }
}

/// Samples the exponential distribution with the given `mean` by inverting its CDF.
pub fn exponential<U: UniformSource + ?Sized>(source: &mut U, mean: f64) -> f64 {
    -mean * source.next_uniform().ln()
}

#[cfg(test)]
mod test {
    use super::*;

    use float_cmp::approx_eq;
    use rstest::rstest;

    #[test]
    fn test_replay_cycles() {
        let mut source = Replay::new(vec![0.1, 0.2, 0.3]).unwrap();
        let draws: Vec<_> = (0..7).map(|_| source.next_uniform()).collect();
        assert_eq!(draws, vec![0.1, 0.2, 0.3, 0.1, 0.2, 0.3, 0.1]);
        assert_eq!(source.consumed(), 7);
    }

    #[rstest(
        draws,
        case(vec![]),
        case(vec![0.0]),
        case(vec![0.5, 1.0]),
        case(vec![-0.5]),
        case(vec![f64::NAN])
    )]
    fn test_replay_invalid(draws: Vec<f64>) {
        assert!(matches!(
            Replay::new(draws),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let mut lhs = RngSource::seeded(42);
        let mut rhs = RngSource::seeded(42);
        for _ in 0..100 {
            let draw = lhs.next_uniform();
            assert!(draw > 0.0 && draw < 1.0);
            assert_eq!(draw.to_bits(), rhs.next_uniform().to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut lhs = RngSource::seeded(1);
        let mut rhs = RngSource::seeded(2);
        let lhs: Vec<_> = (0..10).map(|_| lhs.next_uniform()).collect();
        let rhs: Vec<_> = (0..10).map(|_| rhs.next_uniform()).collect();
        assert_ne!(lhs, rhs);
    }

    #[rstest(draw, mean, case(0.5, 1.0), case(0.1, 0.5), case(0.9, 2.0))]
    fn test_exponential(draw: f64, mean: f64) {
        let mut source = Replay::new(vec![draw]).unwrap();
        assert!(approx_eq!(
            f64,
            exponential(&mut source, mean),
            -mean * draw.ln(),
            ulps = 2
        ));
    }

    #[test]
    fn test_exponential_mean() {
        let mut source = RngSource::seeded(7);
        let n = 100_000;
        let sum: f64 = (0..n).map(|_| exponential(&mut source, 0.5)).sum();
        assert!(approx_eq!(f64, sum / f64::from(n), 0.5, epsilon = 0.01));
    }
}
