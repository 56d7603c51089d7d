//! Seeded random stream
//!
//! A `RandomStream` is the single source of randomness of a simulation run. It
//! is passed explicitly through tree growth and character evolution so that a
//! run is fully determined by its seed. Any hashable seed value (text, integer
//! or float) is mapped to the generator state through SHA-256, which makes the
//! produced sequences identical on every platform. Without a seed, the stream
//! is initialized from system entropy.
//!
//! Streams can be derived by name from the seed of another stream. Derived
//! streams are independent of the draws already consumed from their parent,
//! which keeps phases like labeling from perturbing the topology.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Gamma, Poisson};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, SimulationError};

/// Seed value of a random stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl Seed {
    fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        match self {
            Seed::Integer(value) => {
                hasher.update(b"int:");
                hasher.update(value.to_le_bytes());
            }
            Seed::Float(value) => {
                hasher.update(b"float:");
                hasher.update(value.to_string().as_bytes());
            }
            Seed::Text(value) => {
                hasher.update(b"str:");
                hasher.update(value.as_bytes());
            }
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        bytes
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Seed::Integer(value) => write!(f, "{value}"),
            Seed::Float(value) => write!(f, "{value}"),
            Seed::Text(value) => write!(f, "{value}"),
        }
    }
}

/// Read in the same order as a YAML seed: integer, then finite number,
/// then text.
impl FromStr for Seed {
    type Err = Infallible;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        if let Ok(integer) = value.parse::<u64>() {
            return Ok(Seed::Integer(integer));
        }
        Ok(match value.parse::<f64>() {
            Ok(float) if float.is_finite() => Seed::Float(float),
            _ => Seed::Text(value.to_string()),
        })
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Seed::Text(value.to_string())
    }
}

impl From<String> for Seed {
    fn from(value: String) -> Self {
        Seed::Text(value)
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Seed::Integer(value)
    }
}

impl From<f64> for Seed {
    fn from(value: f64) -> Self {
        Seed::Float(value)
    }
}

#[derive(Clone, Debug)]
pub struct RandomStream {
    root: [u8; 32],
    rng: ChaCha8Rng,
}

impl RandomStream {
    /// Create a stream from an optional seed, falling back to system entropy.
    pub fn new(seed: Option<&Seed>) -> Self {
        match seed {
            Some(seed) => Self::from_root(seed.digest()),
            None => Self::from_entropy(),
        }
    }

    pub fn from_seed(seed: impl Into<Seed>) -> Self {
        Self::from_root(seed.into().digest())
    }

    pub fn from_entropy() -> Self {
        Self::from_root(rand::rng().random())
    }

    fn from_root(root: [u8; 32]) -> Self {
        Self {
            root,
            rng: ChaCha8Rng::from_seed(root),
        }
    }

    /// Derive an independent stream keyed by this stream's seed and `name`.
    ///
    /// The derived stream does not depend on how many values were already
    /// drawn from `self`.
    pub fn derive(&self, name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.root);
        hasher.update(b"/");
        hasher.update(name.as_bytes());
        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Self::from_root(root)
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Waiting time of a Poisson process with the given rate.
    pub fn exponential(&mut self, rate: f64) -> Result<f64> {
        let distribution = Exp::new(rate).map_err(|err| {
            SimulationError::invalid(format!("exponential rate {rate}: {err}"))
        })?;
        Ok(distribution.sample(&mut self.rng))
    }

    /// Poisson draw; a zero expectation yields zero without consuming randomness.
    pub fn poisson(&mut self, lambda: f64) -> Result<u64> {
        if lambda == 0. {
            return Ok(0);
        }
        let distribution = Poisson::new(lambda).map_err(|err| {
            SimulationError::invalid(format!("poisson expectation {lambda}: {err}"))
        })?;
        let draw: f64 = distribution.sample(&mut self.rng);
        Ok(draw as u64)
    }

    /// Gamma draw with shape `k` and scale `theta`; degenerate parameters yield zero
    /// without consuming randomness.
    pub fn gamma(&mut self, shape: f64, scale: f64) -> Result<f64> {
        if shape == 0. || scale == 0. {
            return Ok(0.);
        }
        let distribution = Gamma::new(shape, scale).map_err(|err| {
            SimulationError::invalid(format!("gamma shape {shape}, scale {scale}: {err}"))
        })?;
        Ok(distribution.sample(&mut self.rng))
    }

    /// Uniform index in `0..upper`. `upper` must be positive.
    pub fn index(&mut self, upper: usize) -> usize {
        self.rng.random_range(0..upper)
    }

    /// `amount` distinct indices in `0..length`, in sampling order.
    pub fn sample_indices(&mut self, length: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, length, amount).into_vec()
    }

    /// Uniform choice from a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.index(items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(stream: &mut RandomStream) -> Vec<f64> {
        (0..16).map(|_| stream.uniform()).collect()
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomStream::from_seed("t1");
        let mut b = RandomStream::from_seed("t1");
        assert_eq!(draws(&mut a), draws(&mut b));
        assert_eq!(a.exponential(2.).unwrap(), b.exponential(2.).unwrap());
        assert_eq!(a.poisson(3.5).unwrap(), b.poisson(3.5).unwrap());
        assert_eq!(a.gamma(5., 1.).unwrap(), b.gamma(5., 1.).unwrap());
        assert_eq!(a.index(17), b.index(17));
    }

    #[test]
    fn seed_kinds_are_distinct() {
        let mut text = RandomStream::from_seed("1");
        let mut integer = RandomStream::from_seed(1u64);
        let mut float = RandomStream::from_seed(1.0f64);
        let text_draws = draws(&mut text);
        assert_ne!(text_draws, draws(&mut integer));
        assert_ne!(text_draws, draws(&mut float));
    }

    #[test]
    fn parse_seed() {
        assert_eq!("42".parse::<Seed>().unwrap(), Seed::Integer(42));
        assert_eq!("myseed".parse::<Seed>().unwrap(), Seed::Text("myseed".into()));
        assert_eq!("4.2".parse::<Seed>().unwrap(), Seed::Float(4.2));
        assert_eq!("-3".parse::<Seed>().unwrap(), Seed::Float(-3.));
        assert_eq!("inf".parse::<Seed>().unwrap(), Seed::Text("inf".into()));
    }

    #[test]
    fn parsed_and_yaml_seeds_agree() {
        for value in ["42", "4.2", "-3", "0.5", "uppsala"] {
            let parsed: Seed = value.parse().unwrap();
            let read: Seed = serde_yaml::from_str(value).unwrap();
            assert_eq!(parsed, read, "{value}");
            assert_eq!(
                RandomStream::from_seed(parsed).uniform(),
                RandomStream::from_seed(read).uniform()
            );
        }
    }

    #[test]
    fn read_seed_from_yaml() {
        let integer: Seed = serde_yaml::from_str("12345").unwrap();
        let float: Seed = serde_yaml::from_str("0.5").unwrap();
        let text: Seed = serde_yaml::from_str("uppsala").unwrap();
        assert_eq!(integer, Seed::Integer(12345));
        assert_eq!(float, Seed::Float(0.5));
        assert_eq!(text, Seed::Text("uppsala".into()));
    }

    #[test]
    fn derived_streams_ignore_parent_draws() {
        let fresh = RandomStream::from_seed("myseed");
        let mut used = RandomStream::from_seed("myseed");
        draws(&mut used);

        let mut a = fresh.derive("labels");
        let mut b = used.derive("labels");
        assert_eq!(draws(&mut a), draws(&mut b));

        let mut c = fresh.derive("sampling");
        let mut d = fresh.derive("labels");
        assert_ne!(draws(&mut c), draws(&mut d));
    }

    #[test]
    fn degenerate_draws_consume_nothing() {
        let mut a = RandomStream::from_seed(7u64);
        let mut b = RandomStream::from_seed(7u64);
        assert_eq!(a.poisson(0.).unwrap(), 0);
        assert_eq!(a.gamma(0., 1.).unwrap(), 0.);
        assert_eq!(a.gamma(1., 0.).unwrap(), 0.);
        assert_eq!(a.uniform(), b.uniform());
    }

    #[test]
    fn invalid_parameters() {
        let mut stream = RandomStream::from_seed(7u64);
        assert!(matches!(
            stream.exponential(-1.),
            Err(SimulationError::InvalidParameters(_))
        ));
        assert!(stream.poisson(-1.).is_err());
        assert!(stream.gamma(-1., 1.).is_err());
    }

    #[test]
    fn sample_indices_are_distinct() {
        let mut stream = RandomStream::from_seed(3u64);
        let mut indices = stream.sample_indices(10, 4);
        indices.sort();
        indices.dedup();
        assert_eq!(indices.len(), 4);
        assert!(indices.iter().all(|&i| i < 10));
    }
}
