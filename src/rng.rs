// src/rng.rs
//! Standard-Normal Draw Sources
//!
//! # Design Philosophy
//!
//! The path simulator asks for one `(steps × paths)` block of independent
//! N(0,1) draws per run. Anything that can fill a slice with such draws is a
//! [`NormalSource`]:
//! 1. **Any `rand::Rng`**: draws come from `rand_distr::StandardNormal`
//! 2. **[`CounterRng`]**: one reproducible stream per path, used by the parallel simulator
//! 3. **[`RecordedDraws`]**: a fixed, replayable sequence (regression tests, zero-noise runs)
//!
//! # Counter-Based RNG
//!
//! Each path gets its own stream keyed by `(seed, stream id)`:
//! - Deterministic mapping: (key, counter) → random value
//! - Same results for any number of worker threads

use crate::error::{SimError, SimResult};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// A source of independent standard-normal draws.
pub trait NormalSource {
    /// Fill `out` with independent N(0,1) draws, or fail without a usable block.
    fn fill_standard_normal(&mut self, out: &mut [f64]) -> SimResult<()>;
}

impl<R: Rng + ?Sized> NormalSource for R {
    fn fill_standard_normal(&mut self, out: &mut [f64]) -> SimResult<()> {
        for z in out.iter_mut() {
            *z = StandardNormal.sample(self);
        }
        Ok(())
    }
}

/// splitmix64 finalizer
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9u64);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111ebu64);
    z ^ (z >> 31)
}

/// Counter-based RNG for reproducible parallel simulations
///
/// # Algorithm
///
/// Uses the splitmix64 finalizer over a per-stream key plus a counter:
/// ```text
/// key    = mix(seed ⊕ mix(stream + γ))
/// z      = key + counter · γ
/// z = (z ⊕ (z >> 30)) * 0xbf58476d1ce4e5b9
/// z = (z ⊕ (z >> 27)) * 0x94d049bb133111eb
/// output = z ⊕ (z >> 31)
/// ```
///
/// Streams for different ids do not overlap as shifted copies of each other,
/// since the id only enters through the key.
#[derive(Debug, Clone)]
pub struct CounterRng {
    key: u64,
    counter: u64,
}

const GOLDEN_GAMMA: u64 = 0x9e3779b97f4a7c15;

impl CounterRng {
    pub fn new(seed: u64, stream: u64) -> Self {
        let key = mix64(seed ^ mix64(stream.wrapping_add(GOLDEN_GAMMA)));
        Self { key, counter: 0 }
    }

    /// Number of 64-bit words consumed so far
    pub fn position(&self) -> u64 {
        self.counter
    }
}

impl RngCore for CounterRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(1);
        mix64(self.key.wrapping_add(self.counter.wrapping_mul(GOLDEN_GAMMA)))
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// RNG factory for reproducible parallel simulations
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Create a counter RNG for a specific path
    pub fn create_counter_rng(&self, path_id: u64) -> CounterRng {
        CounterRng::new(self.base_seed, path_id)
    }

    /// Create a standard RNG for a whole run
    pub fn create_std_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.base_seed)
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A fixed sequence of draws, handed out in order.
///
/// Fails with [`SimError::InsufficientRandomness`] once exhausted; a failed
/// request consumes nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraws {
    draws: Vec<f64>,
    cursor: usize,
}

impl RecordedDraws {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// `len` zero draws: the degenerate source that leaves only drift
    pub fn zeros(len: usize) -> Self {
        Self::new(vec![0.0; len])
    }

    /// Record `len` draws from another source so a run can be replayed.
    pub fn record<S: NormalSource + ?Sized>(source: &mut S, len: usize) -> SimResult<Self> {
        let mut draws = vec![0.0; len];
        source.fill_standard_normal(&mut draws)?;
        Ok(Self::new(draws))
    }

    pub fn remaining(&self) -> usize {
        self.draws.len() - self.cursor
    }

    /// Restart from the first draw
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

impl NormalSource for RecordedDraws {
    fn fill_standard_normal(&mut self, out: &mut [f64]) -> SimResult<()> {
        let available = self.remaining();
        if out.len() > available {
            return Err(SimError::InsufficientRandomness {
                requested: out.len(),
                available,
                reason: "recorded draw sequence exhausted".to_string(),
            });
        }
        let end = self.cursor + out.len();
        out.copy_from_slice(&self.draws[self.cursor..end]);
        self.cursor = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_rng_reproducibility() {
        let factory = RngFactory::new(42);

        let mut rng1 = factory.create_counter_rng(0);
        let mut rng2 = factory.create_counter_rng(0);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
        assert_eq!(rng1.position(), 100);
    }

    #[test]
    fn test_counter_rng_streams_do_not_shift() {
        let factory = RngFactory::new(42);

        let mut rng0 = factory.create_counter_rng(0);
        let mut rng1 = factory.create_counter_rng(1);

        let vals0: Vec<u64> = (0..10).map(|_| rng0.next_u64()).collect();
        let vals1: Vec<u64> = (0..10).map(|_| rng1.next_u64()).collect();

        assert_ne!(vals0, vals1);
        // stream 1 must not be stream 0 offset by one word
        assert_ne!(vals0[1..], vals1[..9]);
    }

    #[test]
    fn test_normal_distribution() {
        let mut rng = RngFactory::new(42).create_counter_rng(0);

        let mut samples = vec![0.0; 10_000];
        rng.fill_standard_normal(&mut samples).unwrap();

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;

        assert!(mean.abs() < 0.05, "Mean should be close to 0, got {}", mean);
        assert!((variance - 1.0).abs() < 0.05, "Variance should be close to 1, got {}", variance);
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = CounterRng::new(7, 3);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert_eq!(rng.position(), 2);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_recorded_draws_exhaustion() {
        let mut draws = RecordedDraws::new(vec![0.5, -0.5, 1.0]);
        let mut out = [0.0; 2];
        draws.fill_standard_normal(&mut out).unwrap();
        assert_eq!(out, [0.5, -0.5]);

        let err = draws.fill_standard_normal(&mut out).unwrap_err();
        match err {
            SimError::InsufficientRandomness { requested, available, .. } => {
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        // failed request consumed nothing
        assert_eq!(draws.remaining(), 1);

        draws.rewind();
        assert_eq!(draws.remaining(), 3);
    }

    #[test]
    fn test_record_replays_source() {
        let mut rng = seed_rng_from_u64(11);
        let mut recorded = RecordedDraws::record(&mut rng, 16).unwrap();

        let mut fresh = seed_rng_from_u64(11);
        let mut expected = [0.0; 16];
        fresh.fill_standard_normal(&mut expected).unwrap();

        let mut replayed = [0.0; 16];
        recorded.fill_standard_normal(&mut replayed).unwrap();
        assert_eq!(replayed, expected);
    }
}
