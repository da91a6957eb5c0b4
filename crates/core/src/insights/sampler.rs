//! Injectable random source for the one intentionally non-deterministic
//! path: similar-product selection. Production uses the thread RNG; tests
//! inject a seeded sampler so diversity behavior stays reproducible.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait Sampler: Send + Sync {
    /// Pick up to `take` distinct indices from `0..len`, uniformly.
    fn pick(&self, len: usize, take: usize) -> Vec<usize>;
}

/// Uniform sampling from the process thread RNG.
#[derive(Debug, Default)]
pub struct ThreadRngSampler;

impl Sampler for ThreadRngSampler {
    fn pick(&self, len: usize, take: usize) -> Vec<usize> {
        let take = take.min(len);
        if take == 0 {
            return Vec::new();
        }
        rand::seq::index::sample(&mut rand::thread_rng(), len, take).into_vec()
    }
}

/// Deterministic sampler for tests and reproduction of reported results.
#[derive(Debug)]
pub struct SeededSampler {
    rng: Mutex<StdRng>,
}

impl SeededSampler {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl Sampler for SeededSampler {
    fn pick(&self, len: usize, take: usize) -> Vec<usize> {
        let take = take.min(len);
        if take == 0 {
            return Vec::new();
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rand::seq::index::sample(&mut *rng, len, take).into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sampler_is_reproducible() {
        let a = SeededSampler::new(7);
        let b = SeededSampler::new(7);
        assert_eq!(a.pick(20, 5), b.pick(20, 5));
    }

    #[test]
    fn pick_caps_at_population_size() {
        let sampler = SeededSampler::new(1);
        let picked = sampler.pick(3, 5);
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|index| *index < 3));
    }

    #[test]
    fn empty_population_yields_empty_pick() {
        assert!(ThreadRngSampler.pick(0, 5).is_empty());
    }
}
