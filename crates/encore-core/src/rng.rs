//! Randomness behind queue shuffling.
//!
//! Production draws from the thread-local RNG; tests inject a scripted
//! source so a shuffle produces a known permutation.

use rand::Rng;

/// Source of the index draws a Fisher-Yates shuffle needs.
pub trait DeterministicRng: Send + Sync {
    /// Picks an index in `0..=max`.
    fn index_up_to(&mut self, max: usize) -> usize;
}

/// Production RNG backed by `rand::rng()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRng;

impl DeterministicRng for SystemRng {
    fn index_up_to(&mut self, max: usize) -> usize {
        rand::rng().random_range(0..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_rng_stays_within_inclusive_bound() {
        let mut rng = SystemRng;
        for _ in 0..200 {
            assert!(rng.index_up_to(2) <= 2);
        }
        assert_eq!(rng.index_up_to(0), 0);
    }
}
