//! Scripted shuffle randomness.

use encore_core::rng::DeterministicRng;

/// Always draws index 0, so every Fisher-Yates step swaps with the front.
#[derive(Debug)]
pub struct FrontRng;

impl DeterministicRng for FrontRng {
    fn index_up_to(&mut self, _max: usize) -> usize {
        0
    }
}

/// Replays a scripted list of draws, capping each at the requested maximum.
///
/// Running past the end of the script panics.
#[derive(Debug)]
pub struct SequenceRng {
    draws: std::vec::IntoIter<usize>,
}

impl SequenceRng {
    /// Scripts the given draws.
    #[must_use]
    pub fn new(draws: Vec<usize>) -> Self {
        Self {
            draws: draws.into_iter(),
        }
    }
}

impl DeterministicRng for SequenceRng {
    fn index_up_to(&mut self, max: usize) -> usize {
        let draw = self.draws.next().expect("SequenceRng script exhausted");
        draw.min(max)
    }
}
