//! Test RNG — deterministic `DeterministicRng` implementation for tests.

use ethileo_core::rng::DeterministicRng;

/// An RNG that returns values from a predetermined sequence, wrapping around
/// when it reaches the end. Used where tests need a known check-in token.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        assert!(!values.is_empty(), "SequenceRng needs at least one value");
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let val = self.values[self.index % self.values.len()];
        self.index += 1;
        val.clamp(min, max)
    }
}
