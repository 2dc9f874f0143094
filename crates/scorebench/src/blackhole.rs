//! Sink for values produced inside the measured region.

use std::hint::black_box;

/// Consumes values so the optimizer cannot discard the work that produced them.
#[derive(Debug, Default)]
pub struct Blackhole {
    consumed: u64,
}

impl Blackhole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `value` and hides it from the optimizer.
    #[inline]
    pub fn consume<T>(&mut self, value: T) {
        black_box(value);
        self.consumed += 1;
    }

    /// Returns how many values have been consumed.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}
