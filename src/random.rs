//! Seedable uniform source shared by weight initialization and row shuffling.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Upper bound (exclusive) of the raw integer draw.
const RAW_INT_SCALE: f64 = 100_000.0;

#[derive(Debug, Clone)]
pub struct Random {
    rng: StdRng,
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

impl Random {
    /// Seeds the generator from system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator: two sources built from the same seed produce
    /// the same sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform double in [0, 1).
    pub fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Raw integer draw in [0, 100000).
    pub fn next_int(&mut self) -> usize {
        (self.next_uniform() * RAW_INT_SCALE) as usize
    }

    /// Uniform integer in [0, bound). Returns 0 when `bound` is 0.
    pub fn next_int_below(&mut self, bound: usize) -> usize {
        self.next_int_range(0, bound)
    }

    /// Uniform integer in [lo, hi). Returns `lo` when the range is empty.
    pub fn next_int_range(&mut self, lo: usize, hi: usize) -> usize {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Uniform double in [0, upper).
    pub fn next_double_upto(&mut self, upper: f64) -> f64 {
        self.next_uniform() * upper
    }

    /// Uniform double in [lo, hi).
    pub fn next_double_between(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_uniform()
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle(&mut self, sequence: &mut [usize]) {
        for i in 0..sequence.len() {
            let r = self.next_int_range(i, sequence.len());
            sequence.swap(i, r);
        }
    }

    /// A random permutation of `0..count`.
    pub fn permutation(&mut self, count: usize) -> Vec<usize> {
        let mut sequence: Vec<usize> = (0..count).collect();
        self.shuffle(&mut sequence);
        sequence
    }
}
