// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Injectable randomness for delays and smoothing fractions.
//!
//! Every randomized decision in this crate draws from a [`JitterSource`], so
//! tests can pin exact sequences instead of relying on a wall-clock seeded RNG.

use std::ops::Range;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed values.
pub trait JitterSource: Send + Sync {
    /// Uniform integer in `range`. Returns `range.start` when the range is empty.
    fn pick_u64(&self, range: Range<u64>) -> u64;

    /// Uniform float in `range`. Returns `range.start` when the range is empty.
    fn pick_f64(&self, range: Range<f64>) -> f64;
}

/// Production source backed by the thread-local RNG. Lock free.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn pick_u64(&self, range: Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        rand::thread_rng().gen_range(range)
    }

    fn pick_f64(&self, range: Range<f64>) -> f64 {
        if range.is_empty() {
            return range.start;
        }
        rand::thread_rng().gen_range(range)
    }
}

/// Reproducible source seeded from a fixed value.
#[derive(Debug)]
pub struct SeededJitter {
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl JitterSource for SeededJitter {
    fn pick_u64(&self, range: Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        self.with_rng(|rng| rng.gen_range(range))
    }

    fn pick_f64(&self, range: Range<f64>) -> f64 {
        if range.is_empty() {
            return range.start;
        }
        self.with_rng(|rng| rng.gen_range(range))
    }
}

/// Always answers the same relative position inside the requested range.
///
/// `position` 0.0 yields the lower bound, 1.0 the largest value the range can
/// produce (`end - 1` for integers, `end` for floats).
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter {
    position: f64,
}

impl FixedJitter {
    pub fn new(position: f64) -> Self {
        Self {
            position: position.clamp(0.0, 1.0),
        }
    }

    pub fn lowest() -> Self {
        Self::new(0.0)
    }

    pub fn highest() -> Self {
        Self::new(1.0)
    }
}

impl JitterSource for FixedJitter {
    fn pick_u64(&self, range: Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        let span = (range.end - 1 - range.start) as f64;
        range.start + (span * self.position).round() as u64
    }

    fn pick_f64(&self, range: Range<f64>) -> f64 {
        if range.is_empty() {
            return range.start;
        }
        range.start + (range.end - range.start) * self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ranges_return_start() {
        for source in [
            &ThreadRngJitter as &dyn JitterSource,
            &SeededJitter::new(1),
            &FixedJitter::new(0.5),
        ] {
            assert_eq!(source.pick_u64(5..5), 5);
            assert_eq!(source.pick_f64(0.3..0.3), 0.3);
        }
    }

    #[test]
    fn seeded_sources_repeat() {
        let a = SeededJitter::new(42);
        let b = SeededJitter::new(42);
        let xs: Vec<u64> = (0..16).map(|_| a.pick_u64(0..1_000_000)).collect();
        let ys: Vec<u64> = (0..16).map(|_| b.pick_u64(0..1_000_000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn fixed_source_hits_bounds() {
        assert_eq!(FixedJitter::lowest().pick_u64(10..20), 10);
        assert_eq!(FixedJitter::highest().pick_u64(10..20), 19);
        assert_eq!(FixedJitter::new(0.5).pick_f64(0.0..2.0), 1.0);
        assert_eq!(FixedJitter::new(7.0).pick_f64(0.0..1.0), 1.0);
    }

    #[test]
    fn thread_rng_stays_in_range() {
        let source = ThreadRngJitter;
        for _ in 0..1000 {
            let v = source.pick_u64(45_000..90_001);
            assert!((45_000..=90_000).contains(&v));
            let f = source.pick_f64(0.3..0.7);
            assert!((0.3..0.7).contains(&f));
        }
    }
}
