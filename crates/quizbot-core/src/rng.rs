//! Random number generator abstraction for determinism.
//!
//! The bot picks its filler and notification phrases at random. In
//! production this wraps the thread-local RNG; tests inject a sequence.

use rand::Rng;

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}

/// Production RNG backed by `rand::rng()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl DeterministicRng for ThreadRandom {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        rand::rng().random_range(min..=max)
    }

    fn next_f64(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Picks one element of `items` using `rng`, or `None` if `items` is empty.
pub fn choose<'a, T>(rng: &mut dyn DeterministicRng, items: &'a [T]) -> Option<&'a T> {
    let last = u32::try_from(items.len().checked_sub(1)?).unwrap_or(u32::MAX);
    let index = rng.next_u32_range(0, last) as usize;
    items.get(index.min(items.len() - 1))
}
