//! Deterministic Xorshift64 PRNG.
//!
//! Particle layouts are seeded so the same configuration always produces the
//! same field, which keeps headless snapshots and tests reproducible.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Xorshift64 generator with shifts (13, 7, 17).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Replaces a zero seed, which is a fixed point of xorshift.
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform f64 in [-half, half).
    pub fn next_centered(&mut self, half: f64) -> f64 {
        self.next_range(-half, half)
    }

    /// Uniform point in the square [0, size) × [0, size).
    pub fn next_in_square(&mut self, size: f64) -> DVec2 {
        let x = self.next_range(0.0, size);
        let y = self.next_range(0.0, size);
        DVec2::new(x, y)
    }
}
