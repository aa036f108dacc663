// crates/apo_core/src/rng.rs
//
// Seeded noise source for the Monte Carlo stage (the only randomness in the engine).
//
// • The deterministic scoring path never sees this type; only the uncertainty
//   estimator receives a `&mut impl NoiseSource`.
// • No OS entropy. Explicit seeding and word-index accounting keep runs
//   reproducible across platforms.
// • Gaussian draws use Box–Muller over two uniform draws in (0, 1].

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Source of standard-normal noise. Implemented by `NoiseRng`; tests may
/// substitute a scripted source.
pub trait NoiseSource {
    /// Uniform draw in the half-open interval (0, 1].
    fn next_unit(&mut self) -> f64;

    /// One N(0, 1) draw.
    fn standard_normal(&mut self) -> f64 {
        let u1 = self.next_unit();
        let u2 = self.next_unit();
        (-2.0 * u1.ln()).sqrt() * (2.0 * core::f64::consts::PI * u2).cos()
    }

    /// One N(mean, sigma²) draw. `sigma == 0` still consumes the underlying draws.
    fn gaussian(&mut self, mean: f64, sigma: f64) -> f64 {
        mean + sigma * self.standard_normal()
    }
}

/// Deterministic RNG for Monte Carlo noise.
///
/// Internally ChaCha20 with an explicit 32-byte seed derived from a 64-bit
/// seed (little-endian bytes in the first 8 positions; the rest 0).
#[derive(Debug, Clone)]
pub struct NoiseRng {
    rng: ChaCha20Rng,
    words_consumed: u128,
}

impl NoiseRng {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            words_consumed: 0,
        }
    }

    /// Total number of 64-bit words consumed so far (saturating).
    #[inline]
    pub fn words_consumed(&self) -> u128 {
        self.words_consumed
    }

    /// This is the only place where the counter is advanced.
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }
}

impl NoiseSource for NoiseRng {
    /// Top 53 bits of one word, shifted into (0, 1] so `ln` stays finite.
    #[inline]
    fn next_unit(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
        ((self.next_u64() >> 11) as f64 + 1.0) * SCALE
    }
}
