//! Seedable random source for field initialisation.
//!
//! Particle scattering and grain noise draw from a [`RandomSource`] rather
//! than a process-wide generator, so every field can be rebuilt bit-for-bit
//! from its seed. [`Xorshift64`] is the default implementation.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Source of uniformly distributed random numbers.
///
/// Only [`next_u64`](RandomSource::next_u64) is required; the float helpers
/// are derived from it.
pub trait RandomSource {
    /// Returns the next 64 random bits.
    fn next_u64(&mut self) -> u64;

    /// Returns a uniformly distributed f64 in [0, 1).
    ///
    /// Uses the upper 53 bits of `next_u64()` for full mantissa precision.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns a uniformly distributed f64 in [min, max).
    fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns an angle uniformly distributed in [0, 2π).
    fn next_angle(&mut self) -> f64 {
        self.next_f64() * TAU
    }

    /// Returns a uniformly distributed byte.
    fn next_u8(&mut self) -> u8 {
        (self.next_u64() >> 56) as u8
    }
}

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Shift parameters (13, 7, 17). Seed 0 is replaced with a non-zero fallback
/// because all-zeros is a fixed point of the recurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }
}

impl RandomSource for Xorshift64 {
    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        // If this breaks, every recorded scene seeded with 42 renders differently.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_produce_all_zeros() {
        let mut rng = Xorshift64::new(0);
        for _ in 0..3 {
            assert_ne!(rng.next_u64(), 0, "seed=0 guard failed");
        }
    }

    #[test]
    fn two_instances_with_same_seed_produce_identical_sequences() {
        let mut a = Xorshift64::new(42);
        let mut b = Xorshift64::new(42);
        for i in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64(), "sequences diverged at index {i}");
        }
    }

    #[test]
    fn next_angle_stays_below_tau() {
        let mut rng = Xorshift64::new(31337);
        for i in 0..10_000 {
            let a = rng.next_angle();
            assert!((0.0..TAU).contains(&a), "next_angle() = {a} at iteration {i}");
        }
    }

    #[test]
    fn next_u8_covers_both_halves_of_the_byte_range() {
        let mut rng = Xorshift64::new(5);
        let values: Vec<u8> = (0..1000).map(|_| rng.next_u8()).collect();
        assert!(values.iter().any(|&v| v < 64));
        assert!(values.iter().any(|&v| v > 192));
    }

    #[test]
    fn trait_object_draws_from_the_same_stream() {
        let mut direct = Xorshift64::new(9);
        let mut boxed: Box<dyn RandomSource> = Box::new(Xorshift64::new(9));
        for _ in 0..10 {
            assert_eq!(direct.next_f64().to_bits(), boxed.next_f64().to_bits());
        }
    }

    #[test]
    fn serialization_roundtrip_preserves_state() {
        let mut rng = Xorshift64::new(42);
        for _ in 0..50 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: Xorshift64 = serde_json::from_str(&json).unwrap();
        for i in 0..100 {
            assert_eq!(
                rng.next_u64(),
                restored.next_u64(),
                "sequences diverged after deserialization at index {i}"
            );
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f64_in_unit_interval_for_any_seed(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_f64();
                    prop_assert!((0.0..1.0).contains(&v), "next_f64() = {v} for seed {seed}");
                }
            }

            #[test]
            fn next_range_in_bounds_for_any_seed_and_range(
                seed: u64,
                min in -1e6_f64..1e6,
                max in -1e6_f64..1e6,
            ) {
                prop_assume!(min < max);
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_range(min, max);
                    prop_assert!(v >= min && v < max, "next_range({min}, {max}) = {v}");
                }
            }
        }
    }
}
