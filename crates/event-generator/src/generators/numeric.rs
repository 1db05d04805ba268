//! Numeric value generators.

use rand::Rng;

/// Generate a random integer in the given range (inclusive).
pub fn generate_integer<R: Rng>(rng: &mut R, min: i64, max: i64) -> String {
    rng.random_range(min..=max).to_string()
}

/// Generate a random float in the given range (inclusive).
pub fn generate_float<R: Rng>(rng: &mut R, min: f64, max: f64) -> String {
    rng.random_range(min..=max).to_string()
}
