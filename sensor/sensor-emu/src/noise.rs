//! Seeded Gaussian noise source.
//!
//! Every sensor owns its own generator, so two sensors built with the same
//! seed produce the same noise and never disturb each other's sequence.

use std::f64::consts::TAU;

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Zero-mean Gaussian noise generator using the Box–Muller transform.
///
/// # Example
///
/// ```
/// use sensor_emu::noise::GaussianNoise;
///
/// let mut a = GaussianNoise::from_seed(7);
/// let mut b = GaussianNoise::from_seed(7);
/// assert_eq!(a.sample(0.5), b.sample(0.5));
/// assert_eq!(a.sample(0.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    rng: StdRng,
    seed: u64,
}

impl GaussianNoise {
    /// Creates a generator with a fixed seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Returns the seed this generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws one standard-normal value: `sqrt(-2 ln u1) * sin(2π u2)`.
    pub fn standard(&mut self) -> f64 {
        // u1 in (0, 1] keeps ln finite.
        let u1 = 1.0 - self.rng.gen_range(0.0..1.0_f64);
        let u2 = self.rng.gen_range(0.0..1.0_f64);
        (-2.0 * u1.ln()).sqrt() * (TAU * u2).sin()
    }

    /// Draws one value with the given standard deviation.
    ///
    /// A non-positive deviation returns zero without consuming randomness.
    pub fn sample(&mut self, std_dev: f64) -> f64 {
        if std_dev > 0.0 {
            self.standard() * std_dev
        } else {
            0.0
        }
    }

    /// Draws three independent values, one per axis.
    pub fn vector(&mut self, std_dev: f64) -> Vector3<f64> {
        Vector3::new(
            self.sample(std_dev),
            self.sample(std_dev),
            self.sample(std_dev),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;

    fn stats(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var.sqrt())
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = GaussianNoise::from_seed(42);
        let mut b = GaussianNoise::from_seed(42);
        for _ in 0..100 {
            assert_eq!(a.standard(), b.standard());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = GaussianNoise::from_seed(1);
        let mut b = GaussianNoise::from_seed(2);
        let same = (0..32).filter(|_| a.standard() == b.standard()).count();
        assert!(same < 32);
    }

    #[test]
    fn draws_are_not_repeated() {
        let mut noise = GaussianNoise::from_seed(3);
        let first = noise.sample(1.0);
        let second = noise.sample(1.0);
        assert_ne!(first, second);
    }

    #[test]
    fn moments_match_configuration() {
        let mut noise = GaussianNoise::from_seed(1234);
        let values: Vec<f64> = (0..20_000).map(|_| noise.sample(0.3)).collect();
        let (mean, std) = stats(&values);

        assert!(mean.abs() < 0.01, "mean {mean}");
        assert!((std - 0.3).abs() < 0.3 * 0.05, "std {std}");
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn zero_deviation_is_silent() {
        let mut noise = GaussianNoise::from_seed(9);
        let mut reference = GaussianNoise::from_seed(9);
        assert_eq!(noise.vector(0.0), Vector3::zeros());
        assert_eq!(noise.standard(), reference.standard());
    }

    #[test]
    fn vector_axes_are_independent() {
        let mut noise = GaussianNoise::from_seed(5);
        let v = noise.vector(1.0);
        assert_ne!(v.x, v.y);
        assert_ne!(v.y, v.z);
        assert_eq!(noise.seed(), 5);
    }
}
