//! Seeded random deviates for the simulation.
//!
//! Gaussian draws use the Box–Muller transform directly rather than a
//! distribution crate, so the guard in front of the logarithm is explicit
//! and testable.

use std::f64::consts::TAU;

use rand::Rng;

/// Box–Muller transform: two independent uniforms in, one normal deviate out.
///
/// `u1` is clamped away from zero before the logarithm. A generator can
/// legitimately hand back 0.0 from `[0, 1)`, and `ln(0)` would feed a
/// non-finite limit price into every downstream metric.
pub fn box_muller(u1: f64, u2: f64, mu: f64, sigma: f64) -> f64 {
    let u1 = u1.max(f64::MIN_POSITIVE);
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).sin();
    mu + sigma * z
}

/// Gaussian sampling on top of any [`Rng`].
pub trait GaussianRng: Rng {
    /// Draw one deviate from `N(mu, sigma²)`.
    fn gaussian(&mut self, mu: f64, sigma: f64) -> f64
    where
        Self: Sized,
    {
        let u1: f64 = self.random();
        let u2: f64 = self.random();
        box_muller(u1, u2, mu, sigma)
    }
}

impl<R: Rng> GaussianRng for R {}
