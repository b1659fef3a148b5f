// src/optimizer/sampler.rs - Clamped normal sampling of candidate velocities

use rand::Rng;
use std::f64::consts::PI;

/// Draws velocities from a normal distribution around a target mean.
///
/// Samples use the Box–Muller transform over the wrapped random source and are clamped to
/// `mean ± clamp_range`. Seeding the source makes the whole search reproducible.
#[derive(Debug, Clone)]
pub struct GaussianSampler<R> {
    rng: R,
    std_dev: f64,
    clamp_range: f64,
}

impl<R: Rng> GaussianSampler<R> {
    pub fn new(rng: R, std_dev: f64, clamp_range: f64) -> Self {
        Self {
            rng,
            std_dev,
            clamp_range: clamp_range.abs(),
        }
    }

    pub fn next_gaussian(&mut self, mean: f64) -> f64 {
        // both in (0, 1] so the logarithm stays finite
        let u1 = 1.0 - self.rng.random::<f64>();
        let u2 = 1.0 - self.rng.random::<f64>();
        let standard_normal = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin();
        let sample = mean + self.std_dev * standard_normal;
        sample.clamp(mean - self.clamp_range, mean + self.clamp_range)
    }
}
