//! Random deviates
//!
//! Uniform and normal deviates drawn from any [`rand::Rng`]. The normal
//! deviate uses the Box-Muller transform so that results depend only on the
//! underlying uniform stream.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Open01};

/// Uniform deviate in `[0, 1)`
pub fn unit_interval<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Uniform deviate in `[min, max)`
///
/// Linear transform of a `[0, 1)` draw, so `min == max` returns `min` and
/// `min > max` is tolerated (the interval is simply reversed).
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    min + (max - min) * unit_interval(rng)
}

/// Normal deviate with the given mean and standard deviation
///
/// Box-Muller: `mean + sd * sqrt(-2 ln u1) * sin(2 pi u2)`, with `u1` drawn
/// from the open interval so the logarithm is always finite.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, standard_deviation: f64) -> f64 {
    let u1: f64 = Open01.sample(rng);
    let u2 = unit_interval(rng);

    mean + standard_deviation * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin()
}
