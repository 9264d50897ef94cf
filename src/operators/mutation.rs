//! Mutation operators
//!
//! Additive per-parameter perturbations applied in place.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::random;

/// Mutation method
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationMethod {
    /// Add `normal(0, range)` noise
    #[default]
    Normal,
    /// Add `uniform(-range, range)` noise
    Uniform,
}

impl MutationMethod {
    /// Perturb each parameter with probability `rate`
    ///
    /// `individuals` may be a single individual or a whole row-major
    /// population; every entry is treated independently.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        individuals: &mut [f64],
        rate: f64,
        range: f64,
        rng: &mut R,
    ) {
        for gene in individuals.iter_mut() {
            if random::unit_interval(rng) < rate {
                *gene += match self {
                    Self::Normal => random::normal(rng, 0.0, range),
                    Self::Uniform => random::uniform(rng, -range, range),
                };
            }
        }
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Uniform => "Uniform",
        }
    }
}
