//! Recombination operators
//!
//! Every selected individual mates with a random other selected individual
//! and produces two offspring; the offspring replace the whole population.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, OperatorError, PopulationError};
use crate::random;

/// Offspring per selected parent
const OFFSPRING_PER_PARENT: usize = 2;

/// Mate draws allowed per offspring before giving up
const MAX_MATE_DRAWS: usize = 100_000;

/// Recombination method
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecombinationMethod {
    /// One scaling factor for the whole offspring
    Line,
    /// An independent scaling factor per parameter
    #[default]
    Intermediate,
}

impl RecombinationMethod {
    /// Build the next generation's parameter matrix
    ///
    /// `individuals` is row-major with `parameter_count` columns and one row
    /// per entry of `selection`. Scaling factors are drawn from
    /// `[-recombination_size, 1 + recombination_size)` and each offspring
    /// gene is `a * parent1 + (1 - a) * parent2`.
    pub fn recombine<R: Rng + ?Sized>(
        &self,
        individuals: &[f64],
        parameter_count: usize,
        selection: &[bool],
        recombination_size: f64,
        rng: &mut R,
    ) -> EvoResult<Vec<f64>> {
        let size = selection.len();
        if parameter_count == 0 {
            return Err(PopulationError::ZeroParameters.into());
        }
        if individuals.len() != size * parameter_count {
            return Err(PopulationError::LengthMismatch {
                expected: size * parameter_count,
                actual: individuals.len(),
            }
            .into());
        }

        let rows: Vec<&[f64]> = individuals.chunks_exact(parameter_count).collect();
        let mut offspring = Vec::with_capacity(individuals.len());

        for parent1 in (0..size).filter(|&i| selection[i]) {
            for _ in 0..OFFSPRING_PER_PARENT {
                let parent2 = draw_mate(selection, parent1, rng)?;
                let (p1, p2) = (rows[parent1], rows[parent2]);

                match self {
                    Self::Line => {
                        let a = random::uniform(rng, -recombination_size, 1.0 + recombination_size);
                        offspring.extend(p1.iter().zip(p2).map(|(x1, x2)| blend(a, *x1, *x2)));
                    }
                    Self::Intermediate => {
                        for (x1, x2) in p1.iter().zip(p2) {
                            let a = random::uniform(
                                rng,
                                -recombination_size,
                                1.0 + recombination_size,
                            );
                            offspring.push(blend(a, *x1, *x2));
                        }
                    }
                }
            }
        }

        let produced = offspring.len() / parameter_count;
        if produced != size {
            return Err(OperatorError::RecombinationSizeMismatch {
                expected: size,
                actual: produced,
            }
            .into());
        }

        Ok(offspring)
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Intermediate => "Intermediate",
        }
    }
}

/// `a * x1 + (1 - a) * x2`, written so identical parents reproduce exactly
fn blend(a: f64, x1: f64, x2: f64) -> f64 {
    x2 + a * (x1 - x2)
}

/// Draw a selected individual other than `parent1`
fn draw_mate<R: Rng + ?Sized>(selection: &[bool], parent1: usize, rng: &mut R) -> EvoResult<usize> {
    for _ in 0..MAX_MATE_DRAWS {
        let candidate = rng.gen_range(0..selection.len());
        if selection[candidate] && candidate != parent1 {
            return Ok(candidate);
        }
    }

    Err(OperatorError::RetryLimitExceeded {
        operation: "Mate selection",
        limit: MAX_MATE_DRAWS,
    }
    .into())
}
