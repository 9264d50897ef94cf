//! Selection operators
//!
//! Both methods flag exactly half of the population as recombination
//! parents.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError, OperatorError};
use crate::population::population::best_performance_index;
use crate::random;

/// Roulette spins allowed per individual to be selected
const MAX_SPINS_PER_SELECTION: usize = 10_000;

/// Selection method
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMethod {
    /// Fitness-proportionate selection, one spin per pick
    RouletteWheel,
    /// Evenly spaced pointers over the cumulative fitness
    #[default]
    StochasticUniversalSampling,
}

impl SelectionMethod {
    /// Select `fitness.len() / 2` individuals
    ///
    /// `elitism` only affects roulette-wheel selection, where it guarantees
    /// that the individual with the lowest performance is selected.
    pub fn select<R: Rng + ?Sized>(
        &self,
        fitness: &[f64],
        performance: &[f64],
        elitism: bool,
        rng: &mut R,
    ) -> EvoResult<Vec<bool>> {
        let selection = match self {
            Self::RouletteWheel => {
                let elite = if elitism {
                    best_performance_index(performance)
                } else {
                    None
                };
                roulette_wheel(fitness, elite, rng)?
            }
            Self::StochasticUniversalSampling => stochastic_universal_sampling(fitness, rng)?,
        };

        let expected = fitness.len() / 2;
        let actual = selection.iter().filter(|&&s| s).count();
        if actual != expected {
            return Err(OperatorError::SelectionCountMismatch { expected, actual }.into());
        }

        Ok(selection)
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::RouletteWheel => "RouletteWheel",
            Self::StochasticUniversalSampling => "StochasticUniversalSampling",
        }
    }
}

/// Running sum of fitness, validated to end in a positive finite total
fn cumulative_fitness(fitness: &[f64]) -> EvoResult<Vec<f64>> {
    let cumulative: Vec<f64> = fitness
        .iter()
        .scan(0.0, |sum, &f| {
            *sum += f;
            Some(*sum)
        })
        .collect();

    let total = cumulative.last().copied().unwrap_or(0.0);
    if !total.is_finite() || total <= 0.0 {
        return Err(EvolutionError::Numerical(format!(
            "Total fitness must be positive and finite, got {}",
            total
        )));
    }

    Ok(cumulative)
}

/// Bucket of the cumulative fitness containing `pointer`
///
/// Bucket `i` covers `[cumulative[i - 1], cumulative[i])`; a pointer at or
/// past the total falls into the last bucket.
fn find_bucket(cumulative: &[f64], pointer: f64) -> usize {
    cumulative
        .iter()
        .position(|&c| pointer < c)
        .unwrap_or(cumulative.len() - 1)
}

/// Roulette-wheel selection
///
/// Spins until half of the population is selected, skipping individuals
/// already picked. `elite`, when given, is selected before the first spin.
pub fn roulette_wheel<R: Rng + ?Sized>(
    fitness: &[f64],
    elite: Option<usize>,
    rng: &mut R,
) -> EvoResult<Vec<bool>> {
    let n = fitness.len();
    let target = n / 2;
    let cumulative = cumulative_fitness(fitness)?;
    let total = cumulative[n - 1];

    let mut selection = vec![false; n];
    let mut count = 0;

    if let Some(index) = elite {
        if index < n && target > 0 {
            selection[index] = true;
            count += 1;
        }
    }

    let limit = target.max(1) * MAX_SPINS_PER_SELECTION;
    let mut spins = 0;
    while count < target {
        if spins == limit {
            return Err(OperatorError::RetryLimitExceeded {
                operation: "Roulette wheel selection",
                limit,
            }
            .into());
        }
        spins += 1;

        let pointer = total * random::unit_interval(rng);
        let index = find_bucket(&cumulative, pointer);
        if !selection[index] {
            selection[index] = true;
            count += 1;
        }
    }

    Ok(selection)
}

/// Stochastic universal sampling
///
/// Places `N/2` pointers `total / (N/2)` apart, starting at a single random
/// offset in the first interval. When a pointer lands on an individual that
/// an earlier pointer already took, the next unselected individual (in
/// cyclic index order) is taken instead, so the count is always exact.
pub fn stochastic_universal_sampling<R: Rng + ?Sized>(
    fitness: &[f64],
    rng: &mut R,
) -> EvoResult<Vec<bool>> {
    let n = fitness.len();
    let target = n / 2;
    let mut selection = vec![false; n];
    if target == 0 {
        return Ok(selection);
    }

    let cumulative = cumulative_fitness(fitness)?;
    let spacing = cumulative[n - 1] / target as f64;
    let start = random::unit_interval(rng) * spacing;

    for k in 0..target {
        let pointer = start + k as f64 * spacing;
        let mut index = find_bucket(&cumulative, pointer);
        while selection[index] {
            index = (index + 1) % n;
        }
        selection[index] = true;
    }

    Ok(selection)
}
