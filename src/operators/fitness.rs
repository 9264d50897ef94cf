//! Fitness assignment
//!
//! Converts raw performance (lower is better) into selection fitness
//! (higher is better).

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, EvoResult};

/// Fitness assignment method
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessAssignmentMethod {
    /// Baker's linear ranking
    #[default]
    LinearRanking,
}

impl FitnessAssignmentMethod {
    /// Compute the fitness vector for a performance vector
    pub fn assign(&self, performance: &[f64], selective_pressure: f64) -> EvoResult<Vec<f64>> {
        match self {
            Self::LinearRanking => linear_ranking(performance, selective_pressure),
        }
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::LinearRanking => "LinearRanking",
        }
    }
}

/// Linear ranking fitness
///
/// Individuals are ranked from 1 (highest performance) to N (lowest), and
/// `fitness = 2 - sp + 2(sp - 1)(rank - 1)/(N - 1)`, so fitness spans
/// `[2 - sp, sp]` and averages 1.
///
/// Equal performance values share the rank of their first position in the
/// sorted order, so ties all receive the higher rank.
pub fn linear_ranking(performance: &[f64], selective_pressure: f64) -> EvoResult<Vec<f64>> {
    ensure_finite(performance, "Performance")?;

    let n = performance.len();
    let mut sorted = performance.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let sp = selective_pressure;
    let fitness: Vec<f64> = performance
        .iter()
        .map(|p| {
            let position = sorted.iter().position(|s| s == p).unwrap_or(0);
            let rank = (n - position) as f64;
            2.0 - sp + 2.0 * (sp - 1.0) * (rank - 1.0) / (n as f64 - 1.0)
        })
        .collect();

    ensure_finite(&fitness, "Fitness")?;
    Ok(fitness)
}
