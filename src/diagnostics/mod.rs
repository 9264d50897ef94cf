//! Diagnostics and statistics
//!
//! This module provides the training history buffers, the final summary and
//! the results object returned by a training run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::population::population::Population;
use crate::termination::StoppingCondition;

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), 0 for fewer than two values
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Which history buffers a training run fills
///
/// Unreserved buffers stay empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryReservation {
    pub population: bool,
    pub best_individual: bool,
    pub mean_norm: bool,
    pub standard_deviation_norm: bool,
    pub best_norm: bool,
    pub mean_performance: bool,
    pub standard_deviation_performance: bool,
    pub best_performance: bool,
    pub generalization_performance: bool,
    pub elapsed_time: bool,
}

impl HistoryReservation {
    /// Reserve every buffer
    pub fn all() -> Self {
        Self {
            population: true,
            best_individual: true,
            mean_norm: true,
            standard_deviation_norm: true,
            best_norm: true,
            mean_performance: true,
            standard_deviation_performance: true,
            best_performance: true,
            generalization_performance: true,
            elapsed_time: true,
        }
    }

    /// Reserve nothing
    pub fn none() -> Self {
        Self::default()
    }
}

/// Values observed during one generation step
#[derive(Clone, Debug)]
pub struct GenerationSnapshot<'a> {
    pub population: &'a Population,
    pub best_individual: &'a [f64],
    pub mean_norm: f64,
    pub standard_deviation_norm: f64,
    pub best_norm: f64,
    pub mean_performance: f64,
    pub standard_deviation_performance: f64,
    pub best_performance: f64,
    pub generalization_performance: f64,
    pub elapsed_time: f64,
}

/// Generation-indexed history of a training run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub population: Vec<Population>,
    pub best_individual: Vec<Vec<f64>>,
    pub mean_norm: Vec<f64>,
    pub standard_deviation_norm: Vec<f64>,
    pub best_norm: Vec<f64>,
    pub mean_performance: Vec<f64>,
    pub standard_deviation_performance: Vec<f64>,
    pub best_performance: Vec<f64>,
    pub generalization_performance: Vec<f64>,
    pub elapsed_time: Vec<f64>,
}

impl TrainingHistory {
    /// Allocate the reserved buffers for `maximum_generations + 1` steps
    pub fn reserve(reservation: &HistoryReservation, maximum_generations: usize) -> Self {
        let steps = maximum_generations.saturating_add(1);
        let capacity = |reserved: bool| if reserved { steps } else { 0 };

        Self {
            population: Vec::with_capacity(capacity(reservation.population)),
            best_individual: Vec::with_capacity(capacity(reservation.best_individual)),
            mean_norm: Vec::with_capacity(capacity(reservation.mean_norm)),
            standard_deviation_norm: Vec::with_capacity(capacity(
                reservation.standard_deviation_norm,
            )),
            best_norm: Vec::with_capacity(capacity(reservation.best_norm)),
            mean_performance: Vec::with_capacity(capacity(reservation.mean_performance)),
            standard_deviation_performance: Vec::with_capacity(capacity(
                reservation.standard_deviation_performance,
            )),
            best_performance: Vec::with_capacity(capacity(reservation.best_performance)),
            generalization_performance: Vec::with_capacity(capacity(
                reservation.generalization_performance,
            )),
            elapsed_time: Vec::with_capacity(capacity(reservation.elapsed_time)),
        }
    }

    /// Append one generation to every reserved buffer
    pub fn record(&mut self, reservation: &HistoryReservation, snapshot: &GenerationSnapshot<'_>) {
        if reservation.population {
            self.population.push(snapshot.population.clone());
        }
        if reservation.best_individual {
            self.best_individual.push(snapshot.best_individual.to_vec());
        }
        if reservation.mean_norm {
            self.mean_norm.push(snapshot.mean_norm);
        }
        if reservation.standard_deviation_norm {
            self.standard_deviation_norm
                .push(snapshot.standard_deviation_norm);
        }
        if reservation.best_norm {
            self.best_norm.push(snapshot.best_norm);
        }
        if reservation.mean_performance {
            self.mean_performance.push(snapshot.mean_performance);
        }
        if reservation.standard_deviation_performance {
            self.standard_deviation_performance
                .push(snapshot.standard_deviation_performance);
        }
        if reservation.best_performance {
            self.best_performance.push(snapshot.best_performance);
        }
        if reservation.generalization_performance {
            self.generalization_performance
                .push(snapshot.generalization_performance);
        }
        if reservation.elapsed_time {
            self.elapsed_time.push(snapshot.elapsed_time);
        }
    }
}

/// Scalar values recorded when training stops on a goal or time limit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub mean_norm: f64,
    pub standard_deviation_norm: f64,
    pub best_norm: f64,
    pub mean_performance: f64,
    pub standard_deviation_performance: f64,
    pub best_performance: f64,
    pub elapsed_time: f64,
}

impl From<&GenerationSnapshot<'_>> for FinalSummary {
    fn from(snapshot: &GenerationSnapshot<'_>) -> Self {
        Self {
            mean_norm: snapshot.mean_norm,
            standard_deviation_norm: snapshot.standard_deviation_norm,
            best_norm: snapshot.best_norm,
            mean_performance: snapshot.mean_performance,
            standard_deviation_performance: snapshot.standard_deviation_performance,
            best_performance: snapshot.best_performance,
            elapsed_time: snapshot.elapsed_time,
        }
    }
}

/// Result of a training run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingResults {
    /// Reserved history buffers
    pub history: TrainingHistory,
    /// Best individual found across all generations
    pub best_individual: Vec<f64>,
    /// Performance of the best individual
    pub best_performance: f64,
    /// Generalization performance reported for the best individual
    pub generalization_performance: f64,
    /// Generation steps executed
    pub generations: usize,
    /// Why training stopped
    pub stopping_condition: StoppingCondition,
    /// Final scalars, absent when the generation limit was reached
    pub final_summary: Option<FinalSummary>,
    /// Total training time in seconds
    pub elapsed_time: f64,
}

impl TrainingResults {
    /// Serialize the results as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for TrainingResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Training Results:")?;
        writeln!(f, " - Generations: {}", self.generations)?;
        writeln!(f, " - Best performance: {:.6}", self.best_performance)?;
        writeln!(
            f,
            " - Generalization performance: {:.6}",
            self.generalization_performance
        )?;
        writeln!(f, " - Best individual: {:?}", self.best_individual)?;
        writeln!(f, " - Elapsed time: {:.3}s", self.elapsed_time)?;
        write!(f, " - Stopping condition: {}", self.stopping_condition)?;

        if let Some(summary) = &self.final_summary {
            write!(
                f,
                "\nFinal values:\n \
                 - Mean norm: {:.6}\n \
                 - Standard deviation of norm: {:.6}\n \
                 - Best norm: {:.6}\n \
                 - Mean performance: {:.6}\n \
                 - Standard deviation of performance: {:.6}\n \
                 - Best performance: {:.6}\n \
                 - Elapsed time: {:.3}s",
                summary.mean_norm,
                summary.standard_deviation_norm,
                summary.best_norm,
                summary.mean_performance,
                summary.standard_deviation_performance,
                summary.best_performance,
                summary.elapsed_time
            )?;
        }

        let recorded = [
            ("mean norm", self.history.mean_norm.len()),
            ("best performance", self.history.best_performance.len()),
            ("elapsed time", self.history.elapsed_time.len()),
        ];
        for (name, len) in recorded.iter().filter(|(_, len)| *len > 0) {
            write!(f, "\nHistory of {}: {} entries", name, len)?;
        }

        Ok(())
    }
}

pub mod prelude {
    pub use super::{
        mean, standard_deviation, FinalSummary, GenerationSnapshot, HistoryReservation,
        TrainingHistory, TrainingResults,
    };
}
