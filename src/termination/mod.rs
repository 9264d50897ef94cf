//! Stopping criteria
//!
//! This module decides, after each generation has been evaluated, whether
//! training should stop and why.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why training stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoppingCondition {
    /// Best performance reached the performance goal
    PerformanceGoal,
    /// Mean performance reached the mean performance goal
    MeanPerformanceGoal,
    /// Performance standard deviation reached its goal
    StandardDeviationGoal,
    /// Generalization got worse too many times
    GeneralizationDecreases,
    /// Training ran out of time
    MaximumTime,
    /// The last allowed generation was evaluated
    MaximumGenerations,
}

impl StoppingCondition {
    /// Human-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::PerformanceGoal => "Performance goal reached",
            Self::MeanPerformanceGoal => "Mean performance goal reached",
            Self::StandardDeviationGoal => "Standard deviation of performance goal reached",
            Self::GeneralizationDecreases => "Maximum generalization performance decreases reached",
            Self::MaximumTime => "Maximum training time reached",
            Self::MaximumGenerations => "Maximum number of generations reached",
        }
    }

    /// Whether the final summary values are recorded when stopping here
    ///
    /// Running out of generations ends the loop without a final snapshot.
    pub fn records_final_summary(&self) -> bool {
        !matches!(self, Self::MaximumGenerations)
    }
}

impl fmt::Display for StoppingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Values the stopping criteria are checked against
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationState {
    /// Current generation (0-based)
    pub generation: usize,
    /// Best performance seen so far
    pub best_performance: f64,
    /// Mean performance of the current population
    pub mean_performance: f64,
    /// Standard deviation of the current population's performance
    pub standard_deviation_performance: f64,
    /// Times generalization got worse so far
    pub generalization_decreases: usize,
    /// Seconds since training started
    pub elapsed_time: f64,
}

/// Stopping criteria configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoppingCriteria {
    /// Stop once the best performance is at or below this value
    pub performance_goal: f64,
    /// Stop once the mean performance is at or below this value
    pub mean_performance_goal: f64,
    /// Stop once the performance standard deviation is at or below this value
    pub standard_deviation_performance_goal: f64,
    /// Stop once generalization got worse more often than this
    pub maximum_generalization_evaluation_decreases: usize,
    /// Stop once this many seconds have elapsed
    pub maximum_time: f64,
    /// Index of the last generation to run
    pub maximum_generations_number: usize,
}

impl Default for StoppingCriteria {
    fn default() -> Self {
        Self {
            performance_goal: -1.0e99,
            mean_performance_goal: -1.0e99,
            standard_deviation_performance_goal: 0.0,
            maximum_generalization_evaluation_decreases: 1_000_000,
            maximum_time: 1.0e6,
            maximum_generations_number: 1000,
        }
    }
}

impl StoppingCriteria {
    /// The first criterion met, in priority order
    ///
    /// Goals come before resource limits; the generation limit is checked
    /// last.
    pub fn check(&self, state: &GenerationState) -> Option<StoppingCondition> {
        if state.best_performance <= self.performance_goal {
            Some(StoppingCondition::PerformanceGoal)
        } else if state.mean_performance <= self.mean_performance_goal {
            Some(StoppingCondition::MeanPerformanceGoal)
        } else if state.standard_deviation_performance <= self.standard_deviation_performance_goal
        {
            Some(StoppingCondition::StandardDeviationGoal)
        } else if state.generalization_decreases > self.maximum_generalization_evaluation_decreases
        {
            Some(StoppingCondition::GeneralizationDecreases)
        } else if state.elapsed_time >= self.maximum_time {
            Some(StoppingCondition::MaximumTime)
        } else if state.generation >= self.maximum_generations_number {
            Some(StoppingCondition::MaximumGenerations)
        } else {
            None
        }
    }
}

pub mod prelude {
    pub use super::{GenerationState, StoppingCondition, StoppingCriteria};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_state() -> GenerationState {
        GenerationState {
            generation: 5,
            best_performance: 1.0,
            mean_performance: 2.0,
            standard_deviation_performance: 0.5,
            generalization_decreases: 0,
            elapsed_time: 1.0,
        }
    }

    #[test]
    fn test_no_criterion_met() {
        let criteria = StoppingCriteria::default();
        assert_eq!(criteria.check(&running_state()), None);
    }

    #[test]
    fn test_performance_goal() {
        let criteria = StoppingCriteria {
            performance_goal: 1.0,
            ..Default::default()
        };
        assert_eq!(
            criteria.check(&running_state()),
            Some(StoppingCondition::PerformanceGoal)
        );
    }

    #[test]
    fn test_mean_performance_goal() {
        let criteria = StoppingCriteria {
            mean_performance_goal: 2.5,
            ..Default::default()
        };
        assert_eq!(
            criteria.check(&running_state()),
            Some(StoppingCondition::MeanPerformanceGoal)
        );
    }

    #[test]
    fn test_standard_deviation_goal() {
        let criteria = StoppingCriteria {
            standard_deviation_performance_goal: 0.5,
            ..Default::default()
        };
        assert_eq!(
            criteria.check(&running_state()),
            Some(StoppingCondition::StandardDeviationGoal)
        );
    }

    #[test]
    fn test_generalization_decreases() {
        let criteria = StoppingCriteria {
            maximum_generalization_evaluation_decreases: 2,
            ..Default::default()
        };
        let mut state = running_state();

        state.generalization_decreases = 2;
        assert_eq!(criteria.check(&state), None);

        state.generalization_decreases = 3;
        assert_eq!(
            criteria.check(&state),
            Some(StoppingCondition::GeneralizationDecreases)
        );
    }

    #[test]
    fn test_maximum_time() {
        let criteria = StoppingCriteria {
            maximum_time: 1.0,
            ..Default::default()
        };
        assert_eq!(
            criteria.check(&running_state()),
            Some(StoppingCondition::MaximumTime)
        );
    }

    #[test]
    fn test_maximum_generations() {
        let criteria = StoppingCriteria {
            maximum_generations_number: 5,
            ..Default::default()
        };
        let condition = criteria.check(&running_state());
        assert_eq!(condition, Some(StoppingCondition::MaximumGenerations));
        assert!(!condition.unwrap().records_final_summary());
    }

    #[test]
    fn test_priority_order() {
        let criteria = StoppingCriteria {
            performance_goal: 10.0,
            mean_performance_goal: 10.0,
            standard_deviation_performance_goal: 10.0,
            maximum_generalization_evaluation_decreases: 0,
            maximum_time: 0.0,
            maximum_generations_number: 1,
        };
        let mut state = running_state();
        state.generalization_decreases = 1;
        assert_eq!(
            criteria.check(&state),
            Some(StoppingCondition::PerformanceGoal)
        );

        let criteria = StoppingCriteria {
            performance_goal: -10.0,
            mean_performance_goal: -10.0,
            standard_deviation_performance_goal: -1.0,
            ..criteria
        };
        assert_eq!(
            criteria.check(&state),
            Some(StoppingCondition::GeneralizationDecreases)
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            StoppingCondition::PerformanceGoal.to_string(),
            "Performance goal reached"
        );
        assert!(StoppingCondition::MaximumTime.records_final_summary());
    }
}
