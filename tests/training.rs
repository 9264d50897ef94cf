//! End-to-end training scenarios

use std::sync::atomic::{AtomicUsize, Ordering};

use evotrain::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Counts evaluations so repeated calls can be compared
struct CountingSumSquares {
    inner: SumSquares,
    evaluations: AtomicUsize,
}

impl CountingSumSquares {
    fn new(dimension: usize) -> Self {
        Self {
            inner: SumSquares::new(dimension),
            evaluations: AtomicUsize::new(0),
        }
    }
}

impl PerformanceFunctional for CountingSumSquares {
    type Model = ParameterVector;

    fn model(&self) -> Option<&ParameterVector> {
        self.inner.model()
    }

    fn model_mut(&mut self) -> Option<&mut ParameterVector> {
        self.inner.model_mut()
    }

    fn evaluate(&self, parameters: &[f64]) -> f64 {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.inner.evaluate(parameters)
    }

    fn evaluate_generalization(&self) -> f64 {
        self.inner.evaluate_generalization()
    }
}

#[test]
fn small_population_reaches_performance_goal() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut algorithm = EvolutionaryAlgorithm::new(SumSquares::new(2), &mut rng).unwrap();
    algorithm.set_population_size(4, &mut rng).unwrap();
    algorithm.set_performance_goal(0.01).unwrap();
    algorithm.set_maximum_generations_number(2000).unwrap();

    let results = algorithm.perform_training(&mut rng).unwrap();

    assert_eq!(
        results.stopping_condition,
        StoppingCondition::PerformanceGoal
    );
    assert!(results.generations <= 2001);
    assert!(results.best_performance <= 0.01);
    let norm = results
        .best_individual
        .iter()
        .map(|x| x * x)
        .sum::<f64>()
        .sqrt();
    assert!(norm <= 0.1 + 1e-12);
}

#[test]
fn sphere_reaches_performance_goal() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut algorithm = EvolutionaryAlgorithm::new(SumSquares::new(2), &mut rng).unwrap();
    algorithm.set_performance_goal(0.01).unwrap();
    algorithm.set_maximum_generations_number(500).unwrap();

    let results = algorithm.perform_training(&mut rng).unwrap();

    assert_eq!(
        results.stopping_condition,
        StoppingCondition::PerformanceGoal
    );
    assert!(results.best_performance <= 0.01);
    assert!(results.final_summary.is_some());
}

#[test]
fn every_operator_combination_trains() {
    let selections = [
        SelectionMethod::RouletteWheel,
        SelectionMethod::StochasticUniversalSampling,
    ];
    let recombinations = [RecombinationMethod::Line, RecombinationMethod::Intermediate];
    let mutations = [MutationMethod::Normal, MutationMethod::Uniform];

    for selection in selections {
        for recombination in recombinations {
            for mutation in mutations {
                let mut rng = StdRng::seed_from_u64(3);
                let mut algorithm =
                    EvolutionaryAlgorithm::new(SumSquares::new(3), &mut rng).unwrap();
                algorithm.set_selection_method(selection);
                algorithm.set_recombination_method(recombination);
                algorithm.set_mutation_method(mutation);
                algorithm.set_elitism(true);
                algorithm.set_maximum_generations_number(40).unwrap();
                algorithm.set_reserve(HistoryReservation {
                    best_performance: true,
                    ..HistoryReservation::none()
                });

                let results = algorithm.perform_training(&mut rng).unwrap();
                let history = &results.history.best_performance;

                assert_eq!(history.len(), results.generations);
                assert!(history.windows(2).all(|w| w[1] <= w[0]));
                assert!(results.best_performance <= history[0]);
            }
        }
    }
}

#[test]
fn evaluation_is_idempotent() {
    let functional = CountingSumSquares::new(3);
    let parameters = [0.3, -1.2, 2.0];

    let first = functional.evaluate(&parameters);
    let second = functional.evaluate(&parameters);

    assert_eq!(first, second);
    assert_eq!(functional.evaluations.load(Ordering::Relaxed), 2);
}

#[test]
fn each_generation_evaluates_whole_population() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut algorithm =
        EvolutionaryAlgorithm::new(CountingSumSquares::new(2), &mut rng).unwrap();
    algorithm.set_maximum_generations_number(9).unwrap();

    let results = algorithm.perform_training(&mut rng).unwrap();
    let population_size = algorithm.population().size();

    assert_eq!(
        results.stopping_condition,
        StoppingCondition::MaximumGenerations
    );
    let functional = algorithm.into_functional();
    assert_eq!(
        functional.evaluations.load(Ordering::Relaxed),
        results.generations * population_size
    );
}

#[test]
fn generalization_is_reported_for_best_individual() {
    let mut rng = StdRng::seed_from_u64(5);
    let functional = SumSquares::new(2).with_validation_center(vec![0.5, 0.5]);
    let mut algorithm = EvolutionaryAlgorithm::new(functional, &mut rng).unwrap();
    algorithm.set_maximum_generations_number(20).unwrap();
    algorithm.set_reserve(HistoryReservation {
        generalization_performance: true,
        ..HistoryReservation::none()
    });

    let results = algorithm.perform_training(&mut rng).unwrap();

    let expected: f64 = results
        .best_individual
        .iter()
        .map(|x| (x - 0.5).powi(2))
        .sum();
    assert!((results.generalization_performance - expected).abs() < 1e-12);
    assert_eq!(
        results.history.generalization_performance.last().copied(),
        Some(results.generalization_performance)
    );
}

#[test]
fn rastrigin_improves_on_initial_population() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut algorithm = EvolutionaryAlgorithm::new(Rastrigin::new(3), &mut rng).unwrap();
    algorithm.set_maximum_generations_number(100).unwrap();
    algorithm.set_reserve(HistoryReservation {
        best_performance: true,
        ..HistoryReservation::none()
    });

    let results = algorithm.perform_training(&mut rng).unwrap();
    let history = &results.history.best_performance;

    assert!(results.best_performance <= history[0]);
    assert!(results.best_performance >= 0.0);
}

#[test]
fn results_export_as_json() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut algorithm = EvolutionaryAlgorithm::new(SumSquares::new(2), &mut rng).unwrap();
    algorithm.set_maximum_generations_number(3).unwrap();
    algorithm.set_reserve(HistoryReservation::all());

    let results = algorithm.perform_training(&mut rng).unwrap();
    let json = results.to_json().unwrap();
    let parsed: TrainingResults = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.generations, results.generations);
    assert_eq!(parsed.history.population.len(), 4);
    assert_eq!(parsed.stopping_condition, results.stopping_condition);
}

#[test]
fn training_can_continue_from_previous_population() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut algorithm = EvolutionaryAlgorithm::new(SumSquares::new(2), &mut rng).unwrap();
    algorithm.set_maximum_generations_number(10).unwrap();

    let first = algorithm.perform_training(&mut rng).unwrap();
    let second = algorithm.perform_training(&mut rng).unwrap();

    assert_eq!(first.generations, 11);
    assert_eq!(second.generations, 11);
    assert!(second.best_performance.is_finite());
}
