//! Evolutionary training algorithm
//!
//! A generational genetic algorithm over real-valued parameter vectors. Each
//! generation is evaluated against a [`PerformanceFunctional`], checked
//! against the stopping criteria and, if training goes on, replaced through
//! fitness assignment, selection, recombination and mutation.

use std::fmt;
use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diagnostics::{
    mean, standard_deviation, FinalSummary, GenerationSnapshot, HistoryReservation,
    TrainingHistory, TrainingResults,
};
use crate::error::{ensure_finite, EvoResult, EvolutionError, PopulationError};
use crate::functional::traits::{Model, PerformanceFunctional};
use crate::operators::fitness::FitnessAssignmentMethod;
use crate::operators::mutation::MutationMethod;
use crate::operators::recombination::RecombinationMethod;
use crate::operators::selection::SelectionMethod;
use crate::population::population::{validate_size, Population, MIN_POPULATION_SIZE};
use crate::termination::{GenerationState, StoppingCriteria};

/// Configuration for the evolutionary algorithm
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionaryConfig {
    /// Number of individuals (even, at least 4)
    pub population_size: usize,
    /// Fitness assignment method
    pub fitness_assignment_method: FitnessAssignmentMethod,
    /// Selection method
    pub selection_method: SelectionMethod,
    /// Recombination method
    pub recombination_method: RecombinationMethod,
    /// Mutation method
    pub mutation_method: MutationMethod,
    /// Linear ranking selective pressure in [1, 2]
    pub selective_pressure: f64,
    /// How far offspring may extrapolate past their parents
    pub recombination_size: f64,
    /// Per-parameter mutation probability in [0, 1]
    pub mutation_rate: f64,
    /// Scale of the mutation noise
    pub mutation_range: f64,
    /// Keep the best individual selected under roulette-wheel selection
    pub elitism: bool,
    /// Stopping criteria
    pub stopping_criteria: StoppingCriteria,
    /// Which history buffers to fill
    pub reserve: HistoryReservation,
    /// Log progress every `display_period` generations
    pub display: bool,
    /// Generations between progress messages
    pub display_period: usize,
    /// Whether to evaluate individuals in parallel
    pub parallel_evaluation: bool,
}

impl EvolutionaryConfig {
    /// Default configuration for a model with `parameter_count` parameters
    pub fn for_parameter_count(parameter_count: usize) -> Self {
        let parameter_count = parameter_count.max(1);
        Self {
            population_size: (10 * parameter_count).max(MIN_POPULATION_SIZE),
            fitness_assignment_method: FitnessAssignmentMethod::default(),
            selection_method: SelectionMethod::default(),
            recombination_method: RecombinationMethod::default(),
            mutation_method: MutationMethod::default(),
            selective_pressure: 1.5,
            recombination_size: 0.25,
            mutation_rate: 1.0 / parameter_count as f64,
            mutation_range: 0.1,
            elitism: false,
            stopping_criteria: StoppingCriteria::default(),
            reserve: HistoryReservation::default(),
            display: false,
            display_period: 10,
            parallel_evaluation: true,
        }
    }

    /// Check every value against its documented range
    pub fn validate(&self) -> EvoResult<()> {
        validate_size(self.population_size)
            .map_err(|e| EvolutionError::Configuration(e.to_string()))?;

        let pressure = self.selective_pressure;
        check_value(
            "Selective pressure",
            pressure,
            (1.0..=2.0).contains(&pressure),
            "in [1, 2]",
        )?;
        check_value(
            "Recombination size",
            self.recombination_size,
            self.recombination_size >= 0.0,
            "non-negative",
        )?;
        let rate = self.mutation_rate;
        check_value(
            "Mutation rate",
            rate,
            (0.0..=1.0).contains(&rate),
            "in [0, 1]",
        )?;
        check_value(
            "Mutation range",
            self.mutation_range,
            self.mutation_range >= 0.0,
            "non-negative",
        )?;

        let criteria = &self.stopping_criteria;
        check_value("Performance goal", criteria.performance_goal, true, "finite")?;
        check_value(
            "Mean performance goal",
            criteria.mean_performance_goal,
            true,
            "finite",
        )?;
        check_value(
            "Standard deviation of performance goal",
            criteria.standard_deviation_performance_goal,
            criteria.standard_deviation_performance_goal >= 0.0,
            "non-negative",
        )?;
        check_value(
            "Maximum time",
            criteria.maximum_time,
            criteria.maximum_time >= 0.0,
            "non-negative",
        )?;

        if criteria.maximum_generations_number == 0 {
            return Err(EvolutionError::Configuration(
                "Maximum number of generations must be at least 1".to_string(),
            ));
        }
        if self.display_period == 0 {
            return Err(EvolutionError::Configuration(
                "Display period must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> EvoResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EvolutionError::Configuration(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> EvoResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EvolutionError::Configuration(format!("Cannot serialize: {}", e)))
    }
}

/// Fails unless `value` is finite and `valid` holds
fn check_value(name: &str, value: f64, valid: bool, expected: &str) -> EvoResult<()> {
    if !value.is_finite() || !valid {
        return Err(EvolutionError::Configuration(format!(
            "{} must be {}, got {}",
            name, expected, value
        )));
    }
    Ok(())
}

impl fmt::Display for EvolutionaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let criteria = &self.stopping_criteria;
        writeln!(f, "Evolutionary algorithm:")?;
        writeln!(f, " - Population size: {}", self.population_size)?;
        writeln!(
            f,
            " - Fitness assignment method: {}",
            self.fitness_assignment_method.name()
        )?;
        writeln!(f, " - Selection method: {}", self.selection_method.name())?;
        writeln!(
            f,
            " - Recombination method: {}",
            self.recombination_method.name()
        )?;
        writeln!(f, " - Mutation method: {}", self.mutation_method.name())?;
        writeln!(f, " - Selective pressure: {}", self.selective_pressure)?;
        writeln!(f, " - Recombination size: {}", self.recombination_size)?;
        writeln!(f, " - Mutation rate: {}", self.mutation_rate)?;
        writeln!(f, " - Mutation range: {}", self.mutation_range)?;
        writeln!(f, " - Elitism: {}", self.elitism)?;
        writeln!(f, " - Performance goal: {}", criteria.performance_goal)?;
        writeln!(
            f,
            " - Mean performance goal: {}",
            criteria.mean_performance_goal
        )?;
        writeln!(
            f,
            " - Standard deviation of performance goal: {}",
            criteria.standard_deviation_performance_goal
        )?;
        writeln!(
            f,
            " - Maximum generalization evaluation decreases: {}",
            criteria.maximum_generalization_evaluation_decreases
        )?;
        writeln!(f, " - Maximum time: {}", criteria.maximum_time)?;
        write!(
            f,
            " - Maximum number of generations: {}",
            criteria.maximum_generations_number
        )
    }
}

/// Best individual seen across all generations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestIndividual {
    /// Parameters of the best individual
    pub parameters: Vec<f64>,
    /// Its performance, `+∞` before the first evaluation
    pub performance: f64,
    /// Generalization performance reported when it was found
    pub generalization_performance: f64,
}

impl BestIndividual {
    /// Empty accumulator for individuals of `parameter_count` parameters
    pub fn new(parameter_count: usize) -> Self {
        Self {
            parameters: vec![0.0; parameter_count],
            performance: f64::INFINITY,
            generalization_performance: 0.0,
        }
    }

    /// Scan an evaluated population in row order
    ///
    /// Returns the index of the last strict improvement, if any.
    pub fn update(&mut self, population: &Population) -> Option<usize> {
        let mut improved = None;
        for (index, (row, &performance)) in population
            .iter()
            .zip(population.performance())
            .enumerate()
        {
            if performance < self.performance {
                self.performance = performance;
                self.parameters.clear();
                self.parameters.extend_from_slice(row);
                improved = Some(index);
            }
        }
        improved
    }

    /// Euclidean norm of the best parameters
    pub fn norm(&self) -> f64 {
        self.parameters.iter().map(|x| x * x).sum::<f64>().sqrt()
    }
}

/// Evolutionary training algorithm
///
/// Owns the performance functional it trains and the current population.
pub struct EvolutionaryAlgorithm<P: PerformanceFunctional> {
    functional: P,
    config: EvolutionaryConfig,
    population: Population,
}

impl<P: PerformanceFunctional> EvolutionaryAlgorithm<P> {
    /// Create an algorithm with default settings for the functional's model
    ///
    /// The population is drawn from a standard normal distribution.
    pub fn new<R: Rng + ?Sized>(functional: P, rng: &mut R) -> EvoResult<Self> {
        let parameter_count = functional
            .model()
            .ok_or(EvolutionError::MissingModel)?
            .parameter_count();
        if parameter_count == 0 {
            return Err(EvolutionError::EmptyParameterSpace);
        }

        let config = EvolutionaryConfig::for_parameter_count(parameter_count);
        let population = Population::random(config.population_size, parameter_count, rng)?;

        Ok(Self {
            functional,
            config,
            population,
        })
    }

    /// Replace the whole configuration
    ///
    /// The population is redrawn when the size changes.
    pub fn with_config<R: Rng + ?Sized>(
        mut self,
        config: EvolutionaryConfig,
        rng: &mut R,
    ) -> EvoResult<Self> {
        self.set_config(config, rng)?;
        Ok(self)
    }

    /// Replace the whole configuration in place
    pub fn set_config<R: Rng + ?Sized>(
        &mut self,
        config: EvolutionaryConfig,
        rng: &mut R,
    ) -> EvoResult<()> {
        config.validate()?;
        if config.population_size != self.population.size() {
            self.population.resize(config.population_size, rng)?;
        }
        self.config = config;
        Ok(())
    }

    /// Current configuration
    pub fn config(&self) -> &EvolutionaryConfig {
        &self.config
    }

    /// Current population
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Mutable access to the current population
    ///
    /// The shape cannot change through this reference.
    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    /// Replace the population with one of matching parameter count
    pub fn set_population(&mut self, population: Population) -> EvoResult<()> {
        if population.parameter_count() != self.population.parameter_count() {
            return Err(PopulationError::DimensionMismatch {
                expected: self.population.parameter_count(),
                actual: population.parameter_count(),
            }
            .into());
        }
        self.config.population_size = population.size();
        self.population = population;
        Ok(())
    }

    /// The performance functional being trained
    pub fn functional(&self) -> &P {
        &self.functional
    }

    /// Mutable access to the performance functional
    pub fn functional_mut(&mut self) -> &mut P {
        &mut self.functional
    }

    /// Give back the performance functional
    pub fn into_functional(self) -> P {
        self.functional
    }

    /// Apply a change to a copy of the config and keep it only if it validates
    fn update_config(&mut self, update: impl FnOnce(&mut EvolutionaryConfig)) -> EvoResult<()> {
        let mut config = self.config.clone();
        update(&mut config);
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Set the population size and redraw the population
    pub fn set_population_size<R: Rng + ?Sized>(
        &mut self,
        population_size: usize,
        rng: &mut R,
    ) -> EvoResult<()> {
        let mut config = self.config.clone();
        config.population_size = population_size;
        config.validate()?;
        self.population.resize(population_size, rng)?;
        self.config = config;
        Ok(())
    }

    pub fn set_fitness_assignment_method(&mut self, method: FitnessAssignmentMethod) {
        self.config.fitness_assignment_method = method;
    }

    pub fn set_selection_method(&mut self, method: SelectionMethod) {
        self.config.selection_method = method;
    }

    pub fn set_recombination_method(&mut self, method: RecombinationMethod) {
        self.config.recombination_method = method;
    }

    pub fn set_mutation_method(&mut self, method: MutationMethod) {
        self.config.mutation_method = method;
    }

    /// Set the selective pressure, in [1, 2]
    pub fn set_selective_pressure(&mut self, selective_pressure: f64) -> EvoResult<()> {
        self.update_config(|c| c.selective_pressure = selective_pressure)
    }

    /// Set the recombination size, at least 0
    pub fn set_recombination_size(&mut self, recombination_size: f64) -> EvoResult<()> {
        self.update_config(|c| c.recombination_size = recombination_size)
    }

    /// Set the mutation rate, in [0, 1]
    pub fn set_mutation_rate(&mut self, mutation_rate: f64) -> EvoResult<()> {
        self.update_config(|c| c.mutation_rate = mutation_rate)
    }

    /// Set the mutation range, at least 0
    pub fn set_mutation_range(&mut self, mutation_range: f64) -> EvoResult<()> {
        self.update_config(|c| c.mutation_range = mutation_range)
    }

    pub fn set_elitism(&mut self, elitism: bool) {
        self.config.elitism = elitism;
    }

    pub fn set_performance_goal(&mut self, goal: f64) -> EvoResult<()> {
        self.update_config(|c| c.stopping_criteria.performance_goal = goal)
    }

    pub fn set_mean_performance_goal(&mut self, goal: f64) -> EvoResult<()> {
        self.update_config(|c| c.stopping_criteria.mean_performance_goal = goal)
    }

    pub fn set_standard_deviation_performance_goal(&mut self, goal: f64) -> EvoResult<()> {
        self.update_config(|c| c.stopping_criteria.standard_deviation_performance_goal = goal)
    }

    pub fn set_maximum_generalization_evaluation_decreases(&mut self, decreases: usize) {
        self.config
            .stopping_criteria
            .maximum_generalization_evaluation_decreases = decreases;
    }

    /// Set the training time limit in seconds
    pub fn set_maximum_time(&mut self, maximum_time: f64) -> EvoResult<()> {
        self.update_config(|c| c.stopping_criteria.maximum_time = maximum_time)
    }

    /// Set the index of the last generation, at least 1
    pub fn set_maximum_generations_number(&mut self, generations: usize) -> EvoResult<()> {
        self.update_config(|c| c.stopping_criteria.maximum_generations_number = generations)
    }

    /// Replace all stopping criteria at once
    pub fn set_stopping_criteria(&mut self, criteria: StoppingCriteria) -> EvoResult<()> {
        self.update_config(|c| c.stopping_criteria = criteria)
    }

    pub fn set_reserve(&mut self, reserve: HistoryReservation) {
        self.config.reserve = reserve;
    }

    pub fn set_display(&mut self, display: bool) {
        self.config.display = display;
    }

    pub fn set_display_period(&mut self, display_period: usize) -> EvoResult<()> {
        self.update_config(|c| c.display_period = display_period)
    }

    pub fn set_parallel_evaluation(&mut self, parallel_evaluation: bool) {
        self.config.parallel_evaluation = parallel_evaluation;
    }

    /// Evaluate every individual and check the results are finite
    pub fn evaluate_population(&mut self) -> EvoResult<()> {
        if self.config.parallel_evaluation {
            self.population.evaluate_parallel(&self.functional);
        } else {
            self.population.evaluate(&self.functional);
        }
        ensure_finite(self.population.performance(), "Performance")
    }

    /// Turn the performance vector into the fitness vector
    pub fn perform_fitness_assignment(&mut self) -> EvoResult<()> {
        let fitness = self
            .config
            .fitness_assignment_method
            .assign(self.population.performance(), self.config.selective_pressure)?;
        self.population.set_fitness(fitness)?;
        Ok(())
    }

    /// Flag half of the population as parents
    pub fn perform_selection<R: Rng + ?Sized>(&mut self, rng: &mut R) -> EvoResult<()> {
        self.population.reset_selection();
        let selection = self.config.selection_method.select(
            self.population.fitness(),
            self.population.performance(),
            self.config.elitism,
            rng,
        )?;
        self.population.set_selection(selection)?;
        Ok(())
    }

    /// Replace the population with the parents' offspring
    pub fn perform_recombination<R: Rng + ?Sized>(&mut self, rng: &mut R) -> EvoResult<()> {
        let offspring = self.config.recombination_method.recombine(
            self.population.as_matrix(),
            self.population.parameter_count(),
            self.population.selection(),
            self.config.recombination_size,
            rng,
        )?;
        self.population.replace_individuals(offspring)?;
        Ok(())
    }

    /// Mutate the population in place
    pub fn perform_mutation<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.config.mutation_method.mutate(
            self.population.as_matrix_mut(),
            self.config.mutation_rate,
            self.config.mutation_range,
            rng,
        );
    }

    /// Produce the next generation from the evaluated one
    pub fn evolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> EvoResult<()> {
        self.perform_fitness_assignment()?;
        self.perform_selection(rng)?;
        self.perform_recombination(rng)?;
        self.perform_mutation(rng);
        Ok(())
    }

    /// Push the best parameters into the model and score them on held-out data
    fn evaluate_best_generalization(&mut self, best: &BestIndividual) -> EvoResult<f64> {
        self.functional
            .model_mut()
            .ok_or(EvolutionError::MissingModel)?
            .set_parameters(&best.parameters);
        Ok(self.functional.evaluate_generalization())
    }

    /// Run the generational loop until a stopping criterion is met
    pub fn perform_training<R: Rng + ?Sized>(&mut self, rng: &mut R) -> EvoResult<TrainingResults> {
        self.config.validate()?;
        if self.functional.model().is_none() {
            return Err(EvolutionError::MissingModel);
        }

        let start_time = Instant::now();
        let criteria = self.config.stopping_criteria.clone();
        let reserve = self.config.reserve.clone();
        let mut history = TrainingHistory::reserve(&reserve, criteria.maximum_generations_number);
        let mut best = BestIndividual::new(self.population.parameter_count());
        let mut previous_generalization: Option<f64> = None;
        let mut generalization_decreases = 0;

        info!(
            population_size = self.population.size(),
            parameter_count = self.population.parameter_count(),
            fitness_assignment = self.config.fitness_assignment_method.name(),
            selection = self.config.selection_method.name(),
            recombination = self.config.recombination_method.name(),
            mutation = self.config.mutation_method.name(),
            "Starting evolutionary training"
        );

        let mut generation = 0;
        let (stopping_condition, final_summary) = loop {
            let norms = self.population.norms();
            let mean_norm = mean(&norms);
            let standard_deviation_norm = standard_deviation(&norms);

            self.evaluate_population()?;

            if let Some(index) = best.update(&self.population) {
                let generalization = self.evaluate_best_generalization(&best)?;
                if previous_generalization.is_some_and(|previous| generalization > previous) {
                    generalization_decreases += 1;
                    debug!(
                        generation,
                        generalization,
                        generalization_decreases,
                        "Generalization performance decreased"
                    );
                }
                previous_generalization = Some(generalization);
                best.generalization_performance = generalization;
                debug!(
                    generation,
                    index,
                    best_performance = best.performance,
                    "New best individual"
                );
            }

            let performance = self.population.performance();
            let snapshot = GenerationSnapshot {
                population: &self.population,
                best_individual: &best.parameters,
                mean_norm,
                standard_deviation_norm,
                best_norm: best.norm(),
                mean_performance: mean(performance),
                standard_deviation_performance: standard_deviation(performance),
                best_performance: best.performance,
                generalization_performance: best.generalization_performance,
                elapsed_time: start_time.elapsed().as_secs_f64(),
            };
            history.record(&reserve, &snapshot);

            debug!(
                generation,
                best_performance = snapshot.best_performance,
                mean_performance = snapshot.mean_performance,
                standard_deviation_performance = snapshot.standard_deviation_performance,
                "Generation evaluated"
            );
            if self.config.display && generation % self.config.display_period == 0 {
                info!(
                    generation,
                    best_performance = snapshot.best_performance,
                    mean_performance = snapshot.mean_performance,
                    elapsed_time = snapshot.elapsed_time,
                    "Training progress"
                );
            }

            let state = GenerationState {
                generation,
                best_performance: snapshot.best_performance,
                mean_performance: snapshot.mean_performance,
                standard_deviation_performance: snapshot.standard_deviation_performance,
                generalization_decreases,
                elapsed_time: snapshot.elapsed_time,
            };
            if let Some(condition) = criteria.check(&state) {
                let summary = condition
                    .records_final_summary()
                    .then(|| FinalSummary::from(&snapshot));
                break (condition, summary);
            }

            self.evolve(rng)?;
            generation += 1;
        };

        let elapsed_time = start_time.elapsed().as_secs_f64();
        info!(
            generations = generation + 1,
            best_performance = best.performance,
            elapsed_time,
            reason = stopping_condition.reason(),
            "Training stopped"
        );

        Ok(TrainingResults {
            history,
            best_individual: best.parameters,
            best_performance: best.performance,
            generalization_performance: best.generalization_performance,
            generations: generation + 1,
            stopping_condition,
            final_summary,
            elapsed_time,
        })
    }
}

impl<P: PerformanceFunctional> fmt::Display for EvolutionaryAlgorithm<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.config)?;
        write!(
            f,
            " - Parameters per individual: {}",
            self.population.parameter_count()
        )
    }
}
