//! Population type
//!
//! A generation of individuals stored as one contiguous row-major matrix
//! (rows = individuals, columns = parameters), alongside the per-individual
//! performance, fitness and selection vectors.

use std::ops::Index;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PopulationError;
use crate::functional::traits::PerformanceFunctional;
use crate::population::bounds::MultiBounds;
use crate::random;

/// Smallest population the operators can work with
pub const MIN_POPULATION_SIZE: usize = 4;

/// Check that a population size is even and at least [`MIN_POPULATION_SIZE`]
pub fn validate_size(size: usize) -> Result<(), PopulationError> {
    if size < MIN_POPULATION_SIZE || size % 2 != 0 {
        return Err(PopulationError::InvalidSize(size));
    }
    Ok(())
}

/// A population of real-valued individuals
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Population {
    /// Row-major parameter matrix
    individuals: Vec<f64>,
    /// Number of columns
    parameter_count: usize,
    /// Performance of each individual (lower is better)
    performance: Vec<f64>,
    /// Fitness of each individual (higher is better)
    fitness: Vec<f64>,
    /// Whether each individual was picked as a parent
    selection: Vec<bool>,
}

impl Population {
    /// Create a zero-filled population
    pub fn new(size: usize, parameter_count: usize) -> Result<Self, PopulationError> {
        validate_size(size)?;
        if parameter_count == 0 {
            return Err(PopulationError::ZeroParameters);
        }

        Ok(Self {
            individuals: vec![0.0; size * parameter_count],
            parameter_count,
            performance: vec![0.0; size],
            fitness: vec![0.0; size],
            selection: vec![false; size],
        })
    }

    /// Create a population with parameters drawn from a standard normal
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        parameter_count: usize,
        rng: &mut R,
    ) -> Result<Self, PopulationError> {
        let mut population = Self::new(size, parameter_count)?;
        population.initialize_normal(rng, 0.0, 1.0);
        Ok(population)
    }

    /// Create a population from explicit rows
    pub fn from_individuals(rows: &[Vec<f64>]) -> Result<Self, PopulationError> {
        let parameter_count = rows.first().map_or(0, Vec::len);
        let mut population = Self::new(rows.len(), parameter_count)?;
        for (i, row) in rows.iter().enumerate() {
            population.set_individual(i, row)?;
        }
        Ok(population)
    }

    /// Number of individuals
    pub fn size(&self) -> usize {
        self.performance.len()
    }

    /// Number of parameters per individual
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    fn check_index(&self, index: usize) -> Result<(), PopulationError> {
        if index >= self.size() {
            return Err(PopulationError::IndexOutOfRange {
                index,
                size: self.size(),
            });
        }
        Ok(())
    }

    /// Get an individual by index
    pub fn individual(&self, index: usize) -> Result<&[f64], PopulationError> {
        self.check_index(index)?;
        let start = index * self.parameter_count;
        Ok(&self.individuals[start..start + self.parameter_count])
    }

    /// Overwrite an individual by index
    pub fn set_individual(&mut self, index: usize, values: &[f64]) -> Result<(), PopulationError> {
        self.check_index(index)?;
        if values.len() != self.parameter_count {
            return Err(PopulationError::DimensionMismatch {
                expected: self.parameter_count,
                actual: values.len(),
            });
        }
        let start = index * self.parameter_count;
        self.individuals[start..start + self.parameter_count].copy_from_slice(values);
        Ok(())
    }

    /// Iterate over individuals in row order
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.individuals.chunks_exact(self.parameter_count)
    }

    /// Iterate mutably over individuals in row order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.individuals.chunks_exact_mut(self.parameter_count)
    }

    /// The whole parameter matrix, row-major
    pub fn as_matrix(&self) -> &[f64] {
        &self.individuals
    }

    /// The whole parameter matrix, mutable
    pub fn as_matrix_mut(&mut self) -> &mut [f64] {
        &mut self.individuals
    }

    /// Copy the population into one vector per individual
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter().map(<[f64]>::to_vec).collect()
    }

    /// Replace the whole parameter matrix
    ///
    /// The new matrix must have exactly `size * parameter_count` entries.
    pub fn replace_individuals(&mut self, matrix: Vec<f64>) -> Result<(), PopulationError> {
        if matrix.len() != self.individuals.len() {
            return Err(PopulationError::LengthMismatch {
                expected: self.individuals.len(),
                actual: matrix.len(),
            });
        }
        self.individuals = matrix;
        Ok(())
    }

    /// Performance of each individual
    pub fn performance(&self) -> &[f64] {
        &self.performance
    }

    /// Set the performance vector
    pub fn set_performance(&mut self, performance: Vec<f64>) -> Result<(), PopulationError> {
        Self::check_length(self.size(), performance.len())?;
        self.performance = performance;
        Ok(())
    }

    /// Fitness of each individual
    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// Set the fitness vector
    pub fn set_fitness(&mut self, fitness: Vec<f64>) -> Result<(), PopulationError> {
        Self::check_length(self.size(), fitness.len())?;
        self.fitness = fitness;
        Ok(())
    }

    /// Selection flag of each individual
    pub fn selection(&self) -> &[bool] {
        &self.selection
    }

    /// Set the selection vector
    pub fn set_selection(&mut self, selection: Vec<bool>) -> Result<(), PopulationError> {
        Self::check_length(self.size(), selection.len())?;
        self.selection = selection;
        Ok(())
    }

    /// Clear every selection flag
    pub fn reset_selection(&mut self) {
        self.selection.iter_mut().for_each(|s| *s = false);
    }

    /// Number of individuals currently selected
    pub fn selected_count(&self) -> usize {
        self.selection.iter().filter(|&&s| s).count()
    }

    fn check_length(expected: usize, actual: usize) -> Result<(), PopulationError> {
        if expected != actual {
            return Err(PopulationError::LengthMismatch { expected, actual });
        }
        Ok(())
    }

    /// Change the number of individuals
    ///
    /// All vectors are reallocated and every individual is redrawn from a
    /// standard normal. On error the population is left untouched.
    pub fn resize<R: Rng + ?Sized>(
        &mut self,
        new_size: usize,
        rng: &mut R,
    ) -> Result<(), PopulationError> {
        *self = Self::random(new_size, self.parameter_count, rng)?;
        Ok(())
    }

    /// Set every parameter of every individual to `value`
    pub fn initialize_constant(&mut self, value: f64) {
        self.individuals.iter_mut().for_each(|x| *x = value);
    }

    /// Draw every parameter uniformly from `[min, max)`
    pub fn initialize_uniform<R: Rng + ?Sized>(&mut self, rng: &mut R, min: f64, max: f64) {
        for x in &mut self.individuals {
            *x = random::uniform(rng, min, max);
        }
    }

    /// Draw each parameter uniformly from its own bounds
    pub fn initialize_uniform_bounded<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        bounds: &MultiBounds,
    ) -> Result<(), PopulationError> {
        if bounds.dimension() != self.parameter_count {
            return Err(PopulationError::DimensionMismatch {
                expected: self.parameter_count,
                actual: bounds.dimension(),
            });
        }

        let parameter_count = self.parameter_count;
        for row in self.individuals.chunks_exact_mut(parameter_count) {
            for (x, b) in row.iter_mut().zip(bounds.iter()) {
                *x = random::uniform(rng, b.min, b.max);
            }
        }
        Ok(())
    }

    /// Draw each parameter uniformly between a minimum and a maximum vector
    pub fn initialize_uniform_min_max<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        minimums: &[f64],
        maximums: &[f64],
    ) -> Result<(), PopulationError> {
        if minimums.len() != maximums.len() {
            return Err(PopulationError::DimensionMismatch {
                expected: minimums.len(),
                actual: maximums.len(),
            });
        }
        if let Some(index) = minimums
            .iter()
            .zip(maximums)
            .position(|(min, max)| min.is_nan() || max.is_nan() || min > max)
        {
            return Err(PopulationError::InvalidBounds {
                index,
                min: minimums[index],
                max: maximums[index],
            });
        }

        let bounds: MultiBounds = minimums.iter().copied().zip(maximums.iter().copied()).collect();
        self.initialize_uniform_bounded(rng, &bounds)
    }

    /// Draw every parameter from a normal distribution
    pub fn initialize_normal<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        mean: f64,
        standard_deviation: f64,
    ) {
        for x in &mut self.individuals {
            *x = random::normal(rng, mean, standard_deviation);
        }
    }

    /// Draw each parameter from its own normal distribution
    pub fn initialize_normal_per_parameter<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        means: &[f64],
        standard_deviations: &[f64],
    ) -> Result<(), PopulationError> {
        for len in [means.len(), standard_deviations.len()] {
            if len != self.parameter_count {
                return Err(PopulationError::DimensionMismatch {
                    expected: self.parameter_count,
                    actual: len,
                });
            }
        }

        let parameter_count = self.parameter_count;
        for row in self.individuals.chunks_exact_mut(parameter_count) {
            for ((x, &mean), &sd) in row.iter_mut().zip(means).zip(standard_deviations) {
                *x = random::normal(rng, mean, sd);
            }
        }
        Ok(())
    }

    /// Euclidean norm of each individual
    pub fn norms(&self) -> Vec<f64> {
        self.iter()
            .map(|row| row.iter().map(|x| x * x).sum::<f64>().sqrt())
            .collect()
    }

    /// Index of the lowest performance (earliest index on ties)
    pub fn best_index(&self) -> Option<usize> {
        best_performance_index(&self.performance)
    }
}

/// Performance evaluation
impl Population {
    /// Evaluate every individual and store the performance vector
    pub fn evaluate<P: PerformanceFunctional>(&mut self, functional: &P) {
        self.performance = self
            .individuals
            .chunks_exact(self.parameter_count)
            .map(|row| functional.evaluate(row))
            .collect();
    }
}

/// Parallel evaluation support (requires `parallel` feature)
#[cfg(feature = "parallel")]
impl Population {
    /// Evaluate every individual in parallel and store the performance vector
    ///
    /// Results keep row order.
    pub fn evaluate_parallel<P: PerformanceFunctional>(&mut self, functional: &P) {
        self.performance = self
            .individuals
            .par_chunks_exact(self.parameter_count)
            .map(|row| functional.evaluate(row))
            .collect();
    }
}

/// Sequential fallback for parallel evaluation (when `parallel` feature is disabled)
#[cfg(not(feature = "parallel"))]
impl Population {
    /// Evaluate every individual (sequential fallback)
    pub fn evaluate_parallel<P: PerformanceFunctional>(&mut self, functional: &P) {
        self.evaluate(functional);
    }
}

/// Index of the lowest value in a performance vector (earliest index on ties)
pub fn best_performance_index(performance: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &p) in performance.iter().enumerate() {
        if best.map_or(true, |b| p < performance[b]) {
            best = Some(i);
        }
    }
    best
}

impl Index<usize> for Population {
    type Output = [f64];

    fn index(&self, index: usize) -> &Self::Output {
        let start = index * self.parameter_count;
        &self.individuals[start..start + self.parameter_count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::bounds::Bounds;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_population() -> Population {
        Population::from_individuals(&[
            vec![1.0, 0.0],
            vec![0.0, 2.0],
            vec![3.0, 4.0],
            vec![-1.0, -1.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_population_new() {
        let pop = Population::new(6, 3).unwrap();
        assert_eq!(pop.size(), 6);
        assert_eq!(pop.parameter_count(), 3);
        assert_eq!(pop.performance().len(), 6);
        assert_eq!(pop.fitness().len(), 6);
        assert_eq!(pop.selection().len(), 6);
        assert!(pop.as_matrix().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_population_invalid_sizes() {
        assert_eq!(Population::new(2, 3), Err(PopulationError::InvalidSize(2)));
        assert_eq!(Population::new(5, 3), Err(PopulationError::InvalidSize(5)));
        assert_eq!(Population::new(4, 0), Err(PopulationError::ZeroParameters));
    }

    #[test]
    fn test_population_get_set_individual() {
        let mut pop = create_test_population();
        assert_eq!(pop.individual(2).unwrap(), &[3.0, 4.0]);

        pop.set_individual(2, &[5.0, 6.0]).unwrap();
        assert_eq!(&pop[2], &[5.0, 6.0]);

        assert_eq!(
            pop.individual(4),
            Err(PopulationError::IndexOutOfRange { index: 4, size: 4 })
        );
        assert_eq!(
            pop.set_individual(0, &[1.0]),
            Err(PopulationError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_population_resize() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pop = create_test_population();
        pop.selection.iter_mut().for_each(|s| *s = true);

        pop.resize(8, &mut rng).unwrap();
        assert_eq!(pop.size(), 8);
        assert_eq!(pop.as_matrix().len(), 16);
        assert_eq!(pop.selected_count(), 0);
        assert!(pop.as_matrix().iter().any(|&x| x != 0.0));
    }

    #[test]
    fn test_population_resize_rejects_invalid() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut pop = create_test_population();
        let before = pop.clone();

        assert_eq!(
            pop.resize(7, &mut rng),
            Err(PopulationError::InvalidSize(7))
        );
        assert_eq!(
            pop.resize(2, &mut rng),
            Err(PopulationError::InvalidSize(2))
        );
        assert_eq!(pop, before);
    }

    #[test]
    fn test_population_initialize_constant() {
        let mut pop = create_test_population();
        pop.initialize_constant(0.5);
        assert!(pop.as_matrix().iter().all(|&x| x == 0.5));
    }

    #[test]
    fn test_population_initialize_uniform() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut pop = Population::new(10, 5).unwrap();
        pop.initialize_uniform(&mut rng, -2.0, 2.0);
        assert!(pop.as_matrix().iter().all(|&x| (-2.0..2.0).contains(&x)));
    }

    #[test]
    fn test_population_initialize_uniform_bounded() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut pop = Population::new(10, 2).unwrap();
        let bounds = MultiBounds::new(vec![Bounds::new(0.0, 1.0), Bounds::new(10.0, 11.0)]);

        pop.initialize_uniform_bounded(&mut rng, &bounds).unwrap();
        assert!(pop.iter().all(|row| bounds.contains_vec(row)));

        let wrong = MultiBounds::symmetric(1.0, 3);
        assert!(pop.initialize_uniform_bounded(&mut rng, &wrong).is_err());
    }

    #[test]
    fn test_population_initialize_uniform_min_max() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut pop = Population::new(4, 2).unwrap();

        pop.initialize_uniform_min_max(&mut rng, &[-1.0, 5.0], &[0.0, 6.0])
            .unwrap();
        for row in pop.iter() {
            assert!((-1.0..0.0).contains(&row[0]));
            assert!((5.0..6.0).contains(&row[1]));
        }

        assert!(pop
            .initialize_uniform_min_max(&mut rng, &[0.0], &[1.0, 2.0])
            .is_err());
        assert_eq!(
            pop.initialize_uniform_min_max(&mut rng, &[0.0, 3.0], &[1.0, 2.0]),
            Err(PopulationError::InvalidBounds {
                index: 1,
                min: 3.0,
                max: 2.0
            })
        );
        assert!(matches!(
            pop.initialize_uniform_min_max(&mut rng, &[0.0, f64::NAN], &[1.0, 2.0]),
            Err(PopulationError::InvalidBounds { index: 1, .. })
        ));
        assert!(matches!(
            pop.initialize_uniform_min_max(&mut rng, &[0.0, 0.0], &[1.0, f64::NAN]),
            Err(PopulationError::InvalidBounds { index: 1, .. })
        ));
    }

    #[test]
    fn test_population_initialize_normal_per_parameter() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut pop = Population::new(4, 2).unwrap();

        pop.initialize_normal_per_parameter(&mut rng, &[3.0, -3.0], &[0.0, 0.0])
            .unwrap();
        assert!(pop.iter().all(|row| row == [3.0, -3.0]));

        assert!(pop
            .initialize_normal_per_parameter(&mut rng, &[0.0], &[1.0, 1.0])
            .is_err());
    }

    #[test]
    fn test_population_norms() {
        let pop = create_test_population();
        let norms = pop.norms();
        assert_relative_eq!(norms[0], 1.0);
        assert_relative_eq!(norms[1], 2.0);
        assert_relative_eq!(norms[2], 5.0);
        assert_relative_eq!(norms[3], 2f64.sqrt());
    }

    #[test]
    fn test_population_vector_lengths_checked() {
        let mut pop = create_test_population();
        assert!(pop.set_performance(vec![1.0, 2.0, 3.0, 4.0]).is_ok());
        assert_eq!(
            pop.set_fitness(vec![1.0]),
            Err(PopulationError::LengthMismatch {
                expected: 4,
                actual: 1
            })
        );
        assert!(pop.set_selection(vec![true; 5]).is_err());
        assert!(pop.replace_individuals(vec![0.0; 6]).is_err());
        assert!(pop.replace_individuals(vec![0.0; 8]).is_ok());
    }

    #[test]
    fn test_population_selection_reset() {
        let mut pop = create_test_population();
        pop.set_selection(vec![true, false, true, false]).unwrap();
        assert_eq!(pop.selected_count(), 2);

        pop.reset_selection();
        assert_eq!(pop.selected_count(), 0);
    }

    #[test]
    fn test_best_index_earliest_on_ties() {
        let mut pop = create_test_population();
        pop.set_performance(vec![3.0, 1.0, 1.0, 2.0]).unwrap();
        assert_eq!(pop.best_index(), Some(1));
        assert_eq!(best_performance_index(&[]), None);
    }

    #[test]
    fn test_population_evaluate() {
        use crate::functional::benchmarks::SumSquares;

        let mut pop = create_test_population();
        let functional = SumSquares::new(2);

        pop.evaluate(&functional);
        assert_eq!(pop.performance(), &[1.0, 4.0, 25.0, 2.0]);

        pop.set_performance(vec![0.0; 4]).unwrap();
        pop.evaluate_parallel(&functional);
        assert_eq!(pop.performance(), &[1.0, 4.0, 25.0, 2.0]);
    }

    #[test]
    fn test_population_to_rows() {
        let pop = create_test_population();
        let rows = pop.to_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3], vec![-1.0, -1.0]);
    }
}
