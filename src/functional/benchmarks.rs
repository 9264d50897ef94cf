//! Benchmark performance functionals
//!
//! Standard test objectives over a bare [`ParameterVector`] model, used to
//! exercise the training algorithms without a neural network.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::functional::traits::{Model, PerformanceFunctional};

/// A model that is nothing but its parameter vector
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterVector {
    parameters: Vec<f64>,
}

impl ParameterVector {
    /// Create a model from explicit parameters
    pub fn new(parameters: Vec<f64>) -> Self {
        Self { parameters }
    }

    /// Create a zero-filled model of the given dimension
    pub fn zeros(dimension: usize) -> Self {
        Self::new(vec![0.0; dimension])
    }

    /// Current parameters
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }
}

impl Model for ParameterVector {
    fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    fn set_parameters(&mut self, parameters: &[f64]) {
        self.parameters.clear();
        self.parameters.extend_from_slice(parameters);
    }
}

/// Sum of squares: f(x) = Σxᵢ²
///
/// Unimodal, convex, separable. Optimum at origin.
///
/// The generalization score is the squared distance of the model's current
/// parameters to a validation center (the origin unless set otherwise).
#[derive(Clone, Debug)]
pub struct SumSquares {
    model: Option<ParameterVector>,
    validation_center: Option<Vec<f64>>,
}

impl SumSquares {
    /// Create a new sum-of-squares functional over a zero model
    pub fn new(dimension: usize) -> Self {
        Self {
            model: Some(ParameterVector::zeros(dimension)),
            validation_center: None,
        }
    }

    /// Create a functional with no model attached
    pub fn detached() -> Self {
        Self {
            model: None,
            validation_center: None,
        }
    }

    /// Measure generalization against a shifted optimum
    pub fn with_validation_center(mut self, center: Vec<f64>) -> Self {
        self.validation_center = Some(center);
        self
    }
}

impl PerformanceFunctional for SumSquares {
    type Model = ParameterVector;

    fn model(&self) -> Option<&ParameterVector> {
        self.model.as_ref()
    }

    fn model_mut(&mut self) -> Option<&mut ParameterVector> {
        self.model.as_mut()
    }

    fn evaluate(&self, parameters: &[f64]) -> f64 {
        parameters.iter().map(|x| x * x).sum()
    }

    fn evaluate_generalization(&self) -> f64 {
        let Some(model) = self.model.as_ref() else {
            return 0.0;
        };

        match &self.validation_center {
            Some(center) => model
                .parameters()
                .iter()
                .zip(center)
                .map(|(x, c)| (x - c).powi(2))
                .sum(),
            None => self.evaluate(model.parameters()),
        }
    }
}

/// Rastrigin function: f(x) = 10n + Σ(xᵢ² - 10cos(2πxᵢ))
///
/// Highly multimodal with many local minima. Optimum at origin.
#[derive(Clone, Debug)]
pub struct Rastrigin {
    model: ParameterVector,
}

impl Rastrigin {
    /// Create a new Rastrigin functional over a zero model
    pub fn new(dimension: usize) -> Self {
        Self {
            model: ParameterVector::zeros(dimension),
        }
    }
}

impl PerformanceFunctional for Rastrigin {
    type Model = ParameterVector;

    fn model(&self) -> Option<&ParameterVector> {
        Some(&self.model)
    }

    fn model_mut(&mut self) -> Option<&mut ParameterVector> {
        Some(&mut self.model)
    }

    fn evaluate(&self, parameters: &[f64]) -> f64 {
        let a = 10.0;
        let n = parameters.len() as f64;
        a * n
            + parameters
                .iter()
                .map(|x| x * x - a * (2.0 * PI * x).cos())
                .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parameter_vector_set_parameters() {
        let mut model = ParameterVector::zeros(3);
        assert_eq!(model.parameter_count(), 3);

        model.set_parameters(&[1.0, 2.0, 3.0]);
        assert_eq!(model.parameters(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sum_squares_optimum() {
        let f = SumSquares::new(3);
        assert_eq!(f.evaluate(&[0.0, 0.0, 0.0]), 0.0);
        assert_relative_eq!(f.evaluate(&[1.0, -2.0, 0.5]), 5.25);
    }

    #[test]
    fn test_sum_squares_generalization_tracks_model() {
        let mut f = SumSquares::new(2).with_validation_center(vec![1.0, 1.0]);
        assert_relative_eq!(f.evaluate_generalization(), 2.0);

        f.model_mut().unwrap().set_parameters(&[1.0, 0.0]);
        assert_relative_eq!(f.evaluate_generalization(), 1.0);
    }

    #[test]
    fn test_sum_squares_detached() {
        let f = SumSquares::detached();
        assert!(f.model().is_none());
        assert_eq!(f.evaluate_generalization(), 0.0);
    }

    #[test]
    fn test_rastrigin_optimum() {
        let f = Rastrigin::new(4);
        assert_relative_eq!(f.evaluate(&[0.0; 4]), 0.0, epsilon = 1e-12);
        assert!(f.evaluate(&[0.5; 4]) > 0.0);
    }
}
