//! Performance functional traits
//!
//! The evolutionary algorithm only sees the model it trains through these
//! two traits: a [`Model`] exposing its parameter vector, and a
//! [`PerformanceFunctional`] scoring candidate parameter vectors.

/// A trainable model with a flat vector of real parameters
#[cfg(feature = "parallel")]
pub trait Model: Send + Sync {
    /// Number of free parameters
    fn parameter_count(&self) -> usize;

    /// Overwrite the model's parameters
    ///
    /// `parameters.len()` always equals [`Model::parameter_count`].
    fn set_parameters(&mut self, parameters: &[f64]);
}

/// A trainable model with a flat vector of real parameters (non-parallel version)
#[cfg(not(feature = "parallel"))]
pub trait Model {
    /// Number of free parameters
    fn parameter_count(&self) -> usize;

    /// Overwrite the model's parameters
    ///
    /// `parameters.len()` always equals [`Model::parameter_count`].
    fn set_parameters(&mut self, parameters: &[f64]);
}

/// Scalar objective over parameter vectors (lower is better)
///
/// `evaluate` must be deterministic for a given parameter vector and return a
/// finite value; a non-finite score aborts training.
#[cfg(feature = "parallel")]
pub trait PerformanceFunctional: Send + Sync {
    /// The model being trained
    type Model: Model;

    /// The attached model, if any
    fn model(&self) -> Option<&Self::Model>;

    /// Mutable access to the attached model, if any
    fn model_mut(&mut self) -> Option<&mut Self::Model>;

    /// Performance of a candidate parameter vector
    fn evaluate(&self, parameters: &[f64]) -> f64;

    /// Performance of the model's current parameters on held-out data
    fn evaluate_generalization(&self) -> f64 {
        0.0
    }
}

/// Scalar objective over parameter vectors (non-parallel version)
///
/// `evaluate` must be deterministic for a given parameter vector and return a
/// finite value; a non-finite score aborts training.
#[cfg(not(feature = "parallel"))]
pub trait PerformanceFunctional {
    /// The model being trained
    type Model: Model;

    /// The attached model, if any
    fn model(&self) -> Option<&Self::Model>;

    /// Mutable access to the attached model, if any
    fn model_mut(&mut self) -> Option<&mut Self::Model>;

    /// Performance of a candidate parameter vector
    fn evaluate(&self, parameters: &[f64]) -> f64;

    /// Performance of the model's current parameters on held-out data
    fn evaluate_generalization(&self) -> f64 {
        0.0
    }
}
