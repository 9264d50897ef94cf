//! Error types for evotrain
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for population access and shape violations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PopulationError {
    /// Row index past the end of the population
    #[error("Individual index {index} out of range for population of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Individual length differs from the parameter count
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Population size is odd or smaller than four
    #[error("Invalid population size {0}: must be even and at least 4")]
    InvalidSize(usize),

    /// Individuals cannot be empty
    #[error("Individuals must have at least one parameter")]
    ZeroParameters,

    /// A lower bound exceeds its upper bound
    #[error("Invalid bounds for parameter {index}: min ({min}) must be <= max ({max})")]
    InvalidBounds { index: usize, min: f64, max: f64 },

    /// A per-individual vector has the wrong length
    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Error type for operator invariant violations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Selection did not flag exactly half of the population
    #[error("Selection count mismatch: expected {expected} selected individuals, got {actual}")]
    SelectionCountMismatch { expected: usize, actual: usize },

    /// Recombination produced the wrong number of offspring
    #[error("Recombination size mismatch: expected {expected} offspring, got {actual}")]
    RecombinationSizeMismatch { expected: usize, actual: usize },

    /// A rejection-sampling loop gave up
    #[error("{operation} exceeded {limit} attempts")]
    RetryLimitExceeded {
        operation: &'static str,
        limit: usize,
    },
}

/// Top-level error type for evolutionary training
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Population error
    #[error("Population error: {0}")]
    Population(#[from] PopulationError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Numerical instability
    #[error("Numerical instability: {0}")]
    Numerical(String),

    /// The performance functional has no model attached
    #[error("Performance functional has no model")]
    MissingModel,

    /// The model has nothing to optimize
    #[error("Model has no parameters")]
    EmptyParameterSpace,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

/// Fails with [`EvolutionError::Numerical`] unless every value is finite
pub(crate) fn ensure_finite(values: &[f64], what: &str) -> EvoResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(EvolutionError::Numerical(format!(
            "{} of individual {} is {}",
            what, index, values[index]
        ))),
        None => Ok(()),
    }
}
