//! Parameter bounds
//!
//! Per-parameter intervals used to draw uniformly initialized populations.

use serde::{Deserialize, Serialize};

/// Interval `[min, max)` for a single parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// # Panics
    /// Panics if min > max or either bound is NaN
    pub fn new(min: f64, max: f64) -> Self {
        assert!(
            min <= max,
            "Invalid bounds: min ({}) must be <= max ({})",
            min,
            max
        );
        Self { min, max }
    }

    /// `[-half_width, half_width)`
    pub fn symmetric(half_width: f64) -> Self {
        Self::new(-half_width, half_width)
    }

    /// Whether `value` lies in the closed interval
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// One interval per parameter of an individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiBounds {
    pub bounds: Vec<Bounds>,
}

impl MultiBounds {
    pub fn new(bounds: Vec<Bounds>) -> Self {
        Self { bounds }
    }

    /// The same interval for each of `dimension` parameters
    pub fn uniform(bound: Bounds, dimension: usize) -> Self {
        Self::new(vec![bound; dimension])
    }

    pub fn symmetric(half_width: f64, dimension: usize) -> Self {
        Self::uniform(Bounds::symmetric(half_width), dimension)
    }

    /// Number of parameters covered
    pub fn dimension(&self) -> usize {
        self.bounds.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bounds> {
        self.bounds.iter()
    }

    /// Whether `values` has the right length and every entry is in range
    pub fn contains_vec(&self, values: &[f64]) -> bool {
        values.len() == self.dimension()
            && self.iter().zip(values).all(|(b, &v)| b.contains(v))
    }
}

impl FromIterator<(f64, f64)> for MultiBounds {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Bounds::from).collect())
    }
}
