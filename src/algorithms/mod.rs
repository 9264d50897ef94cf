//! Training algorithms
//!
//! This module provides the evolutionary training algorithm.

pub mod evolutionary;

pub mod prelude {
    pub use super::evolutionary::*;
}
