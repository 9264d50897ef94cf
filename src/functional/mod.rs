//! Performance functionals and models
//!
//! This module provides the abstraction over the objective being minimized
//! and a few benchmark functionals.

pub mod benchmarks;
pub mod traits;

pub mod prelude {
    pub use super::benchmarks::*;
    pub use super::traits::*;
}
