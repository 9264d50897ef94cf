//! Population management
//!
//! This module provides the Population matrix and parameter bounds.

pub mod bounds;
#[allow(clippy::module_inception)]
pub mod population;

pub mod prelude {
    pub use super::bounds::*;
    pub use super::population::*;
}
