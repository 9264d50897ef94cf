//! Genetic operators
//!
//! This module provides fitness assignment, selection, recombination and
//! mutation operators. Each family is a closed enum chosen at runtime.

pub mod fitness;
pub mod mutation;
pub mod recombination;
pub mod selection;

pub mod prelude {
    pub use super::fitness::*;
    pub use super::mutation::*;
    pub use super::recombination::*;
    pub use super::selection::*;
}
