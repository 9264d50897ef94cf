//! # evotrain
//!
//! Evolutionary training of real-valued parameter vectors.
//!
//! This library implements a generational genetic algorithm that minimizes a
//! scalar performance functional over the parameters of a model, with
//! configurable fitness assignment, selection, recombination and mutation.
//!
//! ## Core Concepts
//!
//! - **Performance functionals**: any type implementing [`functional::traits::PerformanceFunctional`]
//!   can be trained; lower performance is better
//! - **Runtime operators**: each operator family is a closed enum picked in the configuration
//! - **Training history**: per-generation buffers are kept only when reserved
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use evotrain::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let mut algorithm = EvolutionaryAlgorithm::new(SumSquares::new(10), &mut rng)?;
//! algorithm.set_performance_goal(1e-3)?;
//! algorithm.set_maximum_generations_number(500)?;
//!
//! let results = algorithm.perform_training(&mut rng)?;
//! println!("{}", results);
//! # Ok::<(), evotrain::error::EvolutionError>(())
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod functional;
pub mod operators;
pub mod population;
pub mod random;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::functional::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
