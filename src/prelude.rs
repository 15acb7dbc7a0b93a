//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use speciation::prelude::*;
//!
//! let mut sim = SimulationBuilder::new()
//!     .loci(1)
//!     .alleles(2)
//!     .generations(10)
//!     .carrying_capacity(300.0)
//!     .uniform_initial(50.0)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! sim.run().unwrap();
//! let sizes = population_size(sim.history());
//! assert_eq!(sizes.len(), 11);
//! ```

pub use speciation_sim::prelude::*;

// Analysis module re-exports
pub use crate::analysis::{
    allele_frequencies, average_fitness, effective_population_size, genotype_frequencies,
    population_size,
};
