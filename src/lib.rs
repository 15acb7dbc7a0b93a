//! Speciation: multi-locus population genetics with spatial gene flow.
//!
//! This crate re-exports the simulation model from `speciation-sim` and the
//! derived statistics from `speciation-analysis`:
//!
//! - [`simulation::PopGen`] runs a single well-mixed population.
//! - [`spatial::TopographicalSpeciation`] runs a grid of demes connected by
//!   gene flow.
//! - [`analysis`] reduces recorded histories to per-generation statistics.

pub mod prelude;

pub use speciation_analysis::analysis;
pub use speciation_sim::{base, errors, evolution, genome, simulation, spatial};

// Re-export commonly used types for convenient external access.
pub use speciation_sim::{FitnessValue, Genotype, GenotypeCatalog, GenotypeId, RoundingPolicy};
