//! # Simulation Crate
//!
//! The `sim` crate provides the core logic of the population-genetics model.
//! It includes modules for the genotype space, the evolutionary forces that
//! update a genotype census each generation, the single-population engine
//! and the spatial engine that connects demes on a grid through gene flow.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;
pub mod spatial;

pub use base::{FitnessValue, RoundingPolicy};
pub use genome::{Genotype, GenotypeCatalog, GenotypeId};
