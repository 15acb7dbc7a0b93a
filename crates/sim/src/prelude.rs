//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use speciation_sim::prelude::*;
//!
//! let catalog = GenotypeCatalog::new(2, 2).unwrap();
//! assert_eq!(catalog.len(), 9);
//! ```

pub use crate::base::{FitnessValue, RoundingPolicy};
pub use crate::errors::{ConfigurationError, InvariantViolation, PopulationExtinct, SimulationError};
pub use crate::genome::{Allele, Genotype, GenotypeCatalog, GenotypeId};
pub use crate::simulation::{
    Census, Configuration, GenerationHistory, GenotypeRecord, InitialCensus, PopGen,
    PopulationParams, Sex, SimulationBuilder,
};
pub use crate::spatial::{ScalarField, SpatialBuilder, TopographicalSpeciation};
