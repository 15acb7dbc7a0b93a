//! Base value types shared by the genotype model and the pipeline.
//!
//! This module provides the fitness value type, the centralized rounding policy
//! used wherever counts are materialized, and the seeded generator helpers.

pub mod fitness;
pub mod rng;
mod rounding;

pub use fitness::FitnessValue;
pub use rng::SimRng;
pub use rounding::RoundingPolicy;
