//! Evolutionary forces acting on a genotype census.
//!
//! - **Growth**: logistic or exponential sizing of the next generation
//! - **Selection**: viability selection by genotype fitness
//! - **Drift**: capacity-dependent multiplicative count noise
//! - **Mating**: random mating with assortative bias, distributed through
//!   Mendelian inheritance
//! - **Mutation**: distance-weighted transfer between genotypes

pub mod drift;
pub mod growth;
pub mod inheritance;
pub mod mating;
pub mod mutation;
pub mod selection;

pub use drift::{apply_drift, drift_amplitude};
pub use growth::growth_target;
pub use inheritance::{cross, punnett_square, InheritanceTable, Offspring, DENSE_TABLE_LIMIT};
pub use mating::synthesize_offspring;
pub use mutation::MutationModel;
pub use selection::{apply_fitness, FitnessLandscape, IntrinsicFitness, LocalFitness};
