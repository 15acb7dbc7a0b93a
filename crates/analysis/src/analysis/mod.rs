//! Population genetics statistics over generation histories
//!
//! All functions are pure reductions; they never modify a history. Sizes and
//! counts are always defined. Anything that divides by the population size
//! returns [`PopulationExtinct`](speciation_sim::errors::PopulationExtinct)
//! for an empty generation instead of NaN.
//!
//! - Population size, per sex
//! - Genotype and allele composition (pooled and per locus)
//! - Mean fitness
//! - Effective population size
//! - Per-deme maps of a grid
//! - Single genotype and allele trajectories

pub mod composition;
pub mod effective_size;
pub mod fitness;
pub mod size;
pub mod spatial;
pub mod temporal;
pub mod utils;

// Re-export commonly used functions
pub use composition::{
    allele_counts, allele_frequencies, genotype_counts, genotype_frequencies,
    locus_allele_frequencies,
};
pub use effective_size::{effective_population_size, EffectiveSize};
pub use fitness::average_fitness;
pub use size::{population_size, sex_size, sex_sizes};
pub use spatial::{average_fitness_map, metapopulation_history, population_size_map};
pub use temporal::{allele_trajectory, genotype_trajectory, TrajectoryError};
