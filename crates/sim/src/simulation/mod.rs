//! Census data model, per-generation pipeline and the non-spatial engine.
//!
//! The most commonly used types are re-exported here:
//!
//! - [`Census`]: per-genotype counts, fitness and covariance of one deme.
//! - [`GenerationHistory`]: append-only sequence of censuses.
//! - [`GenerationPipeline`]: the growth, selection, drift, mating and mutation
//!   update shared by both engines.
//! - [`PopGen`]: the single-population engine, usually created through
//!   [`SimulationBuilder`] or a [`Configuration`].

pub mod builder;
pub mod census;
pub mod configs;
pub mod engine;
pub mod history;
pub mod initialization;
pub mod parameters;
pub mod pipeline;

pub use builder::SimulationBuilder;
pub use census::{Census, GenotypeRecord, Sex};
pub use configs::{Configuration, ExecutionConfig, GenomeConfig, SpatialConfig};
pub use engine::PopGen;
pub use history::GenerationHistory;
pub use initialization::{CountInit, CovarianceInit, FitnessInit, InitialCensus, SexCounts};
pub use parameters::{Bottleneck, OffspringScaling, PopulationParams};
pub use pipeline::GenerationPipeline;
