//! Grid of demes connected by gene flow.
//!
//! - [`ScalarField`] and [`GenotypeFields`]: externally supplied maps of
//!   carrying capacity, fitness and dispersal distance.
//! - [`Grid`] and [`Deme`]: the demes and their histories.
//! - [`migrate`]: one gene-flow pass over the grid.
//! - [`TopographicalSpeciation`]: the spatial engine, usually created through
//!   [`SpatialBuilder`].

pub mod builder;
pub mod engine;
pub mod field;
pub mod gene_flow;
pub mod grid;

pub use builder::SpatialBuilder;
pub use engine::TopographicalSpeciation;
pub use field::{GenotypeFields, ScalarField};
pub use gene_flow::{emigration_rate, migrate};
pub use grid::{Deme, Grid, Position};
