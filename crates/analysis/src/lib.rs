//! # Analysis Crate
//!
//! Derived statistics computed on demand from the generation histories
//! recorded by `speciation-sim`.

pub mod analysis;

pub use analysis::*;
