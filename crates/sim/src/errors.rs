//! Error types shared across the simulation crate.
//!
//! Three failure classes exist:
//! - [`ConfigurationError`]: the run cannot be set up (bad genotype space,
//!   out-of-range rates, missing builder parameters, malformed fields or files).
//! - [`InvariantViolation`]: an internal data-model contract was broken
//!   (census/catalog mismatch, inheritance probabilities not summing to one).
//! - [`PopulationExtinct`]: a reduction or pipeline step divided by a total
//!   population of zero.
//!
//! [`SimulationError`] wraps all three for engine-level operations.

use thiserror::Error;

/// Errors raised while validating parameters before a run starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// `loci` or `alleles` was zero.
    #[error("Invalid genotype space: loci = {loci}, alleles = {alleles} (both must be >= 1)")]
    InvalidGenotypeSpace { loci: usize, alleles: usize },

    /// The catalog would exceed the supported number of loci or genotypes.
    #[error("Genotype space too large: {loci} loci x {alleles} alleles ({reason})")]
    GenotypeSpaceTooLarge {
        loci: usize,
        alleles: usize,
        reason: &'static str,
    },

    /// A numeric parameter fell outside its valid range.
    #[error("Invalid {name}: {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// A builder was finalized without a required parameter.
    #[error("Missing required parameter: {0}")]
    MissingRequired(&'static str),

    /// A scalar field does not match the grid dimensions.
    #[error("Field '{name}' is {actual_width}x{actual_height}, expected {width}x{height}")]
    FieldShape {
        name: String,
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    /// Scalar field rows have inconsistent lengths.
    #[error("Scalar field row {row} has {len} columns, expected {width}")]
    RaggedField { row: usize, len: usize, width: usize },

    /// An initial census or field table disagrees with the genotype catalog.
    #[error("Expected {expected} per-genotype values, got {actual}")]
    GenotypeCount { expected: usize, actual: usize },

    /// A genotype label could not be parsed or is not in the catalog.
    #[error("Invalid genotype '{0}'")]
    InvalidGenotype(String),

    /// A configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(String),

    /// A configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl From<std::io::Error> for ConfigurationError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(format!("JSON error: {e}"))
    }
}

/// Errors raised when a data-model invariant does not hold.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    /// A census does not cover exactly the catalog's genotypes.
    #[error("Census covers {actual} genotypes but the catalog has {expected}")]
    CensusSize { expected: usize, actual: usize },

    /// A census was assembled without an entry for a catalog genotype.
    #[error("Census is missing catalog genotype {0}")]
    MissingGenotype(String),

    /// A census was built against a different genotype catalog.
    #[error("Census belongs to a different genotype catalog")]
    ForeignCatalog,

    /// A genotype was looked up that the catalog does not contain.
    #[error("Genotype {0} is not part of the catalog")]
    UnknownGenotype(String),

    /// Two parents of a cross have different numbers of loci.
    #[error("Parents have different numbers of loci: {left} vs {right}")]
    LociMismatch { left: usize, right: usize },

    /// Offspring probabilities of a cross do not sum to one.
    #[error("Offspring probabilities sum to {0}, expected 1.0")]
    ProbabilityMass(f64),
}

/// A population total of zero was encountered where a division by it is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Population extinct at generation {generation}")]
pub struct PopulationExtinct {
    /// Generation index at which the empty census was observed.
    pub generation: usize,
}

/// Umbrella error for engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
    #[error(transparent)]
    Extinct(#[from] PopulationExtinct),
}

impl SimulationError {
    /// Whether the error is a recoverable extinction rather than a fatal fault.
    pub fn is_extinction(&self) -> bool {
        matches!(self, Self::Extinct(_))
    }
}
