use std::fmt;

use serde::{Deserialize, Serialize};

/// Relative fitness of a genotype, constrained to the range [0.0, 1.0].
///
/// One genotype per population is usually pinned to [`FitnessValue::REFERENCE`]
/// so that every other value reads as fitness relative to it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct FitnessValue(f64);

impl FitnessValue {
    /// Fitness of the reference genotype.
    pub const REFERENCE: Self = Self(1.0);

    /// Fitness of a genotype that never survives selection.
    pub const LETHAL: Self = Self(0.0);

    /// Creates a new FitnessValue, clamping the input to [0.0, 1.0].
    ///
    /// NaN is treated as lethal.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::LETHAL;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the inner f64 value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Whether this is the reference fitness of 1.0.
    pub fn is_reference(self) -> bool {
        self.0 == 1.0
    }

    /// Expected number of survivors out of `count` individuals.
    pub fn survivors(self, count: f64) -> f64 {
        count * self.0
    }
}

impl From<FitnessValue> for f64 {
    fn from(fitness: FitnessValue) -> Self {
        fitness.0
    }
}

impl From<f64> for FitnessValue {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Default for FitnessValue {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl fmt::Display for FitnessValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
