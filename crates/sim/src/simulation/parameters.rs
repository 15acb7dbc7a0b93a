//! Population-dynamics parameters.
//!
//! These are the knobs of the per-generation pipeline: growth, capacity,
//! drift, mutation, an optional one-time bottleneck, how offspring counts are
//! scaled and how counts are rounded.

use serde::{Deserialize, Serialize};

use crate::base::RoundingPolicy;
use crate::errors::ConfigurationError;

/// One-time forced contraction of the population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    /// Generation index at which the bottleneck fires
    #[serde(alias = "bottleneck_yr")]
    pub generation: usize,
    /// Population size the next generation is clamped to
    #[serde(alias = "bottleneck_N")]
    pub size: f64,
}

impl Bottleneck {
    pub fn new(generation: usize, size: f64) -> Self {
        Self { generation, size }
    }
}

/// How the offspring distribution is scaled to a census size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffspringScaling {
    /// Scale to the growth target
    #[default]
    Target,
    /// Scale to the growth target times the growth rate
    TargetTimesRate,
}

impl OffspringScaling {
    /// Total number of offspring for a growth target of `next_n`.
    pub fn offspring_total(self, next_n: f64, growth_rate: f64) -> f64 {
        match self {
            Self::Target => next_n,
            Self::TargetTimesRate => next_n * growth_rate,
        }
    }
}

/// Parameters of the generation-update pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationParams {
    /// Growth rate `r`
    pub growth_rate: f64,
    /// Carrying capacity `K`; growth is exponential when unset or zero
    pub carrying_capacity: Option<f64>,
    /// Drift amplitude ceiling
    pub max_drift: f64,
    /// Per-slot mutation probability
    pub mutation_rate: f64,
    /// Optional one-time bottleneck
    pub bottleneck: Option<Bottleneck>,
    /// Unset uses the engine's default scaling
    pub offspring_scaling: Option<OffspringScaling>,
    pub rounding: RoundingPolicy,
}

impl Default for PopulationParams {
    fn default() -> Self {
        Self {
            growth_rate: 0.0,
            carrying_capacity: None,
            max_drift: 0.0,
            mutation_rate: 0.0,
            bottleneck: None,
            offspring_scaling: None,
            rounding: RoundingPolicy::HalfEven,
        }
    }
}

impl PopulationParams {
    /// Check every parameter range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check(
            "growth_rate",
            self.growth_rate,
            self.growth_rate.is_finite(),
            "a finite number",
        )?;
        if let Some(k) = self.carrying_capacity {
            check("carrying_capacity", k, k.is_finite() && k >= 0.0, "a non-negative number")?;
        }
        check(
            "max_drift",
            self.max_drift,
            self.max_drift.is_finite() && self.max_drift >= 0.0,
            "a non-negative number",
        )?;
        check(
            "mutation_rate",
            self.mutation_rate,
            (0.0..=1.0).contains(&self.mutation_rate),
            "a probability in [0, 1]",
        )?;
        if let Some(bottleneck) = &self.bottleneck {
            check(
                "bottleneck_N",
                bottleneck.size,
                bottleneck.size.is_finite() && bottleneck.size >= 1.0,
                "at least one individual",
            )?;
        }
        Ok(())
    }

    /// Capacity used by growth and drift, treating zero as unset.
    pub fn effective_capacity(&self) -> Option<f64> {
        self.carrying_capacity.filter(|&k| k != 0.0)
    }
}

pub(crate) fn check(
    name: &'static str,
    value: f64,
    ok: bool,
    expected: &'static str,
) -> Result<(), ConfigurationError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidParameter {
            name,
            value,
            expected,
        })
    }
}
