//! Utility functions for analysis module
//!
//! Shared helper functions used across analysis submodules.

use rayon::prelude::*;
use speciation_sim::errors::PopulationExtinct;
use speciation_sim::simulation::{Census, GenerationHistory};

/// Harmonic mean of strictly positive values; `None` if empty or any value is zero.
pub fn harmonic_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|&v| v <= 0.0) {
        return None;
    }
    let reciprocal_sum: f64 = values.iter().map(|v| 1.0 / v).sum();
    Some(values.len() as f64 / reciprocal_sum)
}

/// Population size of `census`, or an extinction error at `generation`.
#[inline]
pub fn living_total(census: &Census, generation: usize) -> Result<f64, PopulationExtinct> {
    let total = census.total();
    if total > 0.0 {
        Ok(total)
    } else {
        Err(PopulationExtinct { generation })
    }
}

/// Apply `f` to every generation in parallel, keeping generation order.
pub(crate) fn per_generation<T, F>(history: &GenerationHistory, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize, &Census) -> T + Sync + Send,
{
    history
        .as_slice()
        .par_iter()
        .enumerate()
        .map(|(generation, census)| f(generation, census))
        .collect()
}

/// Like [`per_generation`], failing at the first extinct generation.
pub(crate) fn try_per_generation<T, F>(
    history: &GenerationHistory,
    f: F,
) -> Result<Vec<T>, PopulationExtinct>
where
    T: Send,
    F: Fn(usize, &Census) -> Result<T, PopulationExtinct> + Sync + Send,
{
    // Collected in order: the earliest extinct generation is reported
    per_generation(history, f).into_iter().collect()
}
