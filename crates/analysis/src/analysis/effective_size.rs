//! Effective population size estimators
//!
//! Four estimators are reported per generation `i`, with `t = i + 1`:
//!
//! | estimator | formula |
//! |-----------|---------|
//! | sex ratio | `4·Nm·Nf / (Nm + Nf)` |
//! | size variation | harmonic mean of `N_0 ..= N_i` |
//! | allele variation | `N·(1 − σ)`, `σ = Σ p(1−p) · (1 − 1/(2N))^t`; `N` when `σ = 0` |
//! | inbreeding | `N·(1 − F)`, `F = 1 − (1 − 1/N)^t` |
//!
//! The allele-variation estimator uses allele frequencies pooled over all loci.
//!
//! # References
//!
//! Hartl, D. L., & Clark, A. G. Principles of Population Genetics.

use speciation_sim::errors::PopulationExtinct;
use speciation_sim::simulation::{GenerationHistory, Sex};

use crate::analysis::composition::census_allele_frequencies;
use crate::analysis::utils::{harmonic_mean, living_total, try_per_generation};

/// Effective population size estimates of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveSize {
    pub sex_ratio: f64,
    pub size_variation: f64,
    pub allele_variation: f64,
    pub inbreeding: f64,
}

/// Ne from an unequal sex ratio.
pub fn ne_sex_ratio(males: f64, females: f64) -> f64 {
    4.0 * males * females / (males + females)
}

/// Ne from the drift variance of allele frequencies after `t` generations.
pub fn ne_allele_variation(frequencies: &[f64], size: f64, t: u32) -> f64 {
    let heterozygosity: f64 = frequencies.iter().map(|p| p * (1.0 - p)).sum();
    let sigma = heterozygosity * (1.0 - 1.0 / (2.0 * size)).powi(t as i32);
    if sigma == 0.0 {
        size
    } else {
        size * (1.0 - sigma)
    }
}

/// Ne from the inbreeding coefficient accumulated over `t` generations.
pub fn ne_inbreeding(size: f64, t: u32) -> f64 {
    let inbreeding = 1.0 - (1.0 - 1.0 / size).powi(t as i32);
    size * (1.0 - inbreeding)
}

/// All four estimators for every generation.
///
/// # Errors
/// Returns [`PopulationExtinct`] for the first generation with no individuals.
pub fn effective_population_size(
    history: &GenerationHistory,
) -> Result<Vec<EffectiveSize>, PopulationExtinct> {
    let sizes: Vec<f64> = history.iter().map(|c| c.total()).collect();
    try_per_generation(history, |generation, census| {
        let size = living_total(census, generation)?;
        let t = generation as u32 + 1;
        let frequencies = census_allele_frequencies(census, generation)?;
        let size_variation = harmonic_mean(&sizes[..=generation])
            .ok_or_else(|| earliest_extinction(&sizes[..=generation]))?;
        Ok(EffectiveSize {
            sex_ratio: ne_sex_ratio(census.total_of(Sex::Male), census.total_of(Sex::Female)),
            size_variation,
            allele_variation: ne_allele_variation(&frequencies, size, t),
            inbreeding: ne_inbreeding(size, t),
        })
    })
}

fn earliest_extinction(sizes: &[f64]) -> PopulationExtinct {
    PopulationExtinct {
        generation: sizes.iter().position(|&n| n <= 0.0).unwrap_or_default(),
    }
}
