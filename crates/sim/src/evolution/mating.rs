//! Random mating with assortative bias and offspring synthesis.
//!
//! Every ordered pair of genotypes `(A, B)`, including `A = B`, mates at a
//! rate proportional to `Nm_A * Nf_B + Nm_B * Nf_A`. The genotype covariance
//! boosts matings between identical genotypes (homogamy) and suppresses
//! matings between different ones. Matings are distributed over offspring
//! genotypes by the cross's Punnett square, then the offspring distribution is
//! scaled to the requested total.

use crate::base::RoundingPolicy;
use crate::errors::{InvariantViolation, PopulationExtinct, SimulationError};
use crate::evolution::InheritanceTable;
use crate::simulation::Census;

/// Relative mating rate of an ordered genotype pair, before normalization.
///
/// # Arguments
/// * `same` - Whether both parents carry the same genotype
/// * `covariance` - Mean covariance of the two genotypes
#[inline]
pub fn assortative_factor(same: bool, covariance: f64) -> f64 {
    if same {
        1.0 + covariance
    } else {
        1.0 - covariance
    }
}

/// Synthesize the next generation from `census`.
///
/// Offspring frequencies are scaled to `offspring_total` and rounded per
/// genotype and sex. Fitness and covariance carry over from `census`.
///
/// # Errors
/// - [`PopulationExtinct`] if the census is empty or no mating can occur
/// - [`InvariantViolation::CensusSize`] if `table` was built for another catalog
pub fn synthesize_offspring(
    census: &Census,
    table: &InheritanceTable,
    offspring_total: f64,
    rounding: RoundingPolicy,
    generation: usize,
) -> Result<Census, SimulationError> {
    if table.size() != census.len() {
        return Err(InvariantViolation::CensusSize {
            expected: table.size(),
            actual: census.len(),
        }
        .into());
    }

    let n = census.total();
    if n <= 0.0 {
        return Err(PopulationExtinct { generation }.into());
    }

    let records = census.records();
    let mut raw = vec![0.0; records.len()];
    for (a, ra) in census.catalog().ids().zip(records) {
        if ra.total() == 0.0 {
            continue;
        }
        for (b, rb) in census.catalog().ids().zip(records) {
            let matings = (ra.male * rb.female + rb.male * ra.female) / n;
            if matings == 0.0 {
                continue;
            }
            let covariance = (ra.covariance + rb.covariance) / 2.0;
            let matings = (matings * assortative_factor(a == b, covariance)).max(0.0);
            table.for_each_offspring(a, b, |child| {
                raw[child.genotype.index()] += matings * child.probability;
            });
        }
    }

    let total: f64 = raw.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(PopulationExtinct { generation }.into());
    }

    Ok(census.map_counts(|id, _| {
        // Each offspring total is split evenly between the sexes
        let per_sex = raw[id.index()] / 2.0 / total * offspring_total;
        (rounding.round(per_sex), rounding.round(per_sex))
    }))
}
