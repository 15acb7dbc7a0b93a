//! Temporal analysis
//!
//! Functions for tracking a single genotype or allele over time.

use speciation_sim::errors::{InvariantViolation, PopulationExtinct};
use speciation_sim::genome::{Allele, Genotype};
use speciation_sim::simulation::GenerationHistory;
use thiserror::Error;

use crate::analysis::composition::census_allele_counts;
use crate::analysis::utils::{living_total, per_generation, try_per_generation};

/// Errors from trajectory queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    #[error(transparent)]
    Extinct(#[from] PopulationExtinct),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
    /// The allele does not exist in the history's genotype space.
    #[error("Allele {0} is not part of the catalog")]
    UnknownAllele(Allele),
}

/// Count of one genotype in every generation.
///
/// # Arguments
///
/// * `history` - Generation history to scan
/// * `genotype` - Genotype to track
///
/// # Returns
///
/// Number of individuals (both sexes) carrying `genotype`, per generation
pub fn genotype_trajectory(
    history: &GenerationHistory,
    genotype: &Genotype,
) -> Result<Vec<f64>, TrajectoryError> {
    let id = history.initial().catalog().require(genotype)?;
    Ok(per_generation(history, |_, census| census.get(id).total()))
}

/// Frequency of one allele within its locus, for every generation.
///
/// # Errors
///
/// Fails for an allele outside the catalog, or at the first generation with
/// no individuals.
pub fn allele_trajectory(
    history: &GenerationHistory,
    allele: Allele,
) -> Result<Vec<f64>, TrajectoryError> {
    let catalog = history.initial().catalog();
    let alleles = catalog.alleles_per_locus();
    if allele.locus() >= catalog.loci() || allele.variant() >= alleles {
        return Err(TrajectoryError::UnknownAllele(allele));
    }
    let index = allele.locus() * alleles + allele.variant();

    let trajectory = try_per_generation(history, |generation, census| {
        let total = living_total(census, generation)?;
        Ok(census_allele_counts(census)[index] / (2.0 * total))
    })?;
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use speciation_sim::base::FitnessValue;
    use speciation_sim::genome::GenotypeCatalog;
    use speciation_sim::simulation::{Census, GenotypeRecord};
    use std::sync::Arc;

    fn history() -> GenerationHistory {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        let census = |counts: [f64; 3]| {
            Census::from_records(
                Arc::clone(&catalog),
                counts
                    .iter()
                    .map(|&c| GenotypeRecord::new(c, c, FitnessValue::REFERENCE, 0.0))
                    .collect(),
            )
            .unwrap()
        };
        let mut history = GenerationHistory::new(census([25.0, 50.0, 25.0]));
        history.push(census([50.0, 50.0, 0.0])).unwrap();
        history
    }

    #[test]
    fn test_genotype_trajectory() {
        let h = history();
        let het: Genotype = "A1/A2".parse().unwrap();
        assert_eq!(genotype_trajectory(&h, &het).unwrap(), [100.0, 100.0]);

        let foreign: Genotype = "A1/A3".parse().unwrap();
        assert!(matches!(
            genotype_trajectory(&h, &foreign),
            Err(TrajectoryError::Invariant(_))
        ));
    }

    #[test]
    fn test_allele_trajectory() {
        let h = history();
        let a1: Allele = "A1".parse().unwrap();
        assert_eq!(allele_trajectory(&h, a1).unwrap(), [0.5, 0.75]);

        let b1: Allele = "B1".parse().unwrap();
        assert_eq!(
            allele_trajectory(&h, b1),
            Err(TrajectoryError::UnknownAllele(b1))
        );
    }
}
