//! Genotype and allele composition
//!
//! Counts are summed over both sexes. Allele counts tally every allele copy,
//! so a homozygote contributes two copies of its allele.
//!
//! Frequencies come in two flavors:
//! - pooled over all loci: every allele copy of every locus in one
//!   distribution (used by the allele-variation effective size)
//! - per locus: the alleles of one locus form their own distribution

use std::collections::BTreeMap;

use speciation_sim::errors::PopulationExtinct;
use speciation_sim::genome::{Allele, Genotype};
use speciation_sim::simulation::{Census, GenerationHistory};

use crate::analysis::utils::{living_total, per_generation, try_per_generation};

/// Allele copy counts of one census, indexed `locus * alleles + variant`.
pub fn census_allele_counts(census: &Census) -> Vec<f64> {
    let catalog = census.catalog();
    let alleles = catalog.alleles_per_locus();
    let mut counts = vec![0.0; catalog.loci() * alleles];
    for (id, record) in catalog.ids().zip(census.records()) {
        let total = record.total();
        if total == 0.0 {
            continue;
        }
        for (locus, pair) in catalog.slots(id).iter().enumerate() {
            for &variant in pair {
                counts[locus * alleles + variant as usize] += total;
            }
        }
    }
    counts
}

/// Pooled allele frequencies of one census, indexed like
/// [`census_allele_counts`].
pub fn census_allele_frequencies(
    census: &Census,
    generation: usize,
) -> Result<Vec<f64>, PopulationExtinct> {
    living_total(census, generation)?;
    let counts = census_allele_counts(census);
    let copies: f64 = counts.iter().sum();
    Ok(counts.into_iter().map(|c| c / copies).collect())
}

fn keyed_by_allele(census: &Census, values: Vec<f64>) -> BTreeMap<Allele, f64> {
    census.catalog().all_alleles().zip(values).collect()
}

/// Genotype counts of every generation.
pub fn genotype_counts(history: &GenerationHistory) -> Vec<BTreeMap<Genotype, f64>> {
    per_generation(history, |_, census| {
        census.iter().map(|(g, r)| (g.clone(), r.total())).collect()
    })
}

/// Genotype frequencies of every generation.
///
/// # Errors
/// Returns [`PopulationExtinct`] for the first generation with no individuals.
pub fn genotype_frequencies(
    history: &GenerationHistory,
) -> Result<Vec<BTreeMap<Genotype, f64>>, PopulationExtinct> {
    try_per_generation(history, |generation, census| {
        let total = living_total(census, generation)?;
        Ok(census
            .iter()
            .map(|(g, r)| (g.clone(), r.total() / total))
            .collect())
    })
}

/// Allele counts of every generation, over all loci.
pub fn allele_counts(history: &GenerationHistory) -> Vec<BTreeMap<Allele, f64>> {
    per_generation(history, |_, census| {
        keyed_by_allele(census, census_allele_counts(census))
    })
}

/// Allele frequencies of every generation, pooled over all loci.
///
/// # Errors
/// Returns [`PopulationExtinct`] for the first generation with no individuals.
pub fn allele_frequencies(
    history: &GenerationHistory,
) -> Result<Vec<BTreeMap<Allele, f64>>, PopulationExtinct> {
    try_per_generation(history, |generation, census| {
        let freqs = census_allele_frequencies(census, generation)?;
        Ok(keyed_by_allele(census, freqs))
    })
}

/// Allele frequencies at one locus, for every generation. Each generation's
/// values sum to one.
///
/// # Panics
/// Panics if `locus` is not a locus of the history's catalog.
pub fn locus_allele_frequencies(
    history: &GenerationHistory,
    locus: usize,
) -> Result<Vec<BTreeMap<Allele, f64>>, PopulationExtinct> {
    let loci = history.initial().catalog().loci();
    assert!(locus < loci, "locus {locus} out of range for {loci} loci");
    try_per_generation(history, |generation, census| {
        let total = living_total(census, generation)?;
        let alleles = census.catalog().alleles_per_locus();
        let counts = census_allele_counts(census);
        Ok(census
            .catalog()
            .alleles_at(locus)
            .zip(&counts[locus * alleles..(locus + 1) * alleles])
            .map(|(allele, &c)| (allele, c / (2.0 * total)))
            .collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use speciation_sim::base::FitnessValue;
    use speciation_sim::genome::GenotypeCatalog;
    use speciation_sim::simulation::GenotypeRecord;
    use std::sync::Arc;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn census(catalog: &Arc<GenotypeCatalog>, counts: &[f64]) -> Census {
        Census::from_records(
            Arc::clone(catalog),
            counts
                .iter()
                .map(|&c| GenotypeRecord::new(c, c, FitnessValue::REFERENCE, 0.0))
                .collect(),
        )
        .unwrap()
    }

    fn g(label: &str) -> Genotype {
        label.parse().unwrap()
    }

    fn a(label: &str) -> Allele {
        label.parse().unwrap()
    }

    #[test]
    fn test_single_locus_composition() {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        // A1/A1: 20, A1/A2: 40, A2/A2: 40 individuals
        let history = GenerationHistory::new(census(&catalog, &[10.0, 20.0, 20.0]));

        let genotypes = genotype_frequencies(&history).unwrap();
        assert!(approx_eq(genotypes[0][&g("A1/A2")], 0.4));

        let counts = allele_counts(&history);
        assert_eq!(counts[0][&a("A1")], 80.0);
        assert_eq!(counts[0][&a("A2")], 120.0);

        let freqs = allele_frequencies(&history).unwrap();
        assert!(approx_eq(freqs[0][&a("A1")], 0.4));
        assert!(approx_eq(freqs[0].values().sum::<f64>(), 1.0));
    }

    #[test]
    fn test_pooled_and_per_locus_frequencies() {
        let catalog = Arc::new(GenotypeCatalog::new(2, 2).unwrap());
        let mut counts = vec![0.0; 9];
        counts[catalog.id_of(&g("A1/A1 B1/B2")).unwrap().index()] = 5.0;
        counts[catalog.id_of(&g("A2/A2 B2/B2")).unwrap().index()] = 15.0;
        let history = GenerationHistory::new(census(&catalog, &counts));

        let pooled = allele_frequencies(&history).unwrap();
        assert!(approx_eq(pooled[0].values().sum::<f64>(), 1.0));
        assert!(approx_eq(pooled[0][&a("A1")], 20.0 / 160.0));

        let locus_b = locus_allele_frequencies(&history, 1).unwrap();
        assert!(approx_eq(locus_b[0][&a("B1")], 10.0 / 80.0));
        assert!(approx_eq(locus_b[0].values().sum::<f64>(), 1.0));
    }

    #[test]
    fn test_extinct_generation_is_reported() {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        let mut history = GenerationHistory::new(census(&catalog, &[1.0, 1.0, 1.0]));
        history.push(census(&catalog, &[0.0, 0.0, 0.0])).unwrap();

        assert_eq!(
            genotype_frequencies(&history).unwrap_err(),
            PopulationExtinct { generation: 1 }
        );
        assert!(allele_frequencies(&history).is_err());
        // Counts stay defined
        assert_eq!(genotype_counts(&history)[1][&g("A1/A1")], 0.0);
    }
}
