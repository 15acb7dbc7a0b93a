//! Viability selection on genotype counts.
//!
//! Fitness is the relative survival of a genotype: each generation the number
//! of males and females carrying it is multiplied by its fitness before
//! mating. Fitness is measured against a reference genotype pinned at 1.0, so
//! survivors never outnumber the census they came from.
//!
//! ## Fitness sources
//! - **Intrinsic**: the value stored on the genotype's census record
//! - **Local**: one value per genotype sampled from a spatial fitness field at
//!   a deme's coordinates

use crate::base::{FitnessValue, RoundingPolicy};
use crate::genome::GenotypeId;
use crate::simulation::{Census, GenotypeRecord};

/// Source of the fitness applied to each genotype during selection.
pub trait FitnessLandscape {
    /// Fitness of `genotype`, whose current record is `record`.
    fn fitness_of(&self, genotype: GenotypeId, record: &GenotypeRecord) -> FitnessValue;
}

/// Uses the fitness stored on each census record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntrinsicFitness;

impl FitnessLandscape for IntrinsicFitness {
    #[inline]
    fn fitness_of(&self, _genotype: GenotypeId, record: &GenotypeRecord) -> FitnessValue {
        record.fitness
    }
}

/// Per-genotype fitness of one location, indexed by genotype id.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFitness {
    values: Vec<FitnessValue>,
}

impl LocalFitness {
    pub fn new(values: Vec<FitnessValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[FitnessValue] {
        &self.values
    }
}

impl FitnessLandscape for LocalFitness {
    #[inline]
    fn fitness_of(&self, genotype: GenotypeId, _record: &GenotypeRecord) -> FitnessValue {
        self.values[genotype.index()]
    }
}

impl<L: FitnessLandscape + ?Sized> FitnessLandscape for &L {
    fn fitness_of(&self, genotype: GenotypeId, record: &GenotypeRecord) -> FitnessValue {
        (**self).fitness_of(genotype, record)
    }
}

/// Multiply male and female counts by fitness and round.
///
/// Both sexes are computed from the input census, so the result does not
/// depend on the order in which they are adjusted.
pub fn apply_fitness(
    census: &Census,
    landscape: &impl FitnessLandscape,
    rounding: RoundingPolicy,
) -> Census {
    census.map_counts(|id, record| {
        let fitness = landscape.fitness_of(id, record);
        (
            rounding.round(fitness.survivors(record.male)),
            rounding.round(fitness.survivors(record.female)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GenotypeCatalog;
    use std::sync::Arc;

    fn census() -> Census {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        Census::from_records(
            catalog,
            vec![
                GenotypeRecord::new(10.0, 20.0, FitnessValue::new(1.0), 0.0),
                GenotypeRecord::new(10.0, 20.0, FitnessValue::new(0.5), 0.0),
                GenotypeRecord::new(5.0, 3.0, FitnessValue::new(0.5), 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_intrinsic_fitness_scales_both_sexes() {
        let adjusted = apply_fitness(&census(), &IntrinsicFitness, RoundingPolicy::HalfEven);
        let counts: Vec<(f64, f64)> = adjusted
            .records()
            .iter()
            .map(|r| (r.male, r.female))
            .collect();
        // 2.5 and 1.5 round to even
        assert_eq!(counts, [(10.0, 20.0), (5.0, 10.0), (2.0, 2.0)]);
    }

    #[test]
    fn test_half_up_rounding() {
        let adjusted = apply_fitness(&census(), &IntrinsicFitness, RoundingPolicy::HalfUp);
        let last = adjusted.get(GenotypeId::new(2));
        assert_eq!((last.male, last.female), (3.0, 2.0));
    }

    #[test]
    fn test_local_fitness_overrides_record() {
        let local = LocalFitness::new(vec![
            FitnessValue::LETHAL,
            FitnessValue::REFERENCE,
            FitnessValue::new(0.1),
        ]);
        let adjusted = apply_fitness(&census(), &local, RoundingPolicy::HalfEven);
        assert_eq!(adjusted.get(GenotypeId::new(0)).total(), 0.0);
        assert_eq!(adjusted.get(GenotypeId::new(1)).total(), 30.0);
        // Intrinsic fitness is kept on the record
        assert_eq!(adjusted.get(GenotypeId::new(1)).fitness, FitnessValue::new(0.5));
    }
}
