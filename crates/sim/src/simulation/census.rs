//! Genotype census: the full per-genotype population snapshot of one deme at
//! one generation.
//!
//! A census always holds exactly one record per catalog genotype. Zero-count
//! entries are kept. Records are stored densely by [`GenotypeId`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::base::FitnessValue;
use crate::errors::InvariantViolation;
use crate::genome::{Genotype, GenotypeCatalog, GenotypeId};

/// Sex of a sub-population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Counts and genotype-intrinsic parameters of one genotype.
///
/// Counts are reals; they are rounded only where the pipeline materializes
/// whole individuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenotypeRecord {
    /// Number of males
    pub male: f64,
    /// Number of females
    pub female: f64,
    /// Relative fitness
    #[serde(default)]
    pub fitness: FitnessValue,
    /// Assortative-mating bias; positive favours homogamy
    #[serde(default)]
    pub covariance: f64,
}

impl GenotypeRecord {
    pub fn new(male: f64, female: f64, fitness: FitnessValue, covariance: f64) -> Self {
        Self {
            male,
            female,
            fitness,
            covariance,
        }
    }

    /// Males plus females.
    #[inline]
    pub fn total(&self) -> f64 {
        self.male + self.female
    }

    #[inline]
    pub fn count(&self, sex: Sex) -> f64 {
        match sex {
            Sex::Male => self.male,
            Sex::Female => self.female,
        }
    }

    /// Same genotype parameters with different counts.
    #[inline]
    pub fn with_counts(&self, male: f64, female: f64) -> Self {
        Self {
            male,
            female,
            ..*self
        }
    }
}

impl Default for GenotypeRecord {
    fn default() -> Self {
        Self {
            male: 0.0,
            female: 0.0,
            fitness: FitnessValue::REFERENCE,
            covariance: 0.0,
        }
    }
}

/// Population snapshot keyed by genotype.
#[derive(Debug, Clone)]
pub struct Census {
    catalog: Arc<GenotypeCatalog>,
    records: Vec<GenotypeRecord>,
}

impl Census {
    /// A census with a default (empty, reference fitness) record for every genotype.
    pub fn zeroed(catalog: Arc<GenotypeCatalog>) -> Self {
        let records = vec![GenotypeRecord::default(); catalog.len()];
        Self { catalog, records }
    }

    /// Build from records in catalog order.
    ///
    /// # Errors
    /// Returns [`InvariantViolation::CensusSize`] if the number of records does
    /// not match the catalog.
    pub fn from_records(
        catalog: Arc<GenotypeCatalog>,
        records: Vec<GenotypeRecord>,
    ) -> Result<Self, InvariantViolation> {
        if records.len() != catalog.len() {
            return Err(InvariantViolation::CensusSize {
                expected: catalog.len(),
                actual: records.len(),
            });
        }
        Ok(Self { catalog, records })
    }

    /// Build from genotype-keyed entries.
    ///
    /// # Errors
    /// Fails if an entry names a genotype outside the catalog, or if any
    /// catalog genotype has no entry.
    pub fn from_genotypes(
        catalog: Arc<GenotypeCatalog>,
        entries: impl IntoIterator<Item = (Genotype, GenotypeRecord)>,
    ) -> Result<Self, InvariantViolation> {
        let mut slots: Vec<Option<GenotypeRecord>> = vec![None; catalog.len()];
        for (genotype, record) in entries {
            let id = catalog.require(&genotype)?;
            slots[id.index()] = Some(record);
        }
        let records = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| {
                    InvariantViolation::MissingGenotype(
                        catalog.genotype(GenotypeId::new(i)).to_string(),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { catalog, records })
    }

    /// The shared catalog this census is keyed by.
    pub fn catalog(&self) -> &Arc<GenotypeCatalog> {
        &self.catalog
    }

    /// Number of genotype entries (always the catalog size).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in catalog order.
    pub fn records(&self) -> &[GenotypeRecord] {
        &self.records
    }

    /// Mutable records in catalog order. The key set itself cannot change.
    pub fn records_mut(&mut self) -> &mut [GenotypeRecord] {
        &mut self.records
    }

    #[inline]
    pub fn get(&self, id: GenotypeId) -> &GenotypeRecord {
        &self.records[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: GenotypeId) -> &mut GenotypeRecord {
        &mut self.records[id.index()]
    }

    /// Record of a genotype given by value.
    pub fn record(&self, genotype: &Genotype) -> Result<&GenotypeRecord, InvariantViolation> {
        let id = self.catalog.require(genotype)?;
        Ok(&self.records[id.index()])
    }

    /// Genotype/record pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&Genotype, &GenotypeRecord)> {
        self.catalog.genotypes().iter().zip(self.records.iter())
    }

    /// Total number of individuals.
    pub fn total(&self) -> f64 {
        self.records.iter().map(GenotypeRecord::total).sum()
    }

    /// Total number of individuals of one sex.
    pub fn total_of(&self, sex: Sex) -> f64 {
        self.records.iter().map(|r| r.count(sex)).sum()
    }

    /// Whether no individual is left.
    pub fn is_extinct(&self) -> bool {
        self.total() <= 0.0
    }

    /// Same genotype parameters with every count set to zero.
    pub fn emptied(&self) -> Self {
        self.map_counts(|_, _| (0.0, 0.0))
    }

    /// New census whose counts are produced by `f(id, record)`; fitness and
    /// covariance carry over.
    pub fn map_counts(&self, mut f: impl FnMut(GenotypeId, &GenotypeRecord) -> (f64, f64)) -> Self {
        let records = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let (male, female) = f(GenotypeId::new(i), r);
                r.with_counts(male, female)
            })
            .collect();
        Self {
            catalog: Arc::clone(&self.catalog),
            records,
        }
    }

    /// Check that this census is keyed by exactly `catalog`'s genotypes.
    pub fn ensure_catalog(&self, catalog: &GenotypeCatalog) -> Result<(), InvariantViolation> {
        if self.records.len() != catalog.len() {
            return Err(InvariantViolation::CensusSize {
                expected: catalog.len(),
                actual: self.records.len(),
            });
        }
        if *self.catalog != *catalog {
            return Err(InvariantViolation::ForeignCatalog);
        }
        Ok(())
    }

    /// Sum several censuses of the same catalog into one.
    ///
    /// Fitness and covariance become count-weighted means; genotypes absent
    /// everywhere keep the first census's values.
    pub fn pooled<'a>(
        censuses: impl IntoIterator<Item = &'a Census>,
    ) -> Result<Option<Census>, InvariantViolation> {
        let mut iter = censuses.into_iter();
        let Some(first) = iter.next() else {
            return Ok(None);
        };

        let mut sums: Vec<(f64, f64, f64, f64)> = first
            .records
            .iter()
            .map(|r| (r.male, r.female, r.fitness.get() * r.total(), r.covariance * r.total()))
            .collect();
        for census in iter {
            census.ensure_catalog(&first.catalog)?;
            for (acc, r) in sums.iter_mut().zip(census.records.iter()) {
                acc.0 += r.male;
                acc.1 += r.female;
                acc.2 += r.fitness.get() * r.total();
                acc.3 += r.covariance * r.total();
            }
        }

        let records = sums
            .into_iter()
            .zip(first.records.iter())
            .map(|((male, female, fit, cov), base)| {
                let total = male + female;
                if total > 0.0 {
                    GenotypeRecord::new(male, female, FitnessValue::new(fit / total), cov / total)
                } else {
                    base.with_counts(0.0, 0.0)
                }
            })
            .collect();

        Ok(Some(Census {
            catalog: Arc::clone(&first.catalog),
            records,
        }))
    }

    /// Copy into a genotype-keyed map.
    pub fn to_genotype_map(&self) -> BTreeMap<Genotype, GenotypeRecord> {
        self.iter().map(|(g, r)| (g.clone(), *r)).collect()
    }
}

impl PartialEq for Census {
    fn eq(&self, other: &Self) -> bool {
        *self.catalog == *other.catalog && self.records == other.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<GenotypeCatalog> {
        Arc::new(GenotypeCatalog::new(1, 2).unwrap())
    }

    #[test]
    fn test_zeroed_covers_catalog() {
        let census = Census::zeroed(catalog());
        assert_eq!(census.len(), 3);
        assert_eq!(census.total(), 0.0);
        assert!(census.is_extinct());
    }

    #[test]
    fn test_from_records_rejects_wrong_length() {
        let err = Census::from_records(catalog(), vec![GenotypeRecord::default(); 2]).unwrap_err();
        assert_eq!(err, InvariantViolation::CensusSize { expected: 3, actual: 2 });
    }

    #[test]
    fn test_from_genotypes_requires_every_key() {
        let catalog = catalog();
        let entries = vec![
            ("A1/A1".parse().unwrap(), GenotypeRecord::default()),
            ("A2/A2".parse().unwrap(), GenotypeRecord::default()),
        ];
        let err = Census::from_genotypes(Arc::clone(&catalog), entries).unwrap_err();
        assert_eq!(err, InvariantViolation::MissingGenotype("A1/A2".into()));
    }

    #[test]
    fn test_totals_by_sex() {
        let records = vec![
            GenotypeRecord::new(10.0, 5.0, FitnessValue::REFERENCE, 0.0),
            GenotypeRecord::new(1.0, 2.0, FitnessValue::REFERENCE, 0.0),
            GenotypeRecord::new(0.0, 3.0, FitnessValue::REFERENCE, 0.0),
        ];
        let census = Census::from_records(catalog(), records).unwrap();
        assert_eq!(census.total(), 21.0);
        assert_eq!(census.total_of(Sex::Male), 11.0);
        assert_eq!(census.total_of(Sex::Female), 10.0);

        let het: Genotype = "A1/A2".parse().unwrap();
        assert_eq!(census.record(&het).unwrap().total(), 3.0);
    }

    #[test]
    fn test_ensure_catalog_detects_foreign_census() {
        let census = Census::zeroed(Arc::new(GenotypeCatalog::new(1, 3).unwrap()));
        let other = GenotypeCatalog::new(1, 2).unwrap();
        assert!(census.ensure_catalog(&other).is_err());
        assert!(census.ensure_catalog(census.catalog()).is_ok());
    }

    #[test]
    fn test_pooled_sums_counts_and_weights_fitness() {
        let catalog = catalog();
        let a = Census::from_records(
            Arc::clone(&catalog),
            vec![
                GenotypeRecord::new(10.0, 10.0, FitnessValue::new(1.0), 0.0),
                GenotypeRecord::default(),
                GenotypeRecord::default(),
            ],
        )
        .unwrap();
        let b = Census::from_records(
            Arc::clone(&catalog),
            vec![
                GenotypeRecord::new(20.0, 40.0, FitnessValue::new(0.5), 0.0),
                GenotypeRecord::default(),
                GenotypeRecord::default(),
            ],
        )
        .unwrap();

        let pooled = Census::pooled([&a, &b]).unwrap().unwrap();
        let rec = pooled.get(GenotypeId::new(0));
        assert_eq!(rec.male, 30.0);
        assert_eq!(rec.female, 50.0);
        assert!((rec.fitness.get() - 0.625).abs() < 1e-12);
        assert!(Census::pooled(std::iter::empty()).unwrap().is_none());
    }

    #[test]
    fn test_map_counts_keeps_parameters() {
        let mut census = Census::zeroed(catalog());
        census.get_mut(GenotypeId::new(1)).covariance = 0.3;
        let mapped = census.map_counts(|_, _| (2.0, 3.0));
        assert_eq!(mapped.get(GenotypeId::new(1)).covariance, 0.3);
        assert_eq!(mapped.total(), 15.0);
        assert_eq!(mapped.emptied().total(), 0.0);
    }
}
