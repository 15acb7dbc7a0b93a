//! Mutation between genotypes.
//!
//! Individuals of genotype A turn into genotype B at a probability that decays
//! geometrically with the number of allele slots separating the two:
//! `rate^distance`. Closely related genotypes therefore exchange individuals
//! far more readily than distant ones.
//!
//! Moves are deterministic given the counts. They are all computed from the
//! pre-mutation census and applied together, and both sexes of the source
//! genotype lose the same number of individuals.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;
use crate::genome::GenotypeCatalog;
use crate::simulation::Census;

/// Genotype-to-genotype mutation model for one catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationModel {
    rate: f64,
    size: usize,
    /// `rate^distance` for every ordered pair, row-major; zero on the diagonal
    transfer: Vec<f64>,
}

impl MutationModel {
    /// Precompute pairwise transfer probabilities for `catalog`.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::InvalidParameter`] if `rate` is outside `[0, 1]`.
    pub fn new(rate: f64, catalog: &GenotypeCatalog) -> Result<Self, ConfigurationError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigurationError::InvalidParameter {
                name: "mutation_rate",
                value: rate,
                expected: "a probability in [0, 1]",
            });
        }

        let size = catalog.len();
        let mut transfer = vec![0.0; size * size];
        for a in catalog.ids() {
            for b in catalog.ids() {
                if a != b {
                    let distance = catalog.distance(a, b) as i32;
                    transfer[a.index() * size + b.index()] = rate.powi(distance);
                }
            }
        }

        Ok(Self {
            rate,
            size,
            transfer,
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Probability that an individual of genotype `a` mutates into `b`.
    #[inline]
    pub fn transfer(&self, a: usize, b: usize) -> f64 {
        self.transfer[a * self.size + b]
    }

    /// Apply one generation of mutation.
    ///
    /// `floor(total_A * p / (size * 2))` individuals of each sex move from A
    /// to B. Outflow from A is allocated in genotype order and stops once it
    /// reaches the smaller of A's male and female counts, so no count can
    /// become negative.
    pub fn apply(&self, census: &Census) -> Census {
        if self.rate == 0.0 || self.size < 2 {
            return census.clone();
        }

        let records = census.records();
        let divisor = (self.size * 2) as f64;
        let mut delta = vec![0.0; self.size];
        for (a, source) in records.iter().enumerate() {
            let total = source.total();
            if total <= 0.0 {
                continue;
            }
            let mut budget = source.male.min(source.female);
            for b in (0..self.size).filter(|&b| b != a) {
                if budget <= 0.0 {
                    break;
                }
                let moved = (total * self.transfer(a, b) / divisor).floor().min(budget);
                if moved > 0.0 {
                    budget -= moved;
                    delta[a] -= moved;
                    delta[b] += moved;
                }
            }
        }

        census.map_counts(|id, record| {
            let d = delta[id.index()];
            ((record.male + d).max(0.0), (record.female + d).max(0.0))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FitnessValue;
    use crate::genome::GenotypeId;
    use crate::simulation::GenotypeRecord;
    use std::sync::Arc;

    fn census(catalog: &Arc<GenotypeCatalog>, counts: &[(f64, f64)]) -> Census {
        let records = counts
            .iter()
            .map(|&(m, f)| GenotypeRecord::new(m, f, FitnessValue::REFERENCE, 0.0))
            .collect();
        Census::from_records(Arc::clone(catalog), records).unwrap()
    }

    #[test]
    fn test_rejects_invalid_rate() {
        let catalog = GenotypeCatalog::new(1, 2).unwrap();
        assert!(MutationModel::new(-0.1, &catalog).is_err());
        assert!(MutationModel::new(1.5, &catalog).is_err());
        assert!(MutationModel::new(0.0, &catalog).is_ok());
    }

    #[test]
    fn test_transfer_decays_with_distance() {
        let catalog = GenotypeCatalog::new(1, 2).unwrap();
        let model = MutationModel::new(0.1, &catalog).unwrap();
        // A1/A1 -> A1/A2 differs in one slot, A1/A1 -> A2/A2 in two
        assert!((model.transfer(0, 1) - 0.1).abs() < 1e-15);
        assert!((model.transfer(0, 2) - 0.01).abs() < 1e-15);
        assert_eq!(model.transfer(1, 1), 0.0);
    }

    #[test]
    fn test_moves_from_snapshot() {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        let model = MutationModel::new(0.5, &catalog).unwrap();
        let before = census(&catalog, &[(60.0, 60.0), (0.0, 0.0), (0.0, 0.0)]);
        let after = model.apply(&before);

        // 120 * 0.5 / 6 = 10 to the heterozygote, 120 * 0.25 / 6 = 5 to A2/A2
        assert_eq!(after.get(GenotypeId::new(0)).male, 45.0);
        assert_eq!(after.get(GenotypeId::new(1)).female, 10.0);
        assert_eq!(after.get(GenotypeId::new(2)).male, 5.0);
        assert_eq!(after.total(), before.total());
    }

    #[test]
    fn test_never_negative_for_any_rate() {
        let catalog = Arc::new(GenotypeCatalog::new(2, 2).unwrap());
        let counts: Vec<(f64, f64)> = (0..catalog.len())
            .map(|i| ((i * 7 % 5) as f64, (i * 3 % 11) as f64 * 40.0))
            .collect();
        let before = census(&catalog, &counts);
        for step in 0..=10 {
            let model = MutationModel::new(step as f64 / 10.0, &catalog).unwrap();
            let after = model.apply(&before);
            assert!(after.records().iter().all(|r| r.male >= 0.0 && r.female >= 0.0));
            assert!((after.total() - before.total()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let catalog = Arc::new(GenotypeCatalog::new(1, 3).unwrap());
        let model = MutationModel::new(0.0, &catalog).unwrap();
        let before = census(&catalog, &[(3.0, 4.0); 6]);
        assert_eq!(model.apply(&before), before);
    }
}
