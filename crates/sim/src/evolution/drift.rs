//! Genetic drift as multiplicative count noise.
//!
//! Every male and female count is multiplied by its own uniform random
//! factor on `[1 - a, 1 + a]`. The amplitude `a` shrinks as the population
//! approaches carrying capacity, so small populations drift the most.

use rand::Rng;

use crate::base::RoundingPolicy;
use crate::simulation::Census;

/// Drift amplitude for a population of `size` individuals.
///
/// `max_drift * (1 - size / K)`, or `max_drift` when `K` is unset or zero.
/// The sign is kept; [`apply_drift`] uses the magnitude.
pub fn drift_amplitude(size: f64, max_drift: f64, carrying_capacity: Option<f64>) -> f64 {
    match carrying_capacity {
        Some(k) if k != 0.0 => max_drift * (1.0 - size / k),
        _ => max_drift,
    }
}

/// Perturb every count by an independent factor and round.
///
/// Factors are drawn in genotype order, male before female. Results are
/// clamped at zero. A zero amplitude returns the census unchanged without
/// consuming randomness.
pub fn apply_drift<R: Rng + ?Sized>(
    census: &Census,
    amplitude: f64,
    rng: &mut R,
    rounding: RoundingPolicy,
) -> Census {
    let a = amplitude.abs();
    if a == 0.0 || !a.is_finite() {
        return census.clone();
    }
    let range = (1.0 - a)..=(1.0 + a);
    census.map_counts(|_, record| {
        let male = record.male * rng.random_range(range.clone());
        let female = record.female * rng.random_range(range.clone());
        (rounding.round(male), rounding.round(female))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::rng::master_rng;
    use crate::base::FitnessValue;
    use crate::genome::GenotypeCatalog;
    use crate::simulation::GenotypeRecord;
    use std::sync::Arc;

    fn census(count: f64) -> Census {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        Census::from_records(
            catalog,
            vec![GenotypeRecord::new(count, count, FitnessValue::REFERENCE, 0.0); 3],
        )
        .unwrap()
    }

    #[test]
    fn test_amplitude_tracks_capacity() {
        assert_eq!(drift_amplitude(50.0, 0.2, Some(100.0)), 0.1);
        assert_eq!(drift_amplitude(100.0, 0.2, Some(100.0)), 0.0);
        assert!(drift_amplitude(200.0, 0.2, Some(100.0)) < 0.0);
        assert_eq!(drift_amplitude(50.0, 0.2, None), 0.2);
        assert_eq!(drift_amplitude(50.0, 0.2, Some(0.0)), 0.2);
    }

    #[test]
    fn test_zero_amplitude_is_identity() {
        let mut rng = master_rng(Some(1));
        let before = census(40.0);
        assert_eq!(apply_drift(&before, 0.0, &mut rng, RoundingPolicy::default()), before);
    }

    #[test]
    fn test_counts_stay_within_amplitude() {
        let mut rng = master_rng(Some(7));
        let drifted = apply_drift(&census(100.0), 0.1, &mut rng, RoundingPolicy::default());
        for record in drifted.records() {
            assert!((90.0..=110.0).contains(&record.male));
            assert!((90.0..=110.0).contains(&record.female));
            assert_eq!(record.male.fract(), 0.0);
        }
    }

    #[test]
    fn test_large_amplitude_never_goes_negative() {
        let mut rng = master_rng(Some(3));
        for _ in 0..50 {
            let drifted = apply_drift(&census(10.0), 3.0, &mut rng, RoundingPolicy::default());
            assert!(drifted.records().iter().all(|r| r.male >= 0.0 && r.female >= 0.0));
        }
    }

    #[test]
    fn test_same_seed_same_drift() {
        let policy = RoundingPolicy::default();
        let a = apply_drift(&census(500.0), 0.3, &mut master_rng(Some(9)), policy);
        let b = apply_drift(&census(500.0), 0.3, &mut master_rng(Some(9)), policy);
        assert_eq!(a, b);
    }
}
