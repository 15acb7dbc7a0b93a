//! Migration between demes.
//!
//! A deme above its carrying capacity sends the excess fraction
//! `rate = (N - K) / N` of every genotype count to the demes within that
//! genotype's dispersal radius. Each reachable deme receives a share
//! proportional to `1 / distance`, normalized so that migrants are conserved.
//! When no deme is reachable the count stays at its origin.
//!
//! The pass reads every deme's current census and writes fresh censuses;
//! no deme sees another's post-migration state.

use rayon::prelude::*;

use crate::genome::GenotypeId;
use crate::simulation::Census;
use crate::spatial::{GenotypeFields, Grid, Position};

/// Outflow parameters of one origin deme.
#[derive(Debug, Clone)]
struct Outflow {
    rate: f64,
    /// Dispersal radius per genotype
    radius: Vec<usize>,
    /// Sum of `1 / distance` over reachable demes, per genotype
    weight: Vec<f64>,
}

impl Outflow {
    /// Whether genotype `g` actually emigrates from this deme.
    #[inline]
    fn emigrates(&self, g: usize) -> bool {
        self.rate > 0.0 && self.radius[g] > 0 && self.weight[g] > 0.0
    }
}

/// Fraction of a deme's population that leaves it.
///
/// `(N - K) / N` when the deme is above capacity, zero otherwise. Never
/// leaves the range `[0, 1]`.
pub fn emigration_rate(size: f64, carrying_capacity: f64) -> f64 {
    if size > carrying_capacity && size > 0.0 {
        ((size - carrying_capacity) / size).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Dispersal radius of one genotype at one deme.
fn dispersal_radius(
    dispersal: Option<&GenotypeFields>,
    genotype: usize,
    position: Position,
    max_distance: usize,
) -> usize {
    match dispersal {
        Some(fields) => {
            let value = fields
                .field(GenotypeId::new(genotype))
                .get(position.x, position.y);
            // Saturating cast maps NaN and negatives to zero
            (value.trunc() as usize).min(max_distance)
        }
        None => max_distance,
    }
}

/// Run one gene-flow pass over `grid`.
///
/// Returns the post-migration census of every deme in row-major order. Each
/// census keeps its deme's own fitness and covariance.
pub fn migrate(
    grid: &Grid,
    max_distance: usize,
    dispersal: Option<&GenotypeFields>,
) -> Vec<Census> {
    let outflows: Vec<Outflow> = grid
        .demes()
        .par_iter()
        .map(|deme| {
            let census = deme.current();
            let rate = emigration_rate(census.total(), deme.carrying_capacity());
            let radius: Vec<usize> = (0..census.len())
                .map(|g| dispersal_radius(dispersal, g, deme.position(), max_distance))
                .collect();
            let weight = radius
                .iter()
                .map(|&r| {
                    grid.neighborhood(deme.position(), r)
                        .map(|(_, d)| 1.0 / d as f64)
                        .sum::<f64>()
                })
                .collect();
            Outflow {
                rate,
                radius,
                weight,
            }
        })
        .collect();

    grid.demes()
        .par_iter()
        .enumerate()
        .map(|(t, target)| {
            let own = &outflows[t];
            let mut inflow = vec![(0.0, 0.0); target.current().len()];
            for (origin, d) in grid.neighborhood(target.position(), max_distance) {
                let Some(o) = grid.index_of(origin) else {
                    continue;
                };
                let flow = &outflows[o];
                if flow.rate <= 0.0 {
                    continue;
                }
                for (g, (record, acc)) in grid.demes()[o]
                    .current()
                    .records()
                    .iter()
                    .zip(inflow.iter_mut())
                    .enumerate()
                {
                    if d <= flow.radius[g] && flow.emigrates(g) {
                        let share = flow.rate / d as f64 / flow.weight[g];
                        acc.0 += record.male * share;
                        acc.1 += record.female * share;
                    }
                }
            }

            target.current().map_counts(|id, record| {
                let g = id.index();
                let keep = if own.emigrates(g) { 1.0 - own.rate } else { 1.0 };
                let (male_in, female_in) = inflow[g];
                (record.male * keep + male_in, record.female * keep + female_in)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FitnessValue;
    use crate::genome::{GenotypeCatalog, GenotypeId};
    use crate::simulation::GenotypeRecord;
    use crate::spatial::{Deme, ScalarField};
    use std::convert::Infallible;
    use std::sync::Arc;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Row of demes with capacity 100; `counts[i]` males and females per genotype in deme i.
    fn row(counts: &[f64]) -> Grid {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        Grid::new(counts.len(), 1, |p| {
            let c = counts[p.x];
            let census = Census::from_records(
                Arc::clone(&catalog),
                vec![GenotypeRecord::new(c, c, FitnessValue::REFERENCE, 0.0); 3],
            )
            .unwrap();
            Ok::<_, Infallible>(Deme::new(p, 100.0, census))
        })
        .unwrap()
    }

    #[test]
    fn test_rate_is_excess_fraction() {
        assert_eq!(emigration_rate(200.0, 100.0), 0.5);
        assert_eq!(emigration_rate(100.0, 100.0), 0.0);
        assert_eq!(emigration_rate(0.0, 0.0), 0.0);
        assert_eq!(emigration_rate(20.0, -100.0), 1.0);
        assert_eq!(emigration_rate(20.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_negative_capacity_never_creates_individuals() {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        let grid = Grid::new(2, 1, |p| {
            let (count, capacity) = if p.x == 0 { (20.0, -100.0) } else { (0.0, 1000.0) };
            let census = Census::from_records(
                Arc::clone(&catalog),
                vec![GenotypeRecord::new(count, count, FitnessValue::REFERENCE, 0.0); 3],
            )
            .unwrap();
            Ok::<_, Infallible>(Deme::new(p, capacity, census))
        })
        .unwrap();
        let after = migrate(&grid, 1, None);
        for id in catalog.ids() {
            assert_eq!(after[0].get(id).male, 0.0);
            assert_eq!(after[1].get(id).male, 20.0);
            assert_eq!(after[1].get(id).female, 20.0);
        }
    }

    #[test]
    fn test_huge_radius_is_bounded_by_grid() {
        let grid = row(&[0.0, 100.0, 0.0]);
        let after = migrate(&grid, usize::MAX, None);
        let before: f64 = grid.demes().iter().map(|d| d.current().total()).sum();
        let total: f64 = after.iter().map(Census::total).sum();
        assert!(approx_eq(before, total));
        // Rate 5/6 split over the two adjacent demes
        let g = GenotypeId::new(0);
        assert!(approx_eq(after[0].get(g).male, 100.0 * 5.0 / 12.0));
        assert!(approx_eq(after[0].get(g).male, after[2].get(g).male));
    }

    #[test]
    fn test_overfull_deme_feeds_empty_neighbour() {
        // 6 records x 100/3 ~ 200 = 2K
        let grid = row(&[100.0 / 3.0, 0.0]);
        let after = migrate(&grid, 1, None);
        for id in grid.demes()[0].current().catalog().ids() {
            let before = grid.demes()[0].current().get(id).male;
            let moved = after[1].get(id).male;
            assert!(moved > 0.0);
            assert!(approx_eq(after[0].get(id).male, before - moved));
            assert!(approx_eq(moved, before * 0.5));
        }
    }

    #[test]
    fn test_no_flow_below_capacity() {
        let grid = row(&[10.0, 0.0, 5.0]);
        let after = migrate(&grid, 2, None);
        for (deme, census) in grid.demes().iter().zip(&after) {
            assert_eq!(deme.current(), census);
        }
    }

    #[test]
    fn test_mass_is_conserved_and_weighted_by_distance() {
        let grid = row(&[0.0, 0.0, 100.0, 0.0, 0.0]);
        let after = migrate(&grid, 2, None);
        let before: f64 = grid.demes().iter().map(|d| d.current().total()).sum();
        let total: f64 = after.iter().map(Census::total).sum();
        assert!(approx_eq(before, total));

        let g = GenotypeId::new(0);
        // Distance-1 neighbours receive twice what distance-2 neighbours do
        assert!(approx_eq(after[1].get(g).male, 2.0 * after[0].get(g).male));
        assert!(approx_eq(after[1].get(g).male, after[3].get(g).male));
    }

    #[test]
    fn test_dispersal_field_limits_radius() {
        let grid = row(&[0.0, 100.0, 0.0]);
        let catalog = Arc::clone(grid.demes()[0].current().catalog());
        let fields = GenotypeFields::new(
            &catalog,
            vec![
                ScalarField::uniform(3, 1, 0.0),
                ScalarField::uniform(3, 1, 1.9),
                ScalarField::uniform(3, 1, 5.0),
            ],
        )
        .unwrap();
        let after = migrate(&grid, 1, Some(&fields));

        // Genotype 0 cannot disperse
        assert_eq!(after[1].get(GenotypeId::new(0)).male, 100.0);
        assert_eq!(after[0].get(GenotypeId::new(0)).male, 0.0);
        // Radius 1.9 truncates to 1; radius 5 is capped by the maximum
        assert!(after[0].get(GenotypeId::new(1)).male > 0.0);
        assert!(approx_eq(
            after[0].get(GenotypeId::new(2)).male,
            after[0].get(GenotypeId::new(1)).male
        ));
    }

    #[test]
    fn test_fitness_stays_with_target() {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        let grid = Grid::new(2, 1, |p| {
            let (count, fitness) = if p.x == 0 { (100.0, 1.0) } else { (0.0, 0.3) };
            let census = Census::from_records(
                Arc::clone(&catalog),
                vec![GenotypeRecord::new(count, count, FitnessValue::new(fitness), 0.0); 3],
            )
            .unwrap();
            Ok::<_, Infallible>(Deme::new(p, 100.0, census))
        })
        .unwrap();
        let after = migrate(&grid, 1, None);
        assert_eq!(after[1].get(GenotypeId::new(0)).fitness, FitnessValue::new(0.3));
        assert!(after[1].total() > 0.0);
    }
}
