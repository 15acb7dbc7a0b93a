//! Per-deme snapshots of a grid
//!
//! Maps are laid out like scalar fields: `rows[y][x]`.

use speciation_sim::errors::InvariantViolation;
use speciation_sim::simulation::GenerationHistory;
use speciation_sim::spatial::{Deme, Grid, ScalarField};

use crate::analysis::fitness::census_average_fitness;

/// Population size of every deme at `generation`.
///
/// Returns `None` if any deme has no census for that generation.
pub fn population_size_map(grid: &Grid, generation: usize) -> Option<ScalarField> {
    let rows = deme_rows(grid, |deme| {
        deme.history().get(generation).map(|census| census.total())
    })?;
    ScalarField::from_rows(rows).ok()
}

/// Mean fitness of every deme at `generation`; `None` cells are extinct demes.
///
/// Returns `None` if any deme has no census for that generation.
pub fn average_fitness_map(grid: &Grid, generation: usize) -> Option<Vec<Vec<Option<f64>>>> {
    deme_rows(grid, |deme| {
        deme.history()
            .get(generation)
            .map(|census| census_average_fitness(census, generation).ok())
    })
}

/// Metapopulation history pooling every deme's census per generation.
pub fn metapopulation_history(
    grid: &Grid,
) -> Result<Option<GenerationHistory>, InvariantViolation> {
    GenerationHistory::pooled(grid.demes().iter().map(Deme::history))
}

fn deme_rows<T>(grid: &Grid, mut value: impl FnMut(&Deme) -> Option<T>) -> Option<Vec<Vec<T>>> {
    grid.demes()
        .chunks(grid.width().max(1))
        .map(|row| row.iter().map(&mut value).collect())
        .collect()
}
