//! Count-weighted mean fitness.

use speciation_sim::errors::PopulationExtinct;
use speciation_sim::simulation::{Census, GenerationHistory};

use crate::analysis::utils::{living_total, try_per_generation};

/// Mean fitness of the individuals in `census`.
pub fn census_average_fitness(
    census: &Census,
    generation: usize,
) -> Result<f64, PopulationExtinct> {
    let total = living_total(census, generation)?;
    let weighted: f64 = census
        .records()
        .iter()
        .map(|r| r.fitness.get() * r.total())
        .sum();
    Ok(weighted / total)
}

/// Mean fitness of every generation.
///
/// # Errors
/// Returns [`PopulationExtinct`] for the first generation with no individuals.
pub fn average_fitness(history: &GenerationHistory) -> Result<Vec<f64>, PopulationExtinct> {
    try_per_generation(history, |generation, census| {
        census_average_fitness(census, generation)
    })
}
