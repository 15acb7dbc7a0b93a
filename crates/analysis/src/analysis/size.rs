//! Population size over time.

use speciation_sim::simulation::{GenerationHistory, Sex};

use crate::analysis::utils::per_generation;

/// Total population size of every generation.
///
/// # Examples
///
/// ```
/// use speciation_analysis::analysis::population_size;
/// use speciation_sim::simulation::SimulationBuilder;
///
/// let mut sim = SimulationBuilder::new()
///     .loci(1)
///     .alleles(2)
///     .generations(3)
///     .carrying_capacity(300.0)
///     .uniform_initial(50.0)
///     .seed(1)
///     .build()
///     .unwrap();
/// sim.run().unwrap();
/// let sizes = population_size(sim.history());
/// assert_eq!(sizes.len(), 4);
/// assert_eq!(sizes[0], 300.0);
/// ```
pub fn population_size(history: &GenerationHistory) -> Vec<f64> {
    per_generation(history, |_, census| census.total())
}

/// Size of one sex in every generation.
pub fn sex_size(history: &GenerationHistory, sex: Sex) -> Vec<f64> {
    per_generation(history, |_, census| census.total_of(sex))
}

/// `(males, females)` of every generation.
pub fn sex_sizes(history: &GenerationHistory) -> Vec<(f64, f64)> {
    per_generation(history, |_, census| {
        (census.total_of(Sex::Male), census.total_of(Sex::Female))
    })
}
