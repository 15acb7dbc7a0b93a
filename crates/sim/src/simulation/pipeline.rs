//! The per-generation update of one deme.
//!
//! Steps run in a fixed order:
//! 1. growth target from the incoming census size
//! 2. fitness adjustment
//! 3. drift
//! 4. bottleneck (optional, generation-indexed)
//! 5. mating and offspring synthesis
//! 6. mutation

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

use crate::errors::SimulationError;
use crate::evolution::{
    apply_drift, apply_fitness, drift_amplitude, growth_target, synthesize_offspring,
    FitnessLandscape, InheritanceTable, MutationModel,
};
use crate::genome::GenotypeCatalog;
use crate::simulation::{Census, PopulationParams};

/// Everything needed to advance a census by one generation.
///
/// The inheritance table and mutation distances are computed once, at
/// construction, and shared by every deme.
#[derive(Debug, Clone)]
pub struct GenerationPipeline {
    catalog: Arc<GenotypeCatalog>,
    params: PopulationParams,
    table: Arc<InheritanceTable>,
    mutation: MutationModel,
}

impl GenerationPipeline {
    /// Validate `params` and precompute the per-run tables for `catalog`.
    pub fn new(
        catalog: Arc<GenotypeCatalog>,
        params: PopulationParams,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        let table = InheritanceTable::new(&catalog)?;
        let mutation = MutationModel::new(params.mutation_rate, &catalog)?;
        Ok(Self {
            catalog,
            params,
            table: Arc::new(table),
            mutation,
        })
    }

    pub fn catalog(&self) -> &Arc<GenotypeCatalog> {
        &self.catalog
    }

    pub fn params(&self) -> &PopulationParams {
        &self.params
    }

    pub fn inheritance(&self) -> &InheritanceTable {
        &self.table
    }

    /// Produce the census of generation `generation + 1` from that of
    /// `generation`.
    ///
    /// # Arguments
    /// * `census` - Census of the current generation
    /// * `generation` - Index of the current generation
    /// * `carrying_capacity` - Capacity of this deme, `None` for unbounded
    /// * `landscape` - Fitness source for the selection step
    /// * `rng` - Generator for drift draws
    ///
    /// # Errors
    /// - [`SimulationError::Invariant`] if `census` is not keyed by this catalog
    /// - [`SimulationError::Extinct`] if no offspring can be produced
    pub fn advance<R: Rng + ?Sized>(
        &self,
        census: &Census,
        generation: usize,
        carrying_capacity: Option<f64>,
        landscape: &impl FitnessLandscape,
        rng: &mut R,
    ) -> Result<Census, SimulationError> {
        census.ensure_catalog(&self.catalog)?;
        let params = &self.params;
        let rounding = params.rounding;
        let capacity = carrying_capacity.filter(|&k| k != 0.0);

        let mut next_n = growth_target(census.total(), params.growth_rate, capacity);

        let adjusted = apply_fitness(census, landscape, rounding);

        let amplitude = drift_amplitude(adjusted.total(), params.max_drift, capacity);
        let mut drifted = apply_drift(&adjusted, amplitude, rng, rounding);

        if let Some(bottleneck) = params.bottleneck {
            if bottleneck.generation == generation && next_n > bottleneck.size {
                warn!(
                    generation,
                    target = next_n,
                    size = bottleneck.size,
                    "bottleneck"
                );
                drifted = apply_drift(&drifted, 1.0 - bottleneck.size / next_n, rng, rounding);
                next_n = bottleneck.size;
            }
        }

        let total = params
            .offspring_scaling
            .unwrap_or_default()
            .offspring_total(next_n, params.growth_rate);
        let offspring = synthesize_offspring(&drifted, &self.table, total, rounding, generation)?;
        let next = self.mutation.apply(&offspring);

        debug!(
            generation,
            size = census.total(),
            selected = adjusted.total(),
            drifted = drifted.total(),
            next = next.total(),
            "generation advanced"
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::rng::master_rng;
    use crate::base::FitnessValue;
    use crate::errors::InvariantViolation;
    use crate::evolution::IntrinsicFitness;
    use crate::genome::GenotypeId;
    use crate::simulation::{Bottleneck, InitialCensus};

    fn setup(params: PopulationParams) -> (GenerationPipeline, Census) {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        let census = InitialCensus::uniform(&catalog, 50.0)
            .generate(&catalog, &mut master_rng(Some(0)))
            .unwrap();
        (GenerationPipeline::new(catalog, params).unwrap(), census)
    }

    fn stable() -> PopulationParams {
        PopulationParams {
            growth_rate: 0.0,
            carrying_capacity: Some(300.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_stable_population_reaches_hardy_weinberg() {
        let (pipeline, census) = setup(stable());
        let next = pipeline
            .advance(&census, 0, Some(300.0), &IntrinsicFitness, &mut master_rng(Some(1)))
            .unwrap();
        assert!((next.total() - 300.0).abs() <= 3.0);
        let het = next.get(GenotypeId::new(1)).total();
        let hom = next.get(GenotypeId::new(0)).total();
        assert!((het / next.total() - 0.5).abs() < 0.01);
        assert!((hom / next.total() - 0.25).abs() < 0.01);
    }

    #[test]
    fn test_bottleneck_clamps_target() {
        let params = PopulationParams {
            bottleneck: Some(Bottleneck::new(0, 50.0)),
            ..stable()
        };
        let (pipeline, census) = setup(params);
        let next = pipeline
            .advance(&census, 0, Some(300.0), &IntrinsicFitness, &mut master_rng(Some(2)))
            .unwrap();
        assert!((next.total() - 50.0).abs() <= 3.0);

        // Other generations are unaffected
        let later = pipeline
            .advance(&census, 1, Some(300.0), &IntrinsicFitness, &mut master_rng(Some(2)))
            .unwrap();
        assert!((later.total() - 300.0).abs() <= 3.0);
    }

    #[test]
    fn test_lethal_population_goes_extinct() {
        let (pipeline, census) = setup(stable());
        let mut doomed = census.clone();
        for record in doomed.records_mut() {
            record.fitness = FitnessValue::LETHAL;
        }
        let err = pipeline
            .advance(&doomed, 7, Some(300.0), &IntrinsicFitness, &mut master_rng(None))
            .unwrap_err();
        assert!(err.is_extinction());
    }

    #[test]
    fn test_foreign_census_is_rejected() {
        let (pipeline, _) = setup(stable());
        let other = Census::zeroed(Arc::new(GenotypeCatalog::new(1, 3).unwrap()));
        let err = pipeline
            .advance(&other, 0, None, &IntrinsicFitness, &mut master_rng(None))
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Invariant(InvariantViolation::CensusSize { .. })
        ));
    }

    #[test]
    fn test_drift_is_reproducible() {
        let params = PopulationParams {
            max_drift: 0.5,
            growth_rate: 0.2,
            mutation_rate: 0.01,
            ..stable()
        };
        let (pipeline, census) = setup(params);
        let run = |seed| {
            let mut rng = master_rng(Some(seed));
            let mut census = census.clone();
            for generation in 0..5 {
                census = pipeline
                    .advance(&census, generation, Some(300.0), &IntrinsicFitness, &mut rng)
                    .unwrap();
            }
            census
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_invalid_params_fail_construction() {
        let catalog = Arc::new(GenotypeCatalog::new(1, 2).unwrap());
        let params = PopulationParams {
            mutation_rate: 2.0,
            ..Default::default()
        };
        let err = GenerationPipeline::new(catalog, params).unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
    }
}
