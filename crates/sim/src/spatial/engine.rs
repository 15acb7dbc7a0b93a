//! Spatial simulation engine.
//!
//! Each tick has two barrier-separated phases:
//! 1. gene flow, computed from every deme's current census;
//! 2. the local generation pipeline, run in parallel across demes.
//!
//! No deme history is appended until both phases have finished for every deme.
//! Each deme draws from its own generator, seeded from the master generator in
//! row-major order, so results do not depend on the number of threads.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::base::rng::{master_rng, task_rng, task_seeds};
use crate::base::{FitnessValue, SimRng};
use crate::errors::{ConfigurationError, InvariantViolation, SimulationError};
use crate::evolution::{IntrinsicFitness, LocalFitness};
use crate::genome::GenotypeCatalog;
use crate::simulation::{
    Census, Configuration, CountInit, GenerationHistory, GenerationPipeline, InitialCensus,
    OffspringScaling, PopulationParams, SpatialConfig,
};
use crate::spatial::{migrate, Deme, GenotypeFields, Grid};

/// Metapopulation engine over a grid of demes connected by gene flow.
#[derive(Debug)]
pub struct TopographicalSpeciation {
    pipeline: GenerationPipeline,
    grid: Grid,
    max_gene_flow_distance: usize,
    /// Per-deme fitness from the fitness fields, row-major
    landscapes: Option<Vec<LocalFitness>>,
    dispersal: Option<GenotypeFields>,
    generations: usize,
    seed: Option<u64>,
    rng: SimRng,
}

impl TopographicalSpeciation {
    /// Build the engine from a configuration with a `spatial` section.
    ///
    /// Offspring scaling defaults to [`OffspringScaling::TargetTimesRate`].
    /// Every deme needs a positive carrying capacity, either from the
    /// capacity field or from `dynamics.carrying_capacity`.
    pub fn from_configuration(config: &Configuration) -> Result<Self, SimulationError> {
        config.validate()?;
        let spatial = config
            .spatial
            .as_ref()
            .ok_or(ConfigurationError::MissingRequired("spatial"))?;
        let catalog = Arc::new(config.genome.catalog()?);

        let mut params = config.dynamics.clone();
        params.offspring_scaling = params
            .offspring_scaling
            .or(Some(OffspringScaling::TargetTimesRate));
        if spatial.carrying_capacity.is_none() && params.effective_capacity().is_none() {
            return Err(ConfigurationError::MissingRequired("carrying_capacity").into());
        }

        let fitness = spatial.fitness_fields(&catalog)?;
        let dispersal = spatial.dispersal_fields(&catalog)?;
        let pipeline = GenerationPipeline::new(Arc::clone(&catalog), params)?;

        let mut rng = master_rng(config.execution.seed);
        let grid = seed_grid(
            &catalog,
            spatial,
            pipeline.params(),
            &config.initialization,
            fitness.as_ref(),
            &mut rng,
        )?;
        let landscapes = fitness.map(|fields| {
            grid.demes()
                .iter()
                .map(|deme| local_fitness(&fields, deme))
                .collect()
        });

        Ok(Self {
            pipeline,
            grid,
            max_gene_flow_distance: spatial.max_gene_flow_distance,
            landscapes,
            dispersal,
            generations: config.execution.generations,
            seed: config.execution.seed,
            rng,
        })
    }

    /// Advance every deme by one generation.
    ///
    /// A deme that cannot produce offspring records an empty census and may
    /// be recolonized by later gene flow.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        let generation = self.generation();
        let migrated = migrate(
            &self.grid,
            self.max_gene_flow_distance,
            self.dispersal.as_ref(),
        );
        let seeds = task_seeds(&mut self.rng, migrated.len());

        let pipeline = &self.pipeline;
        let landscapes = self.landscapes.as_deref();
        let next = self
            .grid
            .demes()
            .par_iter()
            .zip(migrated.par_iter())
            .zip(seeds.par_iter())
            .enumerate()
            .map(|(i, ((deme, census), &seed))| {
                let mut rng = task_rng(seed);
                let capacity = Some(deme.carrying_capacity());
                let result = match landscapes {
                    Some(local) => {
                        pipeline.advance(census, generation, capacity, &local[i], &mut rng)
                    }
                    None => {
                        pipeline.advance(census, generation, capacity, &IntrinsicFitness, &mut rng)
                    }
                };
                match result {
                    Err(SimulationError::Extinct(_)) => {
                        if census.total() > 0.0 {
                            warn!(generation, x = deme.x(), y = deme.y(), "deme went extinct");
                        }
                        Ok(census.emptied())
                    }
                    other => other,
                }
            })
            .collect::<Result<Vec<Census>, SimulationError>>()?;

        for (deme, census) in self.grid.demes_mut().iter_mut().zip(next) {
            deme.push(census)?;
        }
        debug!(generation, size = self.total_population(), "grid advanced");
        Ok(())
    }

    /// Run the configured number of generations.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        info!(
            seed = ?self.seed,
            width = self.grid.width(),
            height = self.grid.height(),
            genotypes = self.pipeline.catalog().len(),
            generations = self.generations,
            "starting spatial run"
        );
        self.run_for(self.generations)?;
        info!(
            generation = self.generation(),
            size = self.total_population(),
            "spatial run finished"
        );
        Ok(())
    }

    /// Run for a specific number of generations.
    pub fn run_for(&mut self, generations: usize) -> Result<(), SimulationError> {
        for _ in 0..generations {
            self.step()?;
        }
        Ok(())
    }

    /// Index of the latest recorded generation.
    pub fn generation(&self) -> usize {
        self.grid
            .demes()
            .first()
            .map_or(0, |deme| deme.history().len() - 1)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Deme at column `x`, row `y`.
    pub fn deme(&self, x: usize, y: usize) -> Option<&Deme> {
        self.grid.deme(x, y)
    }

    /// Summed population of every deme at the latest generation.
    pub fn total_population(&self) -> f64 {
        self.grid.demes().iter().map(|d| d.current().total()).sum()
    }

    /// Metapopulation history: generation `t` pools every deme's census.
    ///
    /// # Errors
    /// Fails only if the demes do not share one catalog.
    pub fn pooled_history(&self) -> Result<GenerationHistory, InvariantViolation> {
        GenerationHistory::pooled(self.grid.demes().iter().map(Deme::history))?
            .ok_or(InvariantViolation::MissingGenotype(String::from("empty grid")))
    }

    pub fn catalog(&self) -> &Arc<GenotypeCatalog> {
        self.pipeline.catalog()
    }

    pub fn params(&self) -> &PopulationParams {
        self.pipeline.params()
    }

    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

fn local_fitness(fields: &GenotypeFields, deme: &Deme) -> LocalFitness {
    LocalFitness::new(
        fields
            .at(deme.x(), deme.y())
            .into_iter()
            .map(FitnessValue::new)
            .collect(),
    )
}

/// Create every deme's generation-0 census in row-major order.
fn seed_grid(
    catalog: &Arc<GenotypeCatalog>,
    spatial: &SpatialConfig,
    params: &PopulationParams,
    initialization: &InitialCensus,
    fitness: Option<&GenotypeFields>,
    rng: &mut SimRng,
) -> Result<Grid, SimulationError> {
    let per_sex = spatial.total_population / (spatial.width * spatial.height) as f64 / 2.0;
    let recipe = InitialCensus {
        counts: CountInit::Even {
            males: per_sex,
            females: per_sex,
        },
        ..initialization.clone()
    };
    let global_capacity = params.carrying_capacity.unwrap_or_default();

    Grid::new(spatial.width, spatial.height, |position| {
        let mut census = recipe.generate(catalog, &mut *rng)?;
        if let Some(fields) = fitness {
            for (id, record) in catalog.ids().zip(census.records_mut()) {
                record.fitness = FitnessValue::new(fields.field(id).get(position.x, position.y));
            }
        }
        let capacity = spatial
            .carrying_capacity
            .as_ref()
            .map_or(global_capacity, |field| field.get(position.x, position.y));
        Ok::<_, SimulationError>(Deme::new(position, capacity, census))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GenotypeId;
    use crate::spatial::{ScalarField, SpatialBuilder};

    fn create_test_simulation(seed: u64) -> TopographicalSpeciation {
        SpatialBuilder::new()
            .loci(1)
            .alleles(2)
            .generations(5)
            .grid(3, 2)
            .total_population(1200.0)
            .growth_rate(1.0)
            .carrying_capacity(150.0)
            .max_drift(0.1)
            .max_gene_flow_distance(2)
            .seed(seed)
            .build()
            .unwrap()
    }

    #[test]
    fn test_demes_are_seeded_evenly() {
        let sim = create_test_simulation(1);
        assert_eq!(sim.grid().len(), 6);
        for deme in sim.grid().demes() {
            // 200 per deme, 100 per sex, floor(100 / 3) per genotype
            for record in deme.current().records() {
                assert_eq!((record.male, record.female), (33.0, 33.0));
            }
            assert_eq!(deme.carrying_capacity(), 150.0);
        }
        assert_eq!(
            sim.params().offspring_scaling,
            Some(OffspringScaling::TargetTimesRate)
        );
    }

    #[test]
    fn test_step_appends_to_every_deme() {
        let mut sim = create_test_simulation(2);
        sim.run().unwrap();
        assert_eq!(sim.generation(), 5);
        for deme in sim.grid().demes() {
            assert_eq!(deme.history().len(), 6);
        }
        assert_eq!(sim.pooled_history().unwrap().len(), 6);
    }

    #[test]
    fn test_same_seed_same_grid() {
        let mut a = create_test_simulation(7);
        let mut b = create_test_simulation(7);
        a.run().unwrap();
        b.run().unwrap();
        for (x, y) in a.grid().demes().iter().zip(b.grid().demes()) {
            assert_eq!(x.history(), y.history());
        }
    }

    #[test]
    fn test_zero_growth_empties_grid_without_error() {
        let mut sim = SpatialBuilder::new()
            .loci(1)
            .alleles(2)
            .generations(2)
            .grid(2, 1)
            .total_population(200.0)
            .carrying_capacity(100.0)
            .max_gene_flow_distance(1)
            .seed(3)
            .build()
            .unwrap();
        sim.run().unwrap();
        assert_eq!(sim.total_population(), 0.0);
    }

    #[test]
    fn test_fitness_field_is_local() {
        let catalog = GenotypeCatalog::new(1, 2).unwrap();
        let hostile = ScalarField::from_rows(vec![vec![1.0, 0.0]]).unwrap();
        let fields = catalog
            .genotypes()
            .iter()
            .map(|g| (g.clone(), hostile.clone()))
            .collect();
        let mut sim = SpatialBuilder::new()
            .loci(1)
            .alleles(2)
            .generations(1)
            .grid(2, 1)
            .total_population(240.0)
            .growth_rate(1.0)
            .carrying_capacity(1000.0)
            .max_gene_flow_distance(1)
            .fitness_fields(fields)
            .seed(4)
            .build()
            .unwrap();

        let right = sim.deme(1, 0).unwrap();
        assert_eq!(right.current().get(GenotypeId::new(0)).fitness, FitnessValue::LETHAL);

        sim.step().unwrap();
        assert!(sim.deme(0, 0).unwrap().current().total() > 0.0);
        assert_eq!(sim.deme(1, 0).unwrap().current().total(), 0.0);
    }

    #[test]
    fn test_capacity_is_required() {
        let err = SpatialBuilder::new()
            .loci(1)
            .alleles(2)
            .generations(1)
            .grid(2, 2)
            .total_population(100.0)
            .max_gene_flow_distance(1)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SimulationError::Configuration(ConfigurationError::MissingRequired(
                "carrying_capacity"
            ))
        );

        let err = SpatialBuilder::new()
            .loci(1)
            .alleles(2)
            .generations(1)
            .grid(2, 2)
            .total_population(100.0)
            .max_gene_flow_distance(1)
            .carrying_capacity(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Configuration(ConfigurationError::MissingRequired(_))
        ));
    }
}
