//! Single-population simulation engine.
//!
//! [`PopGen`] advances one well-mixed population through the generation
//! pipeline and records every census in a [`GenerationHistory`].

use std::sync::Arc;

use tracing::info;

use crate::base::rng::master_rng;
use crate::base::SimRng;
use crate::errors::SimulationError;
use crate::evolution::IntrinsicFitness;
use crate::genome::GenotypeCatalog;
use crate::simulation::{
    Census, Configuration, GenerationHistory, GenerationPipeline, InitialCensus, PopulationParams,
};

/// Main simulation engine for a non-spatial population.
#[derive(Debug)]
pub struct PopGen {
    pipeline: GenerationPipeline,
    history: GenerationHistory,
    /// Number of generations run by [`PopGen::run`]
    generations: usize,
    seed: Option<u64>,
    rng: SimRng,
}

impl PopGen {
    /// Create an engine from a prepared pipeline and generation-0 census.
    ///
    /// The initial census must be keyed by the pipeline's catalog.
    pub fn new(
        pipeline: GenerationPipeline,
        initial: Census,
        generations: usize,
        seed: Option<u64>,
    ) -> Result<Self, SimulationError> {
        initial.ensure_catalog(pipeline.catalog())?;
        Ok(Self {
            pipeline,
            history: GenerationHistory::new(initial),
            generations,
            seed,
            rng: master_rng(seed),
        })
    }

    /// Build an engine from a validated configuration.
    ///
    /// Any `spatial` section is ignored; grid runs are built by
    /// [`TopographicalSpeciation`](crate::spatial::TopographicalSpeciation).
    pub fn from_configuration(config: &Configuration) -> Result<Self, SimulationError> {
        config.validate()?;
        let catalog = Arc::new(config.genome.catalog()?);
        Self::from_parts(
            catalog,
            config.dynamics.clone(),
            &config.initialization,
            config.execution.generations,
            config.execution.seed,
        )
    }

    /// Generate the initial census with the engine's own generator, then
    /// build the engine.
    pub(crate) fn from_parts(
        catalog: Arc<GenotypeCatalog>,
        params: PopulationParams,
        initialization: &InitialCensus,
        generations: usize,
        seed: Option<u64>,
    ) -> Result<Self, SimulationError> {
        let pipeline = GenerationPipeline::new(Arc::clone(&catalog), params)?;
        let mut rng = master_rng(seed);
        let initial = initialization.generate(&catalog, &mut rng)?;
        let mut engine = Self::new(pipeline, initial, generations, seed)?;
        engine.rng = rng;
        Ok(engine)
    }

    /// Advance by one generation.
    ///
    /// # Errors
    /// Returns [`SimulationError::Extinct`] when no offspring can be produced;
    /// the history is left at the last viable generation.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        let generation = self.generation();
        let next = self.pipeline.advance(
            self.history.latest(),
            generation,
            self.pipeline.params().effective_capacity(),
            &IntrinsicFitness,
            &mut self.rng,
        )?;
        self.history.push(next)?;
        Ok(())
    }

    /// Run the configured number of generations.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        info!(
            seed = ?self.seed,
            genotypes = self.catalog().len(),
            generations = self.generations,
            size = self.history.latest().total(),
            "starting population run"
        );
        self.run_for(self.generations)?;
        info!(
            generation = self.generation(),
            size = self.history.latest().total(),
            "population run finished"
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
        self.history.len() - 1
    }

    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    pub fn into_history(self) -> GenerationHistory {
        self.history
    }

    /// Census of the latest recorded generation.
    pub fn current(&self) -> &Census {
        self.history.latest()
    }

    pub fn catalog(&self) -> &Arc<GenotypeCatalog> {
        self.pipeline.catalog()
    }

    pub fn params(&self) -> &PopulationParams {
        self.pipeline.params()
    }

    /// Configured run length.
    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
