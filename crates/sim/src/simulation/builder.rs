//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for configuring a [`PopGen`] run with sensible
//! defaults and validation in [`SimulationBuilder::build`].

use std::sync::Arc;

use crate::base::RoundingPolicy;
use crate::errors::{ConfigurationError, SimulationError};
use crate::genome::GenotypeCatalog;
use crate::simulation::{
    Bottleneck, Configuration, ExecutionConfig, GenomeConfig, InitialCensus, OffspringScaling,
    PopGen, PopulationParams,
};

/// How generation 0 is described before the catalog exists.
#[derive(Debug, Clone)]
enum InitialSpec {
    /// The same count of each sex for every genotype
    Uniform(f64),
    Census(InitialCensus),
}

/// Builder for constructing [`PopGen`] instances with a fluent API.
///
/// # Examples
///
/// ```
/// use speciation_sim::simulation::SimulationBuilder;
///
/// let mut sim = SimulationBuilder::new()
///     .loci(1)
///     .alleles(2)
///     .generations(20)
///     .growth_rate(0.1)
///     .carrying_capacity(300.0)
///     .uniform_initial(50.0)
///     .seed(42)
///     .build()
///     .unwrap();
/// sim.run().unwrap();
/// assert_eq!(sim.generation(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    // Required parameters
    loci: Option<usize>,
    alleles: Option<usize>,
    generations: Option<usize>,
    initial: Option<InitialSpec>,

    // Dynamics (with defaults)
    params: PopulationParams,
    seed: Option<u64>, // Default: None (random)
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    /// Create a new simulation builder with default values.
    pub fn new() -> Self {
        Self {
            loci: None,
            alleles: None,
            generations: None,
            initial: None,
            params: PopulationParams::default(),
            seed: None,
        }
    }

    /// Set the number of loci (required).
    pub fn loci(mut self, loci: usize) -> Self {
        self.loci = Some(loci);
        self
    }

    /// Set the number of alleles per locus (required).
    pub fn alleles(mut self, alleles: usize) -> Self {
        self.alleles = Some(alleles);
        self
    }

    /// Set the number of generations to run (required).
    pub fn generations(mut self, generations: usize) -> Self {
        self.generations = Some(generations);
        self
    }

    pub fn growth_rate(mut self, rate: f64) -> Self {
        self.params.growth_rate = rate;
        self
    }

    pub fn carrying_capacity(mut self, capacity: f64) -> Self {
        self.params.carrying_capacity = Some(capacity);
        self
    }

    pub fn max_drift(mut self, max_drift: f64) -> Self {
        self.params.max_drift = max_drift;
        self
    }

    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.params.mutation_rate = rate;
        self
    }

    /// Clamp the population to `size` after generation `generation`.
    pub fn bottleneck(mut self, generation: usize, size: f64) -> Self {
        self.params.bottleneck = Some(Bottleneck::new(generation, size));
        self
    }

    pub fn offspring_scaling(mut self, scaling: OffspringScaling) -> Self {
        self.params.offspring_scaling = Some(scaling);
        self
    }

    pub fn rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.params.rounding = rounding;
        self
    }

    /// Replace all dynamics parameters at once.
    pub fn params(mut self, params: PopulationParams) -> Self {
        self.params = params;
        self
    }

    /// Start with `per_sex` males and `per_sex` females of every genotype.
    pub fn uniform_initial(mut self, per_sex: f64) -> Self {
        self.initial = Some(InitialSpec::Uniform(per_sex));
        self
    }

    /// Describe generation 0 explicitly.
    pub fn initial(mut self, initial: InitialCensus) -> Self {
        self.initial = Some(InitialSpec::Census(initial));
        self
    }

    /// Set random seed for reproducibility.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn require<T>(value: Option<T>, name: &'static str) -> Result<T, ConfigurationError> {
        value.ok_or(ConfigurationError::MissingRequired(name))
    }

    fn initial_census(
        &self,
        catalog: &GenotypeCatalog,
    ) -> Result<InitialCensus, ConfigurationError> {
        match Self::require(self.initial.as_ref(), "initial census")? {
            InitialSpec::Uniform(per_sex) => Ok(InitialCensus::uniform(catalog, *per_sex)),
            InitialSpec::Census(initial) => Ok(initial.clone()),
        }
    }

    /// Assemble the equivalent serializable configuration.
    pub fn configuration(&self) -> Result<Configuration, ConfigurationError> {
        let genome = GenomeConfig::new(
            Self::require(self.loci, "loci")?,
            Self::require(self.alleles, "alleles")?,
        );
        let generations = Self::require(self.generations, "generations")?;
        let catalog = genome.catalog()?;
        let config = Configuration {
            execution: ExecutionConfig::new(generations, self.seed),
            genome,
            dynamics: self.params.clone(),
            initialization: self.initial_census(&catalog)?,
            spatial: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build the simulation.
    ///
    /// # Errors
    /// Returns a configuration error if a required parameter is missing or
    /// any value is out of range.
    pub fn build(self) -> Result<PopGen, SimulationError> {
        let config = self.configuration()?;
        let catalog = Arc::new(config.genome.catalog()?);
        PopGen::from_parts(
            catalog,
            config.dynamics,
            &config.initialization,
            config.execution.generations,
            config.execution.seed,
        )
    }
}
