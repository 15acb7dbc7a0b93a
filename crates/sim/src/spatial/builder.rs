//! Fluent construction of spatial runs.

use std::collections::BTreeMap;

use crate::base::RoundingPolicy;
use crate::errors::{ConfigurationError, SimulationError};
use crate::genome::Genotype;
use crate::simulation::{
    Bottleneck, Configuration, CountInit, CovarianceInit, ExecutionConfig, FitnessInit,
    GenomeConfig, InitialCensus, OffspringScaling, PopulationParams, SpatialConfig,
};
use crate::spatial::{ScalarField, TopographicalSpeciation};

/// Builder for [`TopographicalSpeciation`].
///
/// # Examples
///
/// ```
/// use speciation_sim::spatial::SpatialBuilder;
///
/// let mut sim = SpatialBuilder::new()
///     .loci(1)
///     .alleles(2)
///     .generations(3)
///     .grid(4, 4)
///     .total_population(3200.0)
///     .growth_rate(1.0)
///     .carrying_capacity(150.0)
///     .max_gene_flow_distance(2)
///     .seed(42)
///     .build()
///     .unwrap();
/// sim.run().unwrap();
/// assert_eq!(sim.generation(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialBuilder {
    // Required parameters
    loci: Option<usize>,
    alleles: Option<usize>,
    generations: Option<usize>,
    dimensions: Option<(usize, usize)>,
    total_population: Option<f64>,
    max_gene_flow_distance: Option<usize>,

    // Optional fields and dynamics
    capacity_field: Option<ScalarField>,
    fitness_fields: Option<BTreeMap<Genotype, ScalarField>>,
    dispersal_fields: Option<BTreeMap<Genotype, ScalarField>>,
    initial_fitness: FitnessInit,
    initial_covariance: CovarianceInit,
    params: PopulationParams,
    seed: Option<u64>,
}

impl Default for SpatialBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialBuilder {
    pub fn new() -> Self {
        Self {
            loci: None,
            alleles: None,
            generations: None,
            dimensions: None,
            total_population: None,
            max_gene_flow_distance: None,
            capacity_field: None,
            fitness_fields: None,
            dispersal_fields: None,
            initial_fitness: FitnessInit::Neutral,
            initial_covariance: CovarianceInit::None,
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

    /// Set the grid dimensions (required).
    pub fn grid(mut self, width: usize, height: usize) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Set the starting population of the whole grid (required).
    pub fn total_population(mut self, total: f64) -> Self {
        self.total_population = Some(total);
        self
    }

    /// Set the largest Manhattan distance a migrant can travel (required).
    pub fn max_gene_flow_distance(mut self, distance: usize) -> Self {
        self.max_gene_flow_distance = Some(distance);
        self
    }

    /// Carrying capacity shared by every deme.
    pub fn carrying_capacity(mut self, capacity: f64) -> Self {
        self.params.carrying_capacity = Some(capacity);
        self
    }

    /// Per-deme carrying capacity; takes precedence over the shared value.
    pub fn carrying_capacity_field(mut self, field: ScalarField) -> Self {
        self.capacity_field = Some(field);
        self
    }

    /// Per-genotype fitness maps; every catalog genotype must be present.
    pub fn fitness_fields(mut self, fields: BTreeMap<Genotype, ScalarField>) -> Self {
        self.fitness_fields = Some(fields);
        self
    }

    /// Per-genotype dispersal-distance maps; every catalog genotype must be present.
    pub fn dispersal_fields(mut self, fields: BTreeMap<Genotype, ScalarField>) -> Self {
        self.dispersal_fields = Some(fields);
        self
    }

    pub fn initial_fitness(mut self, fitness: FitnessInit) -> Self {
        self.initial_fitness = fitness;
        self
    }

    pub fn initial_covariance(mut self, covariance: CovarianceInit) -> Self {
        self.initial_covariance = covariance;
        self
    }

    pub fn growth_rate(mut self, rate: f64) -> Self {
        self.params.growth_rate = rate;
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

    /// Set random seed for reproducibility.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Assemble the equivalent serializable configuration.
    pub fn configuration(&self) -> Result<Configuration, ConfigurationError> {
        let require = |missing: bool, name| {
            if missing {
                Err(ConfigurationError::MissingRequired(name))
            } else {
                Ok(())
            }
        };
        require(self.loci.is_none(), "loci")?;
        require(self.alleles.is_none(), "alleles")?;
        require(self.generations.is_none(), "generations")?;
        require(self.dimensions.is_none(), "grid")?;
        require(self.total_population.is_none(), "total_population")?;
        require(
            self.max_gene_flow_distance.is_none(),
            "max_gene_flow_distance",
        )?;

        let (width, height) = self.dimensions.unwrap_or_default();
        let total = self.total_population.unwrap_or_default();
        let per_sex = total / (width * height).max(1) as f64 / 2.0;
        let config = Configuration {
            execution: ExecutionConfig::new(self.generations.unwrap_or_default(), self.seed),
            genome: GenomeConfig::new(
                self.loci.unwrap_or_default(),
                self.alleles.unwrap_or_default(),
            ),
            dynamics: self.params.clone(),
            initialization: InitialCensus {
                counts: CountInit::Even {
                    males: per_sex,
                    females: per_sex,
                },
                fitness: self.initial_fitness.clone(),
                covariance: self.initial_covariance.clone(),
            },
            spatial: Some(SpatialConfig {
                width,
                height,
                total_population: total,
                max_gene_flow_distance: self.max_gene_flow_distance.unwrap_or_default(),
                carrying_capacity: self.capacity_field.clone(),
                fitness: self.fitness_fields.clone(),
                dispersal: self.dispersal_fields.clone(),
            }),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build the spatial simulation.
    pub fn build(self) -> Result<TopographicalSpeciation, SimulationError> {
        TopographicalSpeciation::from_configuration(&self.configuration()?)
    }
}
