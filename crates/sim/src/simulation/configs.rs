//! Run configuration.
//!
//! A [`Configuration`] fully describes a run and round-trips through JSON, so
//! a saved file together with its seed reproduces a simulation exactly.
//!
//! ```json
//! {
//!   "execution": { "generations": 50, "seed": 42 },
//!   "genome": { "loci": 1, "alleles": 2 },
//!   "dynamics": { "growth_rate": 0.1, "carrying_capacity": 300.0, "max_drift": 0.05 },
//!   "initialization": { "counts": { "even": { "males": 150.0, "females": 150.0 } } }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;
use crate::genome::{Genotype, GenotypeCatalog};
use crate::simulation::parameters::check;
use crate::simulation::{InitialCensus, PopulationParams};
use crate::spatial::{GenotypeFields, ScalarField};

/// The master configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub execution: ExecutionConfig,
    pub genome: GenomeConfig,
    #[serde(default)]
    pub dynamics: PopulationParams,
    pub initialization: InitialCensus,
    /// Present for grid runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial: Option<SpatialConfig>,
}

/// Run length and seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Total number of generations to simulate
    pub generations: usize,
    /// Optional RNG seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ExecutionConfig {
    pub fn new(generations: usize, seed: Option<u64>) -> Self {
        Self { generations, seed }
    }
}

/// Shape of the genotype space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeConfig {
    pub loci: usize,
    pub alleles: usize,
}

impl GenomeConfig {
    pub fn new(loci: usize, alleles: usize) -> Self {
        Self { loci, alleles }
    }

    /// Build the genotype catalog for this shape.
    pub fn catalog(&self) -> Result<GenotypeCatalog, ConfigurationError> {
        GenotypeCatalog::new(self.loci, self.alleles)
    }
}

/// Grid layout and spatial fields.
///
/// Each deme starts with `total_population / (width * height)` individuals,
/// split evenly between sexes and across genotypes. Starting fitness and
/// covariance come from the run's [`InitialCensus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialConfig {
    pub width: usize,
    pub height: usize,
    pub total_population: f64,
    pub max_gene_flow_distance: usize,
    /// Per-deme carrying capacity; falls back to `dynamics.carrying_capacity`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrying_capacity: Option<ScalarField>,
    /// Per-genotype fitness maps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness: Option<BTreeMap<Genotype, ScalarField>>,
    /// Per-genotype dispersal-distance maps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispersal: Option<BTreeMap<Genotype, ScalarField>>,
}

impl SpatialConfig {
    /// Check dimensions and field shapes against `catalog`.
    pub fn validate(&self, catalog: &GenotypeCatalog) -> Result<(), ConfigurationError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "grid size",
                value: (self.width * self.height) as f64,
                expected: "a width and height of at least one",
            });
        }
        check(
            "total_population",
            self.total_population,
            self.total_population.is_finite() && self.total_population >= 0.0,
            "a non-negative count",
        )?;
        if let Some(capacity) = &self.carrying_capacity {
            capacity.ensure_shape("carrying_capacity", self.width, self.height)?;
            let invalid = capacity.values().iter().find(|&&k| !(k.is_finite() && k > 0.0));
            if let Some(&k) = invalid {
                return Err(ConfigurationError::InvalidParameter {
                    name: "carrying_capacity",
                    value: k,
                    expected: "a positive number in every deme",
                });
            }
        }
        self.fitness_fields(catalog)?;
        self.dispersal_fields(catalog)?;
        Ok(())
    }

    /// Fitness maps in genotype order, shape-checked.
    pub fn fitness_fields(
        &self,
        catalog: &GenotypeCatalog,
    ) -> Result<Option<GenotypeFields>, ConfigurationError> {
        self.genotype_fields("fitness", self.fitness.as_ref(), catalog)
    }

    /// Dispersal maps in genotype order, shape-checked.
    pub fn dispersal_fields(
        &self,
        catalog: &GenotypeCatalog,
    ) -> Result<Option<GenotypeFields>, ConfigurationError> {
        self.genotype_fields("dispersal", self.dispersal.as_ref(), catalog)
    }

    fn genotype_fields(
        &self,
        name: &str,
        map: Option<&BTreeMap<Genotype, ScalarField>>,
        catalog: &GenotypeCatalog,
    ) -> Result<Option<GenotypeFields>, ConfigurationError> {
        let Some(map) = map else {
            return Ok(None);
        };
        let fields = GenotypeFields::from_map(catalog, map.clone())?;
        fields.ensure_shape(name, catalog, self.width, self.height)?;
        Ok(Some(fields))
    }
}

impl Configuration {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty-printed JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigurationError> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let catalog = self.genome.catalog()?;
        self.dynamics.validate()?;
        self.initialization.validate(&catalog)?;
        if let Some(spatial) = &self.spatial {
            spatial.validate(&catalog)?;
        }
        Ok(())
    }

    /// Whether this configuration describes a grid run.
    pub fn is_spatial(&self) -> bool {
        self.spatial.is_some()
    }
}
