//! Generation-0 census construction.
//!
//! An [`InitialCensus`] describes how the first census of a run is filled:
//! how many males and females each genotype starts with, which fitness each
//! genotype carries and its assortative-mating covariance. Every stochastic
//! choice draws from the generator passed in, so initialization is
//! reproducible from the run seed.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::base::FitnessValue;
use crate::errors::ConfigurationError;
use crate::genome::{Genotype, GenotypeCatalog, GenotypeId};
use crate::simulation::parameters::check;
use crate::simulation::{Census, GenotypeRecord};

/// Male and female counts of one genotype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SexCounts {
    pub male: f64,
    pub female: f64,
}

/// Starting counts per genotype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountInit {
    /// Split population totals evenly across genotypes, flooring each share.
    Even { males: f64, females: f64 },
    /// Draw each genotype's counts from a normal distribution, truncated
    /// toward zero and floored at zero.
    Gaussian {
        male_mean: f64,
        male_std: f64,
        female_mean: f64,
        female_std: f64,
    },
    /// Counts given per genotype; unlisted genotypes start empty.
    Explicit(BTreeMap<Genotype, SexCounts>),
}

/// Starting fitness per genotype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessInit {
    /// Every genotype at the reference fitness.
    #[default]
    Neutral,
    /// Uniform on [0, 1] rounded to one decimal, with one random genotype
    /// pinned to the reference.
    Random,
    /// Fitness given per genotype; unlisted genotypes get the reference.
    Explicit(BTreeMap<Genotype, FitnessValue>),
}

/// Starting assortative-mating covariance per genotype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceInit {
    /// No assortative mating.
    #[default]
    None,
    /// Draw each genotype's covariance from a normal distribution.
    Gaussian { mean: f64, std: f64 },
}

/// Recipe for the generation-0 census.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialCensus {
    pub counts: CountInit,
    #[serde(default)]
    pub fitness: FitnessInit,
    #[serde(default)]
    pub covariance: CovarianceInit,
}

impl InitialCensus {
    /// Even split of `males` and `females`, neutral fitness, no covariance.
    pub fn even(males: f64, females: f64) -> Self {
        Self {
            counts: CountInit::Even { males, females },
            fitness: FitnessInit::Neutral,
            covariance: CovarianceInit::None,
        }
    }

    /// Same number of each sex for every genotype.
    pub fn uniform(catalog: &GenotypeCatalog, per_sex: f64) -> Self {
        let counts = catalog
            .genotypes()
            .iter()
            .map(|g| {
                (
                    g.clone(),
                    SexCounts {
                        male: per_sex,
                        female: per_sex,
                    },
                )
            })
            .collect();
        Self {
            counts: CountInit::Explicit(counts),
            fitness: FitnessInit::Neutral,
            covariance: CovarianceInit::None,
        }
    }

    pub fn with_fitness(mut self, fitness: FitnessInit) -> Self {
        self.fitness = fitness;
        self
    }

    pub fn with_covariance(mut self, covariance: CovarianceInit) -> Self {
        self.covariance = covariance;
        self
    }

    /// Check parameter ranges and that every named genotype is in `catalog`.
    pub fn validate(&self, catalog: &GenotypeCatalog) -> Result<(), ConfigurationError> {
        match &self.counts {
            CountInit::Even { males, females } => {
                check_count("males", *males)?;
                check_count("females", *females)?;
            }
            CountInit::Gaussian {
                male_mean,
                male_std,
                female_mean,
                female_std,
            } => {
                check_count("male_mean", *male_mean)?;
                check_count("female_mean", *female_mean)?;
                check_std("male_std", *male_std)?;
                check_std("female_std", *female_std)?;
            }
            CountInit::Explicit(counts) => {
                for (genotype, c) in counts {
                    known(catalog, genotype)?;
                    check_count("male", c.male)?;
                    check_count("female", c.female)?;
                }
            }
        }
        if let FitnessInit::Explicit(values) = &self.fitness {
            for genotype in values.keys() {
                known(catalog, genotype)?;
            }
        }
        if let CovarianceInit::Gaussian { mean, std } = self.covariance {
            check("covariance_mean", mean, mean.is_finite(), "a finite number")?;
            check_std("covariance_std", std)?;
        }
        Ok(())
    }

    /// Build the census for `catalog`.
    ///
    /// Draw order is counts, then fitness, then covariance, each in genotype
    /// order.
    ///
    /// # Errors
    /// Fails with [`ConfigurationError`] when [`validate`](Self::validate) would.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        catalog: &Arc<GenotypeCatalog>,
        rng: &mut R,
    ) -> Result<Census, ConfigurationError> {
        self.validate(catalog)?;
        let size = catalog.len();

        let counts: Vec<(f64, f64)> = match &self.counts {
            CountInit::Even { males, females } => {
                let share = ((males / size as f64).floor(), (females / size as f64).floor());
                vec![share; size]
            }
            CountInit::Gaussian {
                male_mean,
                male_std,
                female_mean,
                female_std,
            } => {
                let male = normal(*male_mean, *male_std)?;
                let female = normal(*female_mean, *female_std)?;
                (0..size)
                    .map(|_| {
                        let m = male.sample(rng).trunc().max(0.0);
                        let f = female.sample(rng).trunc().max(0.0);
                        (m, f)
                    })
                    .collect()
            }
            CountInit::Explicit(entries) => {
                let mut counts = vec![(0.0, 0.0); size];
                for (genotype, c) in entries {
                    counts[known(catalog, genotype)?.index()] = (c.male, c.female);
                }
                counts
            }
        };

        let fitness: Vec<FitnessValue> = match &self.fitness {
            FitnessInit::Neutral => vec![FitnessValue::REFERENCE; size],
            FitnessInit::Random => {
                let mut values: Vec<FitnessValue> = (0..size)
                    .map(|_| FitnessValue::new((rng.random::<f64>() * 10.0).round() / 10.0))
                    .collect();
                let ids: Vec<GenotypeId> = catalog.ids().collect();
                if let Some(reference) = ids.choose(rng) {
                    values[reference.index()] = FitnessValue::REFERENCE;
                }
                values
            }
            FitnessInit::Explicit(entries) => {
                let mut values = vec![FitnessValue::REFERENCE; size];
                for (genotype, value) in entries {
                    values[known(catalog, genotype)?.index()] = *value;
                }
                values
            }
        };

        let covariance: Vec<f64> = match self.covariance {
            CovarianceInit::None => vec![0.0; size],
            CovarianceInit::Gaussian { mean, std } => {
                let dist = normal(mean, std)?;
                (0..size).map(|_| dist.sample(rng)).collect()
            }
        };

        let mut census = Census::zeroed(Arc::clone(catalog));
        let values = counts.into_iter().zip(fitness).zip(covariance);
        for (record, (((male, female), fitness), covariance)) in
            census.records_mut().iter_mut().zip(values)
        {
            *record = GenotypeRecord::new(male, female, fitness, covariance);
        }
        Ok(census)
    }
}

fn known(
    catalog: &GenotypeCatalog,
    genotype: &Genotype,
) -> Result<GenotypeId, ConfigurationError> {
    catalog
        .id_of(genotype)
        .ok_or_else(|| ConfigurationError::InvalidGenotype(genotype.to_string()))
}

fn check_count(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    check(name, value, value.is_finite() && value >= 0.0, "a non-negative count")
}

fn check_std(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    check(name, value, value.is_finite() && value >= 0.0, "a non-negative deviation")
}

fn normal(mean: f64, std: f64) -> Result<Normal<f64>, ConfigurationError> {
    Normal::new(mean, std).map_err(|_| ConfigurationError::InvalidParameter {
        name: "std",
        value: std,
        expected: "a non-negative deviation",
    })
}
