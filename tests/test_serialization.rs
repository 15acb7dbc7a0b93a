//! Loading runs from JSON configuration files.

use std::fs;

use speciation::analysis::population_size;
use speciation::errors::{ConfigurationError, SimulationError};
use speciation::simulation::{
    Configuration, CountInit, CovarianceInit, FitnessInit, InitialCensus, PopGen, SexCounts,
};
use speciation::spatial::TopographicalSpeciation;
use tempfile::tempdir;

const POPULATION: &str = r#"{
    "execution": { "generations": 6, "seed": 42 },
    "genome": { "loci": 1, "alleles": 2 },
    "dynamics": {
        "growth_rate": 0.0,
        "carrying_capacity": 300.0,
        "bottleneck": { "bottleneck_yr": 2, "bottleneck_N": 60.0 }
    },
    "initialization": {
        "counts": { "explicit": {
            "A1/A1": { "male": 50, "female": 50 },
            "A1/A2": { "male": 50, "female": 50 },
            "A2/A2": { "male": 50, "female": 50 }
        } },
        "covariance": { "gaussian": { "mean": 0.0, "std": 0.01 } }
    }
}"#;

const GRID: &str = r#"{
    "execution": { "generations": 3, "seed": 7 },
    "genome": { "loci": 1, "alleles": 2 },
    "dynamics": { "growth_rate": 1.0, "max_drift": 0.1 },
    "initialization": { "counts": { "even": { "males": 0, "females": 0 } }, "fitness": "random" },
    "spatial": {
        "width": 3,
        "height": 2,
        "total_population": 1200,
        "max_gene_flow_distance": 1,
        "carrying_capacity": [[100, 200, 300], [300, 200, 100]]
    }
}"#;

#[test]
fn test_population_run_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("population.json");
    fs::write(&path, POPULATION).unwrap();

    let config = Configuration::from_path(&path).unwrap();
    let mut sim = PopGen::from_configuration(&config).unwrap();
    sim.run().unwrap();

    let sizes = population_size(sim.history());
    assert_eq!(sizes.len(), 7);
    assert!((sizes[3] - 60.0).abs() <= 3.0);
}

#[test]
fn test_saved_configuration_reproduces_run() {
    let config = Configuration::from_json_str(POPULATION).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.json");
    config.save(&path).unwrap();

    let mut a = PopGen::from_configuration(&config).unwrap();
    let mut b = PopGen::from_configuration(&Configuration::from_path(&path).unwrap()).unwrap();
    a.run().unwrap();
    b.run().unwrap();
    assert_eq!(a.history(), b.history());
}

#[test]
fn test_grid_run_from_json() {
    let config = Configuration::from_json_str(GRID).unwrap();
    let mut sim = TopographicalSpeciation::from_configuration(&config).unwrap();
    assert_eq!(sim.deme(2, 0).unwrap().carrying_capacity(), 300.0);
    sim.run().unwrap();
    assert_eq!(sim.generation(), 3);
}

#[test]
fn test_grid_engine_needs_spatial_section() {
    let config = Configuration::from_json_str(POPULATION).unwrap();
    let err = TopographicalSpeciation::from_configuration(&config).unwrap_err();
    assert_eq!(
        err,
        SimulationError::Configuration(ConfigurationError::MissingRequired("spatial"))
    );
}

#[test]
fn test_malformed_field_is_rejected() {
    let ragged = GRID.replace("[300, 200, 100]", "[300, 200]");
    assert!(matches!(
        Configuration::from_json_str(&ragged),
        Err(ConfigurationError::Parse(_))
    ));
}

#[test]
fn test_final_census_seeds_a_new_run() {
    let config = Configuration::from_json_str(POPULATION).unwrap();
    let mut sim = PopGen::from_configuration(&config).unwrap();
    sim.run().unwrap();

    let last = sim.current().to_genotype_map();
    assert_eq!(last.len(), 3);
    let mut resumed = config.clone();
    resumed.initialization = InitialCensus {
        counts: CountInit::Explicit(
            last.iter()
                .map(|(g, r)| (g.clone(), SexCounts { male: r.male, female: r.female }))
                .collect(),
        ),
        fitness: FitnessInit::Explicit(last.iter().map(|(g, r)| (g.clone(), r.fitness)).collect()),
        covariance: CovarianceInit::None,
    };

    let json = resumed.to_json_string().unwrap();
    assert!(json.contains("\"A1/A2\""));
    let reloaded = Configuration::from_json_str(&json).unwrap();
    let next = PopGen::from_configuration(&reloaded).unwrap();
    for (genotype, record) in next.current().to_genotype_map() {
        assert_eq!(record.male, last[&genotype].male);
        assert_eq!(record.female, last[&genotype].female);
        assert_eq!(record.fitness, last[&genotype].fitness);
        assert_eq!(record.covariance, 0.0);
    }
}
