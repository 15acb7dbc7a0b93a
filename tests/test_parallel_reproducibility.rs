//! Test reproducibility of parallel simulation with fixed seeds.

use speciation::simulation::GenerationHistory;
use speciation::spatial::{SpatialBuilder, TopographicalSpeciation};

fn build(seed: u64) -> TopographicalSpeciation {
    SpatialBuilder::new()
        .loci(2)
        .alleles(2)
        .generations(8)
        .grid(5, 4)
        .total_population(20.0 * 200.0)
        .growth_rate(1.1)
        .carrying_capacity(160.0)
        .max_drift(0.3)
        .mutation_rate(0.02)
        .max_gene_flow_distance(2)
        .seed(seed)
        .build()
        .unwrap()
}

fn run_simulation(seed: u64) -> Vec<GenerationHistory> {
    let mut sim = build(seed);
    sim.run().unwrap();
    sim.grid()
        .demes()
        .iter()
        .map(|deme| deme.history().clone())
        .collect()
}

fn run_with_threads(seed: u64, threads: usize) -> Vec<GenerationHistory> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .unwrap()
        .install(|| run_simulation(seed))
}

#[test]
fn test_parallel_reproducibility() {
    // Run the same simulation twice with the same seed
    let results1 = run_simulation(42);
    let results2 = run_simulation(42);
    assert_eq!(results1, results2);
}

#[test]
fn test_thread_count_does_not_change_results() {
    let single = run_with_threads(7, 1);
    let many = run_with_threads(7, 4);
    assert_eq!(single, many);
}

#[test]
fn test_parallel_different_seeds() {
    let results1 = run_simulation(42);
    let results2 = run_simulation(123);
    assert_eq!(results1.len(), results2.len());
    assert_ne!(results1, results2, "different seeds should diverge");
}
