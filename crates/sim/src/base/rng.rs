//! Seeded random-number sources.
//!
//! Every stochastic operation receives its generator explicitly. Parallel work
//! draws one seed per task from the engine's master generator, in task order,
//! so results do not depend on the number of worker threads.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Generator used throughout the simulation.
pub type SimRng = Xoshiro256PlusPlus;

/// Create the master generator from an optional seed.
///
/// Without a seed the generator is seeded from the thread-local entropy source.
pub fn master_rng(seed: Option<u64>) -> SimRng {
    match seed {
        Some(seed) => SimRng::seed_from_u64(seed),
        None => SimRng::from_seed(rand::rng().random()),
    }
}

/// Draw `n` task seeds from `rng`, in order.
pub fn task_seeds<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<u64> {
    (0..n).map(|_| rng.random()).collect()
}

/// Generator for a single task.
pub fn task_rng(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}
