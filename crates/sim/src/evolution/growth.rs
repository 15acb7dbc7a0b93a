//! Population growth targets.

/// Size the next generation should reach.
///
/// Logistic growth toward `carrying_capacity` when it is set and non-zero,
/// unbounded exponential growth otherwise. The target never drops below one
/// individual.
///
/// # Arguments
/// * `size` - Current total population size
/// * `growth_rate` - Per-generation growth rate `r`
/// * `carrying_capacity` - Optional capacity `K`
pub fn growth_target(size: f64, growth_rate: f64, carrying_capacity: Option<f64>) -> f64 {
    let next = match carrying_capacity {
        Some(k) if k != 0.0 => size + growth_rate * size * (1.0 - size / k),
        _ => size + growth_rate * size,
    };
    next.max(1.0)
}
