use serde::{Deserialize, Serialize};

/// How real-valued counts are materialized into whole individuals.
///
/// Every pipeline step that rounds (fitness, drift, offspring synthesis) goes
/// through the same policy so that bias does not compound across steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Ties go to the nearest even integer (banker's rounding).
    #[default]
    HalfEven,
    /// Ties go away from zero.
    HalfUp,
}

impl RoundingPolicy {
    /// Round `value` to an integer-valued f64. Negative inputs clamp to zero.
    #[inline]
    pub fn round(self, value: f64) -> f64 {
        let rounded = match self {
            Self::HalfEven => value.round_ties_even(),
            Self::HalfUp => value.round(),
        };
        rounded.max(0.0)
    }
}
