//! Quantities on the unit circle: the Kuramoto order parameter and phase wrapping.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Magnitude and angle of the mean phase vector
///
/// ```text
/// r · e^(iψ) = (1/N) Σⱼ e^(iθⱼ)
/// ```
///
/// `r ∈ [0, 1]`, `psi ∈ (-π, π]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderParameter {
    pub r: f64,
    pub psi: f64,
}

impl OrderParameter {
    /// Compute the order parameter of a phase vector.
    ///
    /// An empty slice yields `r = 0, psi = 0`.
    pub fn of(theta: &[f64]) -> Self {
        if theta.is_empty() {
            return Self { r: 0.0, psi: 0.0 };
        }
        let n = theta.len() as f64;
        let (sum_sin, sum_cos) = theta
            .iter()
            .fold((0.0, 0.0), |(s, c), &th| (s + th.sin(), c + th.cos()));
        let (mean_sin, mean_cos) = (sum_sin / n, sum_cos / n);

        // Rounding can leave the norm a hair above one for identical phases.
        // NaN must survive the clamp, so no `f64::min`.
        let r = mean_cos.hypot(mean_sin);
        let r = if r > 1.0 { 1.0 } else { r };
        let mut psi = mean_sin.atan2(mean_cos);
        if psi <= -PI {
            psi = PI;
        }
        Self { r, psi }
    }
}

/// Reduce a phase to `[0, 2π)`. Only used for reporting, never inside the dynamics.
pub fn wrap_phase(theta: f64) -> f64 {
    let w = theta.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if w >= TAU {
        0.0
    } else {
        w
    }
}
