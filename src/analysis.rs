use std::f64::consts::PI;

use serde::Serialize;

use crate::model::sweep::{NumericAnomaly, SweepResult};

/// Onset of synchronization for `N → ∞` with frequencies `~ N(0, σ²)`.
///
/// K_c = 2 / (π g(0)) with g(0) = 1 / (σ √(2π)), i.e. K_c = σ √(8/π).
pub fn critical_coupling_gaussian(freq_std: f64) -> f64 {
    freq_std * (8.0 / PI).sqrt()
}

/// Mean over the last `fraction` of a series (at least one sample). `None` for an empty series.
pub fn tail_mean(series: &[f64], fraction: f64) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let fraction = fraction.clamp(0.0, 1.0);
    let take = ((series.len() as f64 * fraction).ceil() as usize).clamp(1, series.len());
    let tail = &series[series.len() - take..];
    Some(tail.iter().sum::<f64>() / take as f64)
}

/// One row per coupling constant, in sweep order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    pub coupling: f64,
    pub steps: usize,
    pub initial_r: Option<f64>,
    pub final_r: Option<f64>,
    /// Mean r over the last quarter of the run
    pub steady_r: Option<f64>,
    pub final_psi: Option<f64>,
    pub anomaly: Option<NumericAnomaly>,
}

pub const STEADY_FRACTION: f64 = 0.25;

pub fn summarize(result: &SweepResult) -> Vec<SweepSummary> {
    result
        .trajectories
        .iter()
        .map(|t| SweepSummary {
            coupling: t.coupling,
            steps: t.len(),
            initial_r: t.r.first().copied(),
            final_r: t.r.last().copied(),
            steady_r: tail_mean(&t.r, STEADY_FRACTION),
            final_psi: t.psi.last().copied(),
            anomaly: t.anomaly,
        })
        .collect()
}
