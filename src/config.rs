use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_config, KuramotoResult};

/// Upper bound on recorded steps per trajectory.
pub const MAX_STEPS: usize = 10_000_000;

/// Relative distance from an integer under which `T / dt` counts as that integer.
const STEP_TOLERANCE: f64 = 1e-9;

/// How the all-pairs coupling sum is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingKernel {
    /// Explicit double sum over every pair, O(N²) per evaluation.
    #[default]
    Pairwise,
    /// Same sum through the mean phase vector, O(N) per evaluation.
    MeanField,
}

impl std::str::FromStr for CouplingKernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "pairwise" => Ok(Self::Pairwise),
            "mean_field" | "meanfield" => Ok(Self::MeanField),
            other => Err(format!("unknown coupling kernel '{other}' (pairwise | mean_field)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Oscillator count N
    pub n: usize,
    /// Coupling constants K, simulated in this order (duplicates allowed)
    pub couplings: Vec<f64>,
    /// Total simulated time T
    pub t_end: f64,
    /// Fixed step size
    pub dt: f64,

    // Ensemble initialization
    pub seed: u64,
    pub freq_std: f64, // std of the zero-mean Gaussian natural frequencies

    pub kernel: CouplingKernel,
    /// Run coupling constants on the rayon pool
    pub parallel: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            n: 100,
            couplings: vec![0.0, 1.0, 2.0, 4.0],
            t_end: 50.0,
            dt: 0.05,
            seed: 42,
            freq_std: 1.0,
            kernel: CouplingKernel::Pairwise,
            parallel: false,
        }
    }
}

impl SweepConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> KuramotoResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let cfg: Self = serde_json::from_str(&text)?;
        Ok(cfg)
    }

    pub fn check(&self) -> KuramotoResult<()> {
        ensure_config!(self.n > 0, "oscillator count must be > 0");
        ensure_config!(!self.couplings.is_empty(), "coupling list must not be empty");
        ensure_config!(
            self.dt.is_finite() && self.dt > 0.0,
            "dt must be finite and > 0 (got {})",
            self.dt
        );
        ensure_config!(
            self.t_end.is_finite() && self.t_end > 0.0,
            "t_end must be finite and > 0 (got {})",
            self.t_end
        );
        ensure_config!(
            self.freq_std.is_finite() && self.freq_std >= 0.0,
            "freq_std must be finite and >= 0 (got {})",
            self.freq_std
        );
        let ratio = self.t_end / self.dt;
        ensure_config!(
            ratio <= MAX_STEPS as f64,
            "t_end / dt = {ratio} exceeds the {MAX_STEPS} step limit"
        );
        Ok(())
    }

    /// floor(T / dt); zero when dt > T.
    ///
    /// A quotient within rounding of an integer counts as that integer, so 0.3 / 0.1 gives 3.
    pub fn step_count(&self) -> usize {
        let ratio = self.t_end / self.dt;
        let nearest = ratio.round();
        if (ratio - nearest).abs() <= STEP_TOLERANCE * nearest.max(1.0) {
            nearest as usize
        } else {
            ratio.floor() as usize
        }
    }

    /// Sample times `[0, dt, 2dt, ...]`, one per recorded step.
    pub fn sample_times(&self) -> Vec<f64> {
        (0..self.step_count()).map(|i| i as f64 * self.dt).collect()
    }
}
