//! Coupling-constant sweep: one RK4 trajectory per K from a shared ensemble.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{CouplingKernel, SweepConfig};
use crate::error::{KuramotoError, KuramotoResult};
use crate::math::circle::OrderParameter;
use crate::math::ode::Rk4Workspace;
use crate::model::ensemble::{Ensemble, EnsembleInitializer};
use crate::model::kuramoto::KuramotoModel;

/// First non-finite phase produced while integrating a trajectory.
///
/// Rows from `step` onwards are not meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericAnomaly {
    pub step: usize,
    pub oscillator: usize,
    pub value: f64,
}

/// Non-fatal conditions reported alongside the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepWarning {
    /// `dt > t_end`: every trajectory has zero recorded steps.
    DegenerateRun { t_end: f64, dt: f64, steps: usize },
    NumericAnomaly { coupling: f64, anomaly: NumericAnomaly },
}

/// Full record for one coupling constant. Row `i` of every series is time `i * dt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub coupling: f64,
    pub times: Vec<f64>,
    /// `phases[i]` is the phase vector at step `i`; row 0 is the initial condition.
    pub phases: Vec<Vec<f64>>,
    pub r: Vec<f64>,
    pub psi: Vec<f64>,
    pub anomaly: Option<NumericAnomaly>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn final_phases(&self) -> Option<&[f64]> {
        self.phases.last().map(Vec::as_slice)
    }

    pub fn final_order(&self) -> Option<OrderParameter> {
        Some(OrderParameter {
            r: *self.r.last()?,
            psi: *self.psi.last()?,
        })
    }
}

/// Sweep output: trajectories in the order the couplings were given, plus the shared ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub omega: Vec<f64>,
    pub theta0: Vec<f64>,
    pub dt: f64,
    pub steps: usize,
    pub trajectories: Vec<Trajectory>,
    pub warnings: Vec<SweepWarning>,
}

impl SweepResult {
    pub fn couplings(&self) -> impl Iterator<Item = f64> + '_ {
        self.trajectories.iter().map(|t| t.coupling)
    }

    /// First trajectory whose coupling has the same bit pattern as `coupling`.
    pub fn find(&self, coupling: f64) -> Option<&Trajectory> {
        self.trajectories
            .iter()
            .find(|t| t.coupling.to_bits() == coupling.to_bits())
    }

    pub fn is_degenerate(&self) -> bool {
        self.steps == 0
    }

    pub fn has_anomalies(&self) -> bool {
        self.trajectories.iter().any(|t| t.anomaly.is_some())
    }
}

/// Integrate one coupling constant for `steps` recorded rows.
///
/// Row 0 is `theta0`; each later row is one RK4 step of size `dt` from the previous one.
pub fn simulate_coupling(
    omega: &[f64],
    theta0: &[f64],
    coupling: f64,
    kernel: CouplingKernel,
    dt: f64,
    steps: usize,
) -> Trajectory {
    let model = KuramotoModel::new(omega, coupling).with_kernel(kernel);
    let mut ws = Rk4Workspace::new(theta0.len());
    let mut theta = theta0.to_vec();

    let mut traj = Trajectory {
        coupling,
        times: Vec::with_capacity(steps),
        phases: Vec::with_capacity(steps),
        r: Vec::with_capacity(steps),
        psi: Vec::with_capacity(steps),
        anomaly: None,
    };

    for step in 0..steps {
        if step > 0 {
            model.step(&mut theta, dt, &mut ws);
        }
        // row 0 too: a hand-built ensemble may carry a non-finite initial phase
        if traj.anomaly.is_none() {
            if let Some(oscillator) = theta.iter().position(|v| !v.is_finite()) {
                traj.anomaly = Some(NumericAnomaly {
                    step,
                    oscillator,
                    value: theta[oscillator],
                });
            }
        }
        let op = OrderParameter::of(&theta);
        traj.times.push(step as f64 * dt);
        traj.phases.push(theta.clone());
        traj.r.push(op.r);
        traj.psi.push(op.psi);
    }
    traj
}

/// Draw the ensemble from `cfg.seed` / `cfg.freq_std` and run every coupling constant.
pub fn run_sweep(cfg: &SweepConfig) -> KuramotoResult<SweepResult> {
    cfg.check()?;
    let ensemble = EnsembleInitializer::new(cfg.seed, cfg.freq_std).draw(cfg.n)?;
    run_sweep_with_ensemble(cfg, &ensemble)
}

/// Run every coupling constant from a caller-supplied ensemble (`ensemble.len()` must equal `cfg.n`).
pub fn run_sweep_with_ensemble(cfg: &SweepConfig, ensemble: &Ensemble) -> KuramotoResult<SweepResult> {
    cfg.check()?;
    if ensemble.len() != cfg.n {
        return Err(KuramotoError::dimension_mismatch(cfg.n, ensemble.len()));
    }
    if ensemble.theta0.len() != ensemble.omega.len() {
        return Err(KuramotoError::dimension_mismatch(ensemble.omega.len(), ensemble.theta0.len()));
    }

    let steps = cfg.step_count();
    let mut warnings = Vec::new();
    if steps == 0 {
        warn!(t_end = cfg.t_end, dt = cfg.dt, "dt exceeds t_end; trajectories are empty");
        warnings.push(SweepWarning::DegenerateRun {
            t_end: cfg.t_end,
            dt: cfg.dt,
            steps,
        });
    }

    info!(
        n = cfg.n,
        couplings = cfg.couplings.len(),
        steps = steps,
        kernel = ?cfg.kernel,
        parallel = cfg.parallel,
        "Starting sweep"
    );

    let run_one = |&k: &f64| {
        let traj = simulate_coupling(&ensemble.omega, &ensemble.theta0, k, cfg.kernel, cfg.dt, steps);
        debug!(
            coupling = k,
            final_r = traj.r.last().copied().unwrap_or(f64::NAN),
            "Finished coupling"
        );
        traj
    };

    // collect keeps input order in both branches
    let trajectories: Vec<Trajectory> = if cfg.parallel {
        cfg.couplings.par_iter().map(run_one).collect()
    } else {
        cfg.couplings.iter().map(run_one).collect()
    };

    for traj in &trajectories {
        if let Some(anomaly) = traj.anomaly {
            warn!(
                coupling = traj.coupling,
                step = anomaly.step,
                oscillator = anomaly.oscillator,
                "Non-finite phase during integration"
            );
            warnings.push(SweepWarning::NumericAnomaly {
                coupling: traj.coupling,
                anomaly,
            });
        }
    }

    info!(trajectories = trajectories.len(), warnings = warnings.len(), "Sweep complete");

    Ok(SweepResult {
        omega: ensemble.omega.clone(),
        theta0: ensemble.theta0.clone(),
        dt: cfg.dt,
        steps,
        trajectories,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn cfg(couplings: Vec<f64>, t_end: f64, dt: f64) -> SweepConfig {
        SweepConfig {
            n: 3,
            couplings,
            t_end,
            dt,
            ..SweepConfig::default()
        }
    }

    #[test]
    fn rows_match_step_count() {
        let c = cfg(vec![0.0, 1.0], 1.0, 0.1);
        let res = run_sweep(&c).expect("sweep");
        assert_eq!(res.steps, 10);
        for traj in &res.trajectories {
            assert_eq!(traj.len(), 10);
            assert_eq!(traj.phases.len(), 10);
            assert_eq!(traj.r.len(), 10);
            assert_eq!(traj.psi.len(), 10);
            assert!(traj.phases.iter().all(|row| row.len() == 3));
        }
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let res = run_sweep(&cfg(vec![2.0, 0.5, 2.0], 0.5, 0.1)).expect("sweep");
        assert_eq!(res.couplings().collect::<Vec<_>>(), vec![2.0, 0.5, 2.0]);
        assert_eq!(res.trajectories[0], res.trajectories[2]);
        assert_eq!(res.find(0.5).map(|t| t.coupling), Some(0.5));
        assert!(res.find(0.1 + 0.2).is_none());
    }

    #[test]
    fn ensemble_length_must_match_n() {
        let ens = Ensemble::new(vec![0.0; 2], vec![0.0; 2]).expect("ensemble");
        let err = run_sweep_with_ensemble(&cfg(vec![1.0], 1.0, 0.1), &ens).expect_err("mismatch");
        assert!(matches!(err, KuramotoError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn hand_built_ensemble_lengths_are_checked() {
        let ens = Ensemble {
            omega: vec![0.0; 3],
            theta0: vec![0.0; 2],
        };
        let err = run_sweep_with_ensemble(&cfg(vec![1.0], 1.0, 0.1), &ens).expect_err("mismatch");
        assert!(matches!(err, KuramotoError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn degenerate_run_is_data_not_error() {
        let res = run_sweep(&cfg(vec![1.0], 0.05, 0.1)).expect("sweep");
        assert!(res.is_degenerate());
        assert!(res.trajectories[0].is_empty());
        assert_eq!(res.trajectories[0].final_order(), None);
        assert!(matches!(res.warnings[0], SweepWarning::DegenerateRun { steps: 0, .. }));
    }

    #[test]
    fn infinite_coupling_is_flagged() {
        let ens = Ensemble::new(vec![0.0; 3], vec![0.0, 1.0, 2.5]).expect("ensemble");
        let res = run_sweep_with_ensemble(&cfg(vec![1.0, f64::INFINITY], 0.5, 0.1), &ens)
            .expect("sweep");
        assert!(res.trajectories[0].anomaly.is_none());
        let anomaly = res.trajectories[1].anomaly.expect("anomaly flagged");
        assert_eq!(anomaly.step, 1);
        assert_eq!(res.trajectories[1].len(), 5);
        // poisoned rows must not read as synchrony
        let r = &res.trajectories[1].r;
        assert!(r[0].is_finite() && r[0] < 1.0);
        assert!(r[1..].iter().all(|v| v.is_nan()));
        assert!(res.has_anomalies());
        assert!(res
            .warnings
            .iter()
            .any(|w| matches!(w, SweepWarning::NumericAnomaly { .. })));
    }

    #[test]
    fn non_finite_initial_phase_is_flagged_at_row_zero() {
        let ens = Ensemble {
            omega: vec![0.0, 0.0],
            theta0: vec![f64::NAN, 0.0],
        };
        let c = SweepConfig { n: 2, ..cfg(vec![1.0], 0.1, 0.1) };
        let res = run_sweep_with_ensemble(&c, &ens).expect("sweep");
        let traj = &res.trajectories[0];
        assert_eq!(traj.len(), 1);
        let anomaly = traj.anomaly.expect("anomaly flagged");
        assert_eq!((anomaly.step, anomaly.oscillator), (0, 0));
        assert!(anomaly.value.is_nan());
        assert!(traj.r[0].is_nan());
        assert!(res.has_anomalies());
    }

    #[test]
    fn simulate_coupling_row_zero_is_initial() {
        let theta0 = [0.0, PI / 2.0, PI];
        let traj = simulate_coupling(&[1.0, 1.0, 1.0], &theta0, 3.0, CouplingKernel::Pairwise, 0.1, 4);
        assert_eq!(traj.phases[0], theta0.to_vec());
        assert_eq!(traj.times, vec![0.0, 0.1, 0.2, 0.30000000000000004]);
    }
}
