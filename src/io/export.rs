//! CSV views of a sweep for plotting and animation tools.
//!
//! - order-parameter series: `coupling,t,r,psi,anomalous`
//! - final phases vs natural frequency: `coupling,oscillator,omega,theta_final,theta_wrapped,anomalous`
//! - animation frames: `coupling,step,t,oscillator,theta_wrapped,r,anomalous`
//!
//! `anomalous` is true on every row at or after a trajectory's first non-finite phase.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{ensure_config, KuramotoResult};
use crate::math::circle::wrap_phase;
use crate::model::sweep::{SweepResult, Trajectory};

#[derive(Debug, Serialize)]
struct OrderRow {
    coupling: f64,
    t: f64,
    r: f64,
    psi: f64,
    anomalous: bool,
}

#[derive(Debug, Serialize)]
struct FinalPhaseRow {
    coupling: f64,
    oscillator: usize,
    omega: f64,
    theta_final: f64,
    theta_wrapped: f64,
    anomalous: bool,
}

#[derive(Debug, Serialize)]
struct FrameRow {
    coupling: f64,
    step: usize,
    t: f64,
    oscillator: usize,
    theta_wrapped: f64,
    r: f64,
    anomalous: bool,
}

fn is_anomalous(traj: &Trajectory, step: usize) -> bool {
    traj.anomaly.is_some_and(|a| step >= a.step)
}

pub fn write_order_parameter_csv<W: Write>(out: W, result: &SweepResult) -> KuramotoResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for traj in &result.trajectories {
        for (step, ((t, r), psi)) in traj.times.iter().zip(&traj.r).zip(&traj.psi).enumerate() {
            wtr.serialize(OrderRow {
                coupling: traj.coupling,
                t: *t,
                r: *r,
                psi: *psi,
                anomalous: is_anomalous(traj, step),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Last recorded phase of every oscillator against its natural frequency.
pub fn write_final_phases_csv<W: Write>(out: W, result: &SweepResult) -> KuramotoResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for traj in &result.trajectories {
        let Some(last) = traj.final_phases() else {
            continue;
        };
        let anomalous = traj.anomaly.is_some();
        for (i, (theta, omega)) in last.iter().zip(&result.omega).enumerate() {
            wtr.serialize(FinalPhaseRow {
                coupling: traj.coupling,
                oscillator: i,
                omega: *omega,
                theta_final: *theta,
                theta_wrapped: wrap_phase(*theta),
                anomalous,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Every `stride`-th step of every trajectory, one row per oscillator.
pub fn write_frames_csv<W: Write>(out: W, result: &SweepResult, stride: usize) -> KuramotoResult<()> {
    ensure_config!(stride > 0, "frame stride must be > 0");
    let mut wtr = csv::Writer::from_writer(out);
    for traj in &result.trajectories {
        for step in (0..traj.len()).step_by(stride) {
            for (i, theta) in traj.phases[step].iter().enumerate() {
                wtr.serialize(FrameRow {
                    coupling: traj.coupling,
                    step,
                    t: traj.times[step],
                    oscillator: i,
                    theta_wrapped: wrap_phase(*theta),
                    r: traj.r[step],
                    anomalous: is_anomalous(traj, step),
                })?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Files written by [`export_all`].
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub order_parameter: std::path::PathBuf,
    pub final_phases: std::path::PathBuf,
    pub frames: Option<std::path::PathBuf>,
}

/// Write the order-parameter and final-phase tables into `dir`, plus frames when `frame_stride` is set.
pub fn export_all(
    dir: impl AsRef<Path>,
    result: &SweepResult,
    frame_stride: Option<usize>,
) -> KuramotoResult<ExportPaths> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let order_parameter = dir.join("order_parameter.csv");
    write_order_parameter_csv(std::fs::File::create(&order_parameter)?, result)?;

    let final_phases = dir.join("final_phases.csv");
    write_final_phases_csv(std::fs::File::create(&final_phases)?, result)?;

    let frames = match frame_stride {
        Some(stride) => {
            let path = dir.join("frames.csv");
            write_frames_csv(std::fs::File::create(&path)?, result, stride)?;
            Some(path)
        }
        None => None,
    };

    Ok(ExportPaths {
        order_parameter,
        final_phases,
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SweepConfig;
    use crate::model::ensemble::Ensemble;
    use crate::model::sweep::run_sweep_with_ensemble;
    use std::f64::consts::PI;

    fn small_result() -> SweepResult {
        let cfg = SweepConfig {
            n: 2,
            couplings: vec![0.0, 1.0],
            t_end: 0.3,
            dt: 0.1,
            ..SweepConfig::default()
        };
        let ens = Ensemble::new(vec![0.0, 0.0], vec![0.0, -PI / 2.0]).expect("ensemble");
        run_sweep_with_ensemble(&cfg, &ens).expect("sweep")
    }

    fn to_string(buf: Vec<u8>) -> String {
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn order_parameter_rows() {
        let res = small_result();
        let mut buf = Vec::new();
        write_order_parameter_csv(&mut buf, &res).expect("write");
        let text = to_string(buf);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "coupling,t,r,psi,anomalous");
        // 2 couplings x 3 steps
        assert_eq!(lines.len(), 1 + 6);
        assert!(lines[1].starts_with("0.0,0.0,"));
        assert!(lines[1..].iter().all(|l| l.ends_with(",false")));
    }

    #[test]
    fn final_phases_are_wrapped() {
        let res = small_result();
        let mut buf = Vec::new();
        write_final_phases_csv(&mut buf, &res).expect("write");
        let text = to_string(buf);
        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().expect("rows");
        assert_eq!(rows.len(), 4);
        // K = 0, zero frequencies: oscillator 1 stays at -π/2, reported as 3π/2
        let wrapped: f64 = rows[1][4].parse().expect("float");
        assert!((wrapped - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn frames_respect_stride() {
        let res = small_result();
        let mut buf = Vec::new();
        write_frames_csv(&mut buf, &res, 2).expect("write");
        // steps 0 and 2, two oscillators, two couplings
        assert_eq!(to_string(buf).lines().count(), 1 + 2 * 2 * 2);

        let err = write_frames_csv(Vec::new(), &res, 0);
        assert!(err.is_err());
    }

    fn anomalous_column(text: &str) -> Vec<bool> {
        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let idx = rdr
            .headers()
            .expect("headers")
            .iter()
            .position(|h| h == "anomalous")
            .expect("anomalous column");
        rdr.records()
            .map(|rec| rec.expect("row")[idx].parse().expect("bool"))
            .collect()
    }

    #[test]
    fn rows_after_an_anomaly_are_marked() {
        let cfg = SweepConfig {
            n: 3,
            couplings: vec![1.0, f64::INFINITY],
            t_end: 0.3,
            dt: 0.1,
            ..SweepConfig::default()
        };
        let ens = Ensemble::new(vec![0.0; 3], vec![0.0, 1.0, 2.5]).expect("ensemble");
        let res = run_sweep_with_ensemble(&cfg, &ens).expect("sweep");
        assert_eq!(res.trajectories[1].anomaly.map(|a| a.step), Some(1));

        let mut buf = Vec::new();
        write_order_parameter_csv(&mut buf, &res).expect("write");
        // K = 1 clean; K = inf poisoned from step 1
        assert_eq!(
            anomalous_column(&to_string(buf)),
            vec![false, false, false, false, true, true]
        );

        let mut buf = Vec::new();
        write_final_phases_csv(&mut buf, &res).expect("write");
        assert_eq!(
            anomalous_column(&to_string(buf)),
            vec![false, false, false, true, true, true]
        );

        let mut buf = Vec::new();
        write_frames_csv(&mut buf, &res, 2).expect("write");
        // steps 0 and 2, three oscillators each
        let flags = anomalous_column(&to_string(buf));
        assert_eq!(flags.len(), 2 * 2 * 3);
        assert!(flags[..6].iter().all(|f| !f));
        assert_eq!(&flags[6..], &[false, false, false, true, true, true]);
    }

    #[test]
    fn export_all_writes_files() {
        let res = small_result();
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = export_all(dir.path(), &res, Some(1)).expect("export");
        assert!(paths.order_parameter.exists());
        assert!(paths.final_phases.exists());
        assert!(paths.frames.expect("frames").exists());
    }
}
