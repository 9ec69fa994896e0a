use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analysis::{critical_coupling_gaussian, summarize};
use crate::config::SweepConfig;
use crate::error::KuramotoResult;
use crate::model::sweep::{SweepResult, SweepWarning};

fn opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.6}")).unwrap_or_else(|| "-".to_string())
}

/// Write the plain-text report for a sweep to `out`.
pub fn write_sweep_report<W: Write>(
    mut f: W,
    run_id: &str,
    cfg: &SweepConfig,
    result: &SweepResult,
) -> KuramotoResult<()> {
    let couplings: Vec<String> = cfg.couplings.iter().map(|k| format!("{k}")).collect();

    writeln!(f, "run_id={run_id}")?;
    writeln!(f, "n={}", cfg.n)?;
    writeln!(f, "couplings={}", couplings.join(","))?;
    writeln!(f, "t_end={:.6}", cfg.t_end)?;
    writeln!(f, "dt={:.6}", cfg.dt)?;
    writeln!(f, "steps={}", result.steps)?;
    writeln!(f, "seed={}", cfg.seed)?;
    writeln!(f, "freq_std={:.6}", cfg.freq_std)?;
    writeln!(f, "critical_coupling={:.6}", critical_coupling_gaussian(cfg.freq_std))?;
    writeln!(f, "kernel={:?}", cfg.kernel)?;
    writeln!(f)?;
    writeln!(f, "coupling,steps,initial_r,final_r,steady_r,final_psi,anomaly_step")?;

    for row in summarize(result) {
        let anomaly = row
            .anomaly
            .map(|a| a.step.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            f,
            "{:.6},{},{},{},{},{},{}",
            row.coupling,
            row.steps,
            opt(row.initial_r),
            opt(row.final_r),
            opt(row.steady_r),
            opt(row.final_psi),
            anomaly
        )?;
    }

    for w in &result.warnings {
        match w {
            SweepWarning::DegenerateRun { t_end, dt, steps } => {
                writeln!(f, "warning=degenerate_run t_end={t_end:.6} dt={dt:.6} steps={steps}")?
            }
            SweepWarning::NumericAnomaly { coupling, anomaly } => writeln!(
                f,
                "warning=numeric_anomaly coupling={coupling:.6} step={} oscillator={}",
                anomaly.step, anomaly.oscillator
            )?,
        }
    }
    Ok(())
}

/// Write `sweep_<run_id>.txt` into `out_dir` (created if missing) and return its path.
pub fn write_sweep_log(
    out_dir: impl AsRef<Path>,
    run_id: &str,
    cfg: &SweepConfig,
    result: &SweepResult,
) -> KuramotoResult<PathBuf> {
    std::fs::create_dir_all(out_dir.as_ref())?;
    let path = out_dir.as_ref().join(format!("sweep_{run_id}.txt"));
    let file = std::fs::File::create(&path)?;
    let mut out = std::io::BufWriter::new(file);
    write_sweep_report(&mut out, run_id, cfg, result)?;
    out.flush()?;
    Ok(path)
}
