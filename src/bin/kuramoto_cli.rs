//! Kuramoto sweep CLI.
//!
//! Commands:
//! - run: simulate every coupling constant, export CSV tables and a run log
//! - critical: print the analytic critical coupling for a Gaussian frequency spread

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use kuramoto_sweep::analysis::{critical_coupling_gaussian, summarize};
use kuramoto_sweep::io::ensemble_csv::load_ensemble_csv;
use kuramoto_sweep::io::export::export_all;
use kuramoto_sweep::io::run_log::write_sweep_log;
use kuramoto_sweep::{run_sweep, run_sweep_with_ensemble, CouplingKernel, SweepConfig};

#[derive(Parser)]
#[command(name = "kuramoto")]
#[command(version)]
#[command(about = "Kuramoto synchronization sweeps over coupling strength")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a coupling sweep
    Run {
        /// JSON config file; flags below override its fields
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of oscillators
        #[arg(long)]
        n: Option<usize>,

        /// Coupling constants (comma-separated)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        couplings: Option<Vec<f64>>,

        /// Total simulated time
        #[arg(long)]
        t_end: Option<f64>,

        /// Step size
        #[arg(long)]
        dt: Option<f64>,

        /// Ensemble seed
        #[arg(long)]
        seed: Option<u64>,

        /// Standard deviation of natural frequencies
        #[arg(long)]
        freq_std: Option<f64>,

        /// Coupling kernel: pairwise | mean_field
        #[arg(long)]
        kernel: Option<CouplingKernel>,

        /// Simulate coupling constants in parallel
        #[arg(long)]
        parallel: bool,

        /// CSV with columns omega,theta0 replacing the seeded ensemble
        #[arg(long)]
        ensemble: Option<String>,

        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,

        /// Also write animation frames, keeping every Nth step
        #[arg(long)]
        frame_stride: Option<usize>,

        /// Run id used in the log file name
        #[arg(long, default_value = "sweep")]
        run_id: String,
    },

    /// Print the critical coupling K_c for Gaussian natural frequencies
    Critical {
        /// Standard deviation of natural frequencies
        #[arg(long, default_value = "1.0")]
        freq_std: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            config,
            n,
            couplings,
            t_end,
            dt,
            seed,
            freq_std,
            kernel,
            parallel,
            ensemble,
            out,
            frame_stride,
            run_id,
        } => {
            let mut cfg = match &config {
                Some(path) => SweepConfig::from_json_file(path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => SweepConfig::default(),
            };
            if let Some(v) = n {
                cfg.n = v;
            }
            if let Some(v) = couplings {
                cfg.couplings = v;
            }
            if let Some(v) = t_end {
                cfg.t_end = v;
            }
            if let Some(v) = dt {
                cfg.dt = v;
            }
            if let Some(v) = seed {
                cfg.seed = v;
            }
            if let Some(v) = freq_std {
                cfg.freq_std = v;
            }
            if let Some(v) = kernel {
                cfg.kernel = v;
            }
            cfg.parallel |= parallel;

            let result = match &ensemble {
                Some(path) => {
                    let ens = load_ensemble_csv(path)
                        .with_context(|| format!("Failed to load ensemble CSV: {path}"))?;
                    // an explicit ensemble fixes N
                    cfg.n = ens.len();
                    run_sweep_with_ensemble(&cfg, &ens)?
                }
                None => run_sweep(&cfg)?,
            };

            let paths = export_all(&out, &result, frame_stride)
                .with_context(|| format!("Failed to export into {}", out.display()))?;
            let log_path = write_sweep_log(&out, &run_id, &cfg, &result)?;
            info!(
                order_parameter = %paths.order_parameter.display(),
                final_phases = %paths.final_phases.display(),
                log = %log_path.display(),
                "Wrote results"
            );

            println!("\n=== Sweep Complete ===");
            println!("coupling,final_r,steady_r");
            for row in summarize(&result) {
                let fmt = |v: Option<f64>| v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "-".into());
                println!("{},{},{}", row.coupling, fmt(row.final_r), fmt(row.steady_r));
            }
        }
        Commands::Critical { freq_std } => {
            println!("{:.6}", critical_coupling_gaussian(freq_std));
        }
    }

    Ok(())
}
