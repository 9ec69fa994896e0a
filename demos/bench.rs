use std::time::Instant;

use kuramoto_sweep::{run_sweep, CouplingKernel, SweepConfig};

fn time_ms(cfg: &SweepConfig) -> anyhow::Result<f64> {
    let start = Instant::now();
    let _ = run_sweep(cfg)?;
    Ok(start.elapsed().as_secs_f64() * 1000.0)
}

fn main() -> anyhow::Result<()> {
    // Larger ensemble to amplify the O(N²) vs O(N) gap
    let base = SweepConfig {
        n: 400,
        couplings: vec![0.5, 1.0, 1.5, 2.0, 3.0, 4.0, 6.0, 8.0],
        t_end: 10.0,
        dt: 0.05,
        ..SweepConfig::default()
    };

    let pairwise = time_ms(&base)?;
    let pairwise_par = time_ms(&SweepConfig { parallel: true, ..base.clone() })?;
    let mean_field = time_ms(&SweepConfig { kernel: CouplingKernel::MeanField, ..base.clone() })?;
    let mean_field_par = time_ms(&SweepConfig {
        kernel: CouplingKernel::MeanField,
        parallel: true,
        ..base.clone()
    })?;

    println!("pairwise_ms,pairwise_par_ms,mean_field_ms,mean_field_par_ms,kernel_speedup_x");
    println!(
        "{:.3},{:.3},{:.3},{:.3},{:.2}",
        pairwise,
        pairwise_par,
        mean_field,
        mean_field_par,
        pairwise.max(1e-9) / mean_field.max(1e-9)
    );

    Ok(())
}
