use kuramoto_sweep::analysis::{critical_coupling_gaussian, summarize};
use kuramoto_sweep::{run_sweep, SweepConfig};

fn main() -> anyhow::Result<()> {
    let freq_std = 1.0;
    let kc = critical_coupling_gaussian(freq_std);

    // Couplings from well below to well above the transition
    let couplings: Vec<f64> = (0..=12).map(|i| kc * i as f64 / 4.0).collect();

    let cfg = SweepConfig {
        n: 200,
        couplings,
        t_end: 60.0,
        dt: 0.05,
        seed: 42,
        freq_std,
        parallel: true,
        ..SweepConfig::default()
    };

    let result = run_sweep(&cfg)?;

    println!("# K_c = {:.4}", kc);
    println!("K,K_over_Kc,steady_r");
    for row in summarize(&result) {
        println!(
            "{:.4},{:.2},{:.4}",
            row.coupling,
            row.coupling / kc,
            row.steady_r.unwrap_or(f64::NAN)
        );
    }

    Ok(())
}
