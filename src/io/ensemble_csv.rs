use serde::Deserialize;

use crate::error::KuramotoResult;
use crate::model::ensemble::Ensemble;

#[derive(Debug, Deserialize)]
struct EnsembleRow {
    omega: f64,
    theta0: f64,
}

/// Load an explicit ensemble from a CSV file with columns `omega,theta0`, one row per oscillator.
pub fn load_ensemble_csv(path: &str) -> KuramotoResult<Ensemble> {
    let rdr = csv::Reader::from_path(path)?;
    read_ensemble(rdr)
}

fn read_ensemble<R: std::io::Read>(mut rdr: csv::Reader<R>) -> KuramotoResult<Ensemble> {
    let mut omega = Vec::new();
    let mut theta0 = Vec::new();
    for result in rdr.deserialize::<EnsembleRow>() {
        let row = result?;
        omega.push(row.omega);
        theta0.push(row.theta0);
    }
    Ensemble::new(omega, theta0)
}
