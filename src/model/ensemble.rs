use std::f64::consts::TAU;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::{KuramotoError, KuramotoResult};

/// Natural frequencies and initial phases shared by every coupling constant of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    pub omega: Vec<f64>,
    pub theta0: Vec<f64>,
}

impl Ensemble {
    /// Build from explicit vectors. Lengths must agree and every value must be finite.
    pub fn new(omega: Vec<f64>, theta0: Vec<f64>) -> KuramotoResult<Self> {
        if omega.len() != theta0.len() {
            return Err(KuramotoError::dimension_mismatch(omega.len(), theta0.len()));
        }
        if let Some(i) = omega.iter().position(|w| !w.is_finite()) {
            return Err(KuramotoError::InvalidEnsemble {
                message: format!("omega[{i}] is not finite"),
            });
        }
        if let Some(i) = theta0.iter().position(|t| !t.is_finite()) {
            return Err(KuramotoError::InvalidEnsemble {
                message: format!("theta0[{i}] is not finite"),
            });
        }
        Ok(Self { omega, theta0 })
    }

    pub fn len(&self) -> usize {
        self.omega.len()
    }

    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }
}

/// Seeded draw of `omega ~ N(0, freq_std²)` and `theta0 ~ U[0, 2π)`.
///
/// The initializer is a value owned by the caller; there is no process-wide seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleInitializer {
    pub seed: u64,
    pub freq_std: f64,
}

impl EnsembleInitializer {
    pub fn new(seed: u64, freq_std: f64) -> Self {
        Self { seed, freq_std }
    }

    /// Same seed, same `n`: bit-identical output.
    pub fn draw(&self, n: usize) -> KuramotoResult<Ensemble> {
        let normal = Normal::new(0.0, self.freq_std).map_err(|e| {
            KuramotoError::invalid_config(format!("freq_std {}: {e}", self.freq_std))
        })?;
        let uniform = Uniform::new(0.0, TAU);

        // all frequencies first, then all phases
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let omega: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
        let theta0: Vec<f64> = (0..n).map(|_| uniform.sample(&mut rng)).collect();

        Ok(Ensemble { omega, theta0 })
    }
}
