//! Kuramoto phase dynamics with all-to-all coupling.
//!
//! ```text
//! dθᵢ/dt = ωᵢ + (K/N) Σⱼ sin(θⱼ - θᵢ)
//! ```
//!
//! Phases are never wrapped here; wrapping is a reporting concern.

use crate::config::CouplingKernel;
use crate::math::ode::{rk4_step_ws, Rk4Workspace};

/// Explicit double-sum right-hand side. Writes `dθ` into `dtheta`.
///
/// With `coupling == 0.0` this is exactly `dθᵢ = ωᵢ`.
pub fn phase_derivative(theta: &[f64], omega: &[f64], coupling: f64, dtheta: &mut [f64]) {
    let n = theta.len();
    debug_assert_eq!(omega.len(), n);
    debug_assert_eq!(dtheta.len(), n);
    let scale = coupling / n as f64;

    for i in 0..n {
        let th_i = theta[i];
        let mut sum = 0.0;
        for &th_j in theta {
            sum += (th_j - th_i).sin();
        }
        dtheta[i] = omega[i] + scale * sum;
    }
}

/// Same law through the mean phase vector:
/// `Σⱼ sin(θⱼ - θᵢ) = S cos θᵢ - C sin θᵢ` with `S = Σ sin θⱼ`, `C = Σ cos θⱼ`.
pub fn phase_derivative_mean_field(
    theta: &[f64],
    omega: &[f64],
    coupling: f64,
    dtheta: &mut [f64],
) {
    let n = theta.len();
    debug_assert_eq!(omega.len(), n);
    debug_assert_eq!(dtheta.len(), n);
    let scale = coupling / n as f64;

    let (s, c) = theta
        .iter()
        .fold((0.0, 0.0), |(s, c), th| (s + th.sin(), c + th.cos()));
    for ((d, th), w) in dtheta.iter_mut().zip(theta).zip(omega) {
        let (sin_i, cos_i) = th.sin_cos();
        *d = w + scale * (s * cos_i - c * sin_i);
    }
}

/// Natural frequencies and one coupling constant: everything the right-hand side needs.
#[derive(Debug, Clone, Copy)]
pub struct KuramotoModel<'a> {
    pub omega: &'a [f64],
    pub coupling: f64,
    pub kernel: CouplingKernel,
}

impl<'a> KuramotoModel<'a> {
    pub fn new(omega: &'a [f64], coupling: f64) -> Self {
        Self {
            omega,
            coupling,
            kernel: CouplingKernel::Pairwise,
        }
    }

    pub fn with_kernel(mut self, kernel: CouplingKernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn deriv(&self, theta: &[f64], dtheta: &mut [f64]) {
        match self.kernel {
            CouplingKernel::Pairwise => phase_derivative(theta, self.omega, self.coupling, dtheta),
            CouplingKernel::MeanField => {
                phase_derivative_mean_field(theta, self.omega, self.coupling, dtheta)
            }
        }
    }

    /// Advance `theta` in place by `dt` (one RK4 step, four `deriv` calls).
    pub fn step(&self, theta: &mut [f64], dt: f64, ws: &mut Rk4Workspace) {
        // autonomous system: the stage time is unused
        rk4_step_ws(theta, 0.0, dt, ws, |_, th, dth| self.deriv(th, dth));
    }

    /// Non-mutating form of [`step`](Self::step).
    pub fn advanced(&self, theta: &[f64], dt: f64) -> Vec<f64> {
        let mut next = theta.to_vec();
        let mut ws = Rk4Workspace::new(theta.len());
        self.step(&mut next, dt, &mut ws);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::PI;

    #[test]
    fn zero_coupling_returns_natural_frequencies_exactly() {
        let theta = [0.3, 2.0, -1.0, 5.5];
        let omega = [0.5, -0.25, 1.5, 0.0];
        let mut d = [f64::NAN; 4];
        phase_derivative(&theta, &omega, 0.0, &mut d);
        assert_eq!(d, omega);
        phase_derivative_mean_field(&theta, &omega, 0.0, &mut d);
        assert_eq!(d, omega);
    }

    #[test]
    fn two_oscillators_pull_together() {
        // θ₁ behind θ₂ -> θ₁ speeds up, θ₂ slows down
        let theta = [0.0, 1.0];
        let omega = [0.0, 0.0];
        let mut d = [0.0; 2];
        phase_derivative(&theta, &omega, 2.0, &mut d);
        assert_abs_diff_eq!(d[0], 1.0f64.sin(), epsilon = 1e-15);
        assert_abs_diff_eq!(d[1], -(1.0f64.sin()), epsilon = 1e-15);
    }

    #[test]
    fn synchronized_state_has_no_coupling_force() {
        let theta = [1.2; 5];
        let omega = [0.1, 0.2, 0.3, 0.4, 0.5];
        let mut d = [0.0; 5];
        phase_derivative(&theta, &omega, 10.0, &mut d);
        assert_eq!(d, omega);
    }

    #[test]
    fn mean_field_matches_pairwise() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 64;
        let theta: Vec<f64> = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
        let omega: Vec<f64> = (0..n).map(|_| rng.gen_range(-2.0..2.0)).collect();
        let mut a = vec![0.0; n];
        let mut b = vec![0.0; n];
        for k in [0.5, 3.0, 25.0] {
            phase_derivative(&theta, &omega, k, &mut a);
            phase_derivative_mean_field(&theta, &omega, k, &mut b);
            for (x, y) in a.iter().zip(&b) {
                assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn step_with_zero_coupling_is_linear_drift() {
        let omega = [1.0, -0.5, 2.0];
        let theta0 = [0.0, PI / 2.0, PI];
        let model = KuramotoModel::new(&omega, 0.0);
        let mut theta = theta0;
        let mut ws = Rk4Workspace::new(3);
        let h = 0.01;
        for _ in 0..250 {
            model.step(&mut theta, h, &mut ws);
        }
        for i in 0..3 {
            assert_abs_diff_eq!(theta[i], theta0[i] + omega[i] * 2.5, epsilon = 1e-10);
        }
    }

    #[test]
    fn advanced_leaves_input_untouched() {
        let omega = [0.0, 0.0];
        let theta = [0.0, 0.5];
        let model = KuramotoModel::new(&omega, 4.0).with_kernel(CouplingKernel::MeanField);
        let next = model.advanced(&theta, 0.1);
        assert_eq!(theta, [0.0, 0.5]);
        assert!(next[1] - next[0] < 0.5);
    }
}
