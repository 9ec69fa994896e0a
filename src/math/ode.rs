//! Classic fixed-step 4th-order Runge-Kutta for systems `y' = f(t, y)`.
//!
//! State and derivative are `&[f64]` / `&mut [f64]`; the right-hand side writes
//! its result into the output slice so stage buffers can be reused.

/// Stage buffers for allocation-free RK4 steps.
#[derive(Debug, Clone)]
pub struct Rk4Workspace {
    pub k1: Vec<f64>,
    pub k2: Vec<f64>,
    pub k3: Vec<f64>,
    pub k4: Vec<f64>,
    pub ytmp: Vec<f64>,
}

impl Rk4Workspace {
    pub fn new(n: usize) -> Self {
        Self {
            k1: vec![0.0; n],
            k2: vec![0.0; n],
            k3: vec![0.0; n],
            k4: vec![0.0; n],
            ytmp: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.k1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.k1.is_empty()
    }

    pub fn resize(&mut self, n: usize) {
        if self.k1.len() != n {
            for buf in [&mut self.k1, &mut self.k2, &mut self.k3, &mut self.k4, &mut self.ytmp] {
                buf.resize(n, 0.0);
            }
        }
    }
}

// out = y + a * k
fn offset(out: &mut [f64], y: &[f64], a: f64, k: &[f64]) {
    for ((o, yi), ki) in out.iter_mut().zip(y).zip(k) {
        *o = yi + a * ki;
    }
}

/// Advance `y` in place by exactly `dt` using four evaluations of `f`.
///
/// ```text
/// k1 = f(t, y)
/// k2 = f(t + dt/2, y + dt/2 k1)
/// k3 = f(t + dt/2, y + dt/2 k2)
/// k4 = f(t + dt,   y + dt k3)
/// y' = y + dt/6 (k1 + 2k2 + 2k3 + k4)
/// ```
pub fn rk4_step_ws<F>(y: &mut [f64], t: f64, dt: f64, ws: &mut Rk4Workspace, mut f: F)
where
    F: FnMut(f64, &[f64], &mut [f64]),
{
    ws.resize(y.len());
    let Rk4Workspace { k1, k2, k3, k4, ytmp } = ws;
    let half = 0.5 * dt;

    f(t, y, k1);
    offset(ytmp, y, half, k1);
    f(t + half, ytmp, k2);
    offset(ytmp, y, half, k2);
    f(t + half, ytmp, k3);
    offset(ytmp, y, dt, k3);
    f(t + dt, ytmp, k4);

    let w = dt / 6.0;
    for i in 0..y.len() {
        y[i] += w * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
}

/// One-off RK4 step that allocates its own stage buffers.
pub fn rk4_step<F>(y: &mut [f64], t: f64, dt: f64, f: F)
where
    F: FnMut(f64, &[f64], &mut [f64]),
{
    let mut ws = Rk4Workspace::new(y.len());
    rk4_step_ws(y, t, dt, &mut ws, f);
}
