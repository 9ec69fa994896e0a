pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod math;
pub mod model;

pub use config::{CouplingKernel, SweepConfig};
pub use error::{KuramotoError, KuramotoResult};
pub use math::circle::OrderParameter;
pub use model::ensemble::{Ensemble, EnsembleInitializer};
pub use model::sweep::{run_sweep, run_sweep_with_ensemble, SweepResult, Trajectory};
