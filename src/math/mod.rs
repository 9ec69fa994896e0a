pub mod circle;
pub mod ode;
