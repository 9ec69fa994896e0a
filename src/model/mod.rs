pub mod ensemble;
pub mod kuramoto;
pub mod sweep;
