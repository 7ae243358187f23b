//! Impulsive transfer utilities: the Lambert boundary-value solver used on every patched-conic leg.

pub mod lambert;

pub use lambert::{LambertSolverError, solve as lambert_solve, solve_prograde};
