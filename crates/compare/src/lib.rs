//! Patched-conic versus full-propagation comparison of MGA trajectories.
//!
//! The driver evaluates the patched-conic trajectory and resolves the leg times of
//! flight once per run, then propagates every evaluation leg twice (two-body arc
//! and full point-mass dynamics) and differences the endpoint states.

pub mod differ;
pub mod driver;
pub mod engine;
pub mod error;
pub mod facade;
pub mod tof;

pub use differ::{EPOCH_TOLERANCE_S, LegResidual, endpoint_residual};
pub use driver::{ComparisonOptions, ComparisonReport, EpochOrigin, LegOutcome, MgaComparison};
pub use engine::{
    AnalyticArc, FullPropagator, LambertTargeter, LegHistories, LegRequest, NumericalPropagator,
    PropagationAnchor, TwoBodySolver, propagate_leg,
};
pub use error::{ComparisonError, ConfigurationError, GeometryError, LegError};
pub use tof::resolve_times_of_flight;
