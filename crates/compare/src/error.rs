use mga_core::HistoryError;
use mga_impulsive::LambertSolverError;
use mga_orbits::KeplerError;
use mga_propagator::IntegrationError;
use mga_trajectory::{LayoutError, TrajectoryError};
use thiserror::Error;

/// Inconsistent mission inputs; detected before any leg is propagated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("parameter vector has {actual} entries but the layout was built for {expected}")]
    ParameterCountMismatch { expected: usize, actual: usize },
    #[error(
        "final leg {leg} carries a DSM; its pre-manoeuvre sub-leg has no resolved time of flight"
    )]
    FinalLegDsm { leg: usize },
    #[error("evaluator returned {actual} boundary points, layout expects {expected}")]
    BoundaryCountMismatch { expected: usize, actual: usize },
    #[error("resolver produced {actual} times of flight for {expected} evaluation legs")]
    TimeOfFlightCountMismatch { expected: usize, actual: usize },
    #[error(
        "evaluation leg {leg}: resolved time of flight {resolved_s} s disagrees with boundary span {boundary_s} s"
    )]
    TimeOfFlightMismatch {
        leg: usize,
        resolved_s: f64,
        boundary_s: f64,
    },
}

/// The analytic two-body solver could not produce an arc for a leg.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("time of flight must be positive and finite, got {0} s")]
    DegenerateTimeOfFlight(f64),
    #[error("lambert targeting failed: {0}")]
    Lambert(#[from] LambertSolverError),
    #[error("kepler sampling failed: {0}")]
    Kepler(#[from] KeplerError),
    #[error("analytic history is inconsistent: {0}")]
    History(#[from] HistoryError),
}

/// Failure of a single evaluation leg; sibling legs are unaffected.
#[derive(Debug, Error)]
pub enum LegError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("full propagation failed: {0}")]
    Integration(#[from] IntegrationError),
    #[error("{0} history is empty")]
    EmptyHistory(&'static str),
    #[error(
        "history spans differ: analytic [{analytic_start_s}, {analytic_end_s}] s, numerical [{numerical_start_s}, {numerical_end_s}] s"
    )]
    EpochMismatch {
        analytic_start_s: f64,
        analytic_end_s: f64,
        numerical_start_s: f64,
        numerical_end_s: f64,
    },
}

/// Errors that abort a whole comparison run.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("patched-conic evaluation failed: {0}")]
    Trajectory(#[from] TrajectoryError),
}

impl From<LayoutError> for ComparisonError {
    fn from(err: LayoutError) -> Self {
        Self::Configuration(err.into())
    }
}
