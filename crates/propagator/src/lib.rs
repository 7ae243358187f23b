//! Full-dynamics propagation: fixed and adaptive Runge-Kutta integrators driven by a
//! point-mass gravity model whose perturbing bodies follow their ephemerides.

mod coefficients;
pub mod dynamics;
pub mod integrator;

use mga_core::HistoryError;
use mga_ephem::EphemerisError;
use thiserror::Error;

pub use dynamics::{AccelerationModel, PointMassDynamics};
pub use integrator::{IntegratorSettings, OdeSystem, integrate};

/// Failures of a numerical propagation.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("invalid integrator settings: {0}")]
    InvalidSettings(String),
    #[error("state became non-finite at t = {epoch_s} s")]
    NonFiniteState { epoch_s: f64 },
    #[error("step size {step_s} s fell below the minimum at t = {epoch_s} s")]
    StepSizeTooSmall { epoch_s: f64, step_s: f64 },
    #[error("integration exceeded {max_steps} steps")]
    MaxStepsExceeded { max_steps: u64 },
    #[error("force model evaluation failed: {0}")]
    Ephemeris(#[from] EphemerisError),
    #[error("propagated history is inconsistent: {0}")]
    History(#[from] HistoryError),
}
