use mga_core::StateHistory;
use mga_core::state::{State6, difference};
use mga_core::vector::norm;

use crate::error::LegError;

/// Histories whose endpoint epochs differ by more than this are not compared.
pub const EPOCH_TOLERANCE_S: f64 = 1e-6;

/// Analytic minus numerical state at both ends of a leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegResidual {
    pub departure_epoch_s: f64,
    pub arrival_epoch_s: f64,
    pub departure: State6,
    pub arrival: State6,
}

impl LegResidual {
    pub fn departure_position_error_km(&self) -> f64 {
        norm(&[self.departure[0], self.departure[1], self.departure[2]])
    }

    pub fn departure_velocity_error_km_s(&self) -> f64 {
        norm(&[self.departure[3], self.departure[4], self.departure[5]])
    }

    pub fn arrival_position_error_km(&self) -> f64 {
        norm(&[self.arrival[0], self.arrival[1], self.arrival[2]])
    }

    pub fn arrival_velocity_error_km_s(&self) -> f64 {
        norm(&[self.arrival[3], self.arrival[4], self.arrival[5]])
    }
}

/// Difference the first and last samples of the two histories.
pub fn endpoint_residual(
    analytic: &StateHistory,
    numerical: &StateHistory,
) -> Result<LegResidual, LegError> {
    let (analytic_start_s, analytic_first) =
        analytic.first().ok_or(LegError::EmptyHistory("analytic"))?;
    let (analytic_end_s, analytic_last) =
        analytic.last().ok_or(LegError::EmptyHistory("analytic"))?;
    let (numerical_start_s, numerical_first) =
        numerical.first().ok_or(LegError::EmptyHistory("numerical"))?;
    let (numerical_end_s, numerical_last) =
        numerical.last().ok_or(LegError::EmptyHistory("numerical"))?;

    if (analytic_start_s - numerical_start_s).abs() > EPOCH_TOLERANCE_S
        || (analytic_end_s - numerical_end_s).abs() > EPOCH_TOLERANCE_S
    {
        return Err(LegError::EpochMismatch {
            analytic_start_s,
            analytic_end_s,
            numerical_start_s,
            numerical_end_s,
        });
    }

    Ok(LegResidual {
        departure_epoch_s: analytic_start_s,
        arrival_epoch_s: analytic_end_s,
        departure: difference(analytic_first, numerical_first),
        arrival: difference(analytic_last, numerical_last),
    })
}
