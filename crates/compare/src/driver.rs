//! Comparison driver: evaluates the patched-conic trajectory and the leg times of
//! flight once, then fans the evaluation legs out across worker threads.

use std::collections::BTreeMap;

use log::{info, warn};
use mga_core::time::days_to_seconds;
use mga_trajectory::{
    BoundaryKind, LegBoundary, MissionDescription, TrajectoryEvaluator, TrajectoryLayout,
};
use rayon::prelude::*;

use crate::differ::{LegResidual, endpoint_residual};
use crate::engine::{LegRequest, NumericalPropagator, TwoBodySolver, propagate_leg};
use crate::error::{ComparisonError, ConfigurationError, LegError};
use crate::tof::resolve_times_of_flight;

/// Relative tolerance between a resolved time of flight and its boundary span.
const TOF_CONSISTENCY_TOLERANCE: f64 = 1e-9;

/// Rounding allowance, in units of epoch magnitude times machine epsilon.
const EPOCH_ROUNDING_ULPS: f64 = 8.0;

/// Epoch each evaluation leg is propagated from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpochOrigin {
    /// Every leg starts at the same epoch (seconds past J2000).
    Shared { epoch_s: f64 },
    /// Every leg starts at its departure boundary's epoch.
    LegDeparture,
}

impl Default for EpochOrigin {
    fn default() -> Self {
        Self::Shared { epoch_s: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonOptions {
    pub epoch_origin: EpochOrigin,
    pub parallel: bool,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            epoch_origin: EpochOrigin::default(),
            parallel: true,
        }
    }
}

/// Result slot of one evaluation leg.
#[derive(Debug)]
pub struct LegOutcome {
    pub index: usize,
    pub from: BoundaryKind,
    pub to: BoundaryKind,
    pub time_of_flight_days: f64,
    pub start_epoch_s: f64,
    pub result: Result<LegResidual, LegError>,
}

/// Aggregated comparison result, one outcome per evaluation leg in index order.
#[derive(Debug)]
pub struct ComparisonReport {
    pub total_delta_v_km_s: f64,
    pub boundaries: Vec<LegBoundary>,
    pub times_of_flight_days: Vec<f64>,
    pub outcomes: Vec<LegOutcome>,
}

impl ComparisonReport {
    pub fn residuals(&self) -> BTreeMap<usize, &LegResidual> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok().map(|r| (outcome.index, r)))
            .collect()
    }

    pub fn failures(&self) -> BTreeMap<usize, &LegError> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err().map(|e| (outcome.index, e)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }
}

pub struct MgaComparison<'a> {
    evaluator: &'a dyn TrajectoryEvaluator,
    solver: &'a dyn TwoBodySolver,
    propagator: &'a dyn NumericalPropagator,
    options: ComparisonOptions,
}

impl<'a> MgaComparison<'a> {
    pub fn new(
        evaluator: &'a dyn TrajectoryEvaluator,
        solver: &'a dyn TwoBodySolver,
        propagator: &'a dyn NumericalPropagator,
    ) -> Self {
        Self {
            evaluator,
            solver,
            propagator,
            options: ComparisonOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ComparisonOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the comparison. Configuration and trajectory errors abort the run;
    /// per-leg failures are recorded in the report.
    pub fn run(&self, mission: &MissionDescription) -> Result<ComparisonReport, ComparisonError> {
        let layout = mission.layout()?;
        check_final_leg(&layout)?;

        let solution = self.evaluator.evaluate(mission, &layout)?;
        if solution.boundaries.len() != layout.boundary_count() {
            return Err(ConfigurationError::BoundaryCountMismatch {
                expected: layout.boundary_count(),
                actual: solution.boundaries.len(),
            }
            .into());
        }

        let times = resolve_times_of_flight(&layout, &mission.parameters)?;
        let legs = layout.evaluation_leg_count();
        if times.len() != legs {
            return Err(ConfigurationError::TimeOfFlightCountMismatch {
                expected: legs,
                actual: times.len(),
            }
            .into());
        }
        check_boundary_spans(&solution.boundaries, &times)?;

        let requests: Vec<LegRequest<'_>> = (0..legs)
            .map(|index| self.request(index, &solution.boundaries, times[index]))
            .collect();

        info!(
            "comparing {legs} evaluation legs ({} legs, {} DSM), patched-conic delta-v {:.4} km/s",
            layout.number_of_legs(),
            layout.dsm_count(),
            solution.total_delta_v_km_s
        );

        let results: Vec<Result<LegResidual, LegError>> = if self.options.parallel {
            requests.par_iter().map(|request| self.compare_leg(request)).collect()
        } else {
            requests.iter().map(|request| self.compare_leg(request)).collect()
        };

        let outcomes: Vec<LegOutcome> = requests
            .iter()
            .zip(results)
            .map(|(request, result)| {
                if let Err(err) = &result {
                    warn!("evaluation leg {} failed: {err}", request.index);
                }
                LegOutcome {
                    index: request.index,
                    from: solution.boundaries[request.index].kind.clone(),
                    to: solution.boundaries[request.index + 1].kind.clone(),
                    time_of_flight_days: times[request.index],
                    start_epoch_s: request.start_epoch_s,
                    result,
                }
            })
            .collect();

        let report = ComparisonReport {
            total_delta_v_km_s: solution.total_delta_v_km_s,
            boundaries: solution.boundaries,
            times_of_flight_days: times,
            outcomes,
        };
        info!(
            "comparison finished: {} of {legs} legs succeeded",
            report.residuals().len()
        );
        Ok(report)
    }

    fn request<'b>(
        &self,
        index: usize,
        boundaries: &'b [LegBoundary],
        time_of_flight_days: f64,
    ) -> LegRequest<'b> {
        let departure = &boundaries[index];
        let arrival = &boundaries[index + 1];
        let start_epoch_s = match self.options.epoch_origin {
            EpochOrigin::Shared { epoch_s } => epoch_s,
            EpochOrigin::LegDeparture => departure.epoch_s,
        };
        LegRequest {
            index,
            departure_position_km: departure.position_km,
            arrival_position_km: arrival.position_km,
            time_of_flight_s: days_to_seconds(time_of_flight_days),
            start_epoch_s,
            departure_body: body_name(&departure.kind),
            arrival_body: body_name(&arrival.kind),
        }
    }

    fn compare_leg(&self, request: &LegRequest<'_>) -> Result<LegResidual, LegError> {
        let histories = propagate_leg(request, self.solver, self.propagator)?;
        endpoint_residual(&histories.analytic, &histories.numerical)
    }
}

fn body_name(kind: &BoundaryKind) -> Option<&str> {
    match kind {
        BoundaryKind::Body(name) => Some(name.as_str()),
        BoundaryKind::DeepSpaceManoeuvre { .. } => None,
    }
}

fn check_final_leg(layout: &TrajectoryLayout) -> Result<(), ConfigurationError> {
    match layout.slots().last() {
        Some(slot) if slot.leg_type.has_dsm() => Err(ConfigurationError::FinalLegDsm {
            leg: slot.leg_index,
        }),
        _ => Ok(()),
    }
}

fn check_boundary_spans(
    boundaries: &[LegBoundary],
    times_of_flight_days: &[f64],
) -> Result<(), ConfigurationError> {
    for (leg, &tof_days) in times_of_flight_days.iter().enumerate() {
        let resolved_s = days_to_seconds(tof_days);
        let (start_s, end_s) = (boundaries[leg].epoch_s, boundaries[leg + 1].epoch_s);
        let boundary_s = end_s - start_s;
        // Boundary epochs are absolute, so their difference inherits their rounding.
        let epoch_rounding_s = EPOCH_ROUNDING_ULPS * f64::EPSILON * start_s.abs().max(end_s.abs());
        let tolerance_s = TOF_CONSISTENCY_TOLERANCE * resolved_s.abs() + epoch_rounding_s;
        if (boundary_s - resolved_s).abs() > tolerance_s {
            return Err(ConfigurationError::TimeOfFlightMismatch {
                leg,
                resolved_s,
                boundary_s,
            });
        }
    }
    Ok(())
}
