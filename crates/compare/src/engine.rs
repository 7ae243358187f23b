//! Per-leg propagation: one analytic two-body arc and one full numerical propagation
//! over the same epoch span, started from matching states.

use log::debug;
use mga_core::StateHistory;
use mga_core::state::{State6, compose};
use mga_core::vector::Vector3;
use mga_ephem::{BodyMap, EphemerisError};
use mga_impulsive::solve_prograde;
use mga_orbits::kepler_propagate;
use mga_propagator::{
    AccelerationModel, IntegrationError, IntegratorSettings, PointMassDynamics, integrate,
};

use crate::error::{GeometryError, LegError};

/// Everything needed to propagate one evaluation leg.
#[derive(Debug, Clone, PartialEq)]
pub struct LegRequest<'a> {
    pub index: usize,
    pub departure_position_km: Vector3,
    pub arrival_position_km: Vector3,
    pub time_of_flight_s: f64,
    pub start_epoch_s: f64,
    /// Bodies at either end; `None` at a DSM point.
    pub departure_body: Option<&'a str>,
    pub arrival_body: Option<&'a str>,
}

impl LegRequest<'_> {
    pub fn end_epoch_s(&self) -> f64 {
        self.start_epoch_s + self.time_of_flight_s
    }

    pub fn leg_bodies(&self) -> Vec<&str> {
        self.departure_body
            .into_iter()
            .chain(self.arrival_body)
            .collect()
    }
}

/// Two-body solution of a leg.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticArc {
    pub history: StateHistory,
    pub departure: State6,
    pub arrival: State6,
    /// Epoch and state halfway through the leg.
    pub midpoint: (f64, State6),
}

pub trait TwoBodySolver: Send + Sync {
    fn solve(&self, request: &LegRequest<'_>) -> Result<AnalyticArc, GeometryError>;
}

pub trait NumericalPropagator: Send + Sync {
    fn propagate(
        &self,
        request: &LegRequest<'_>,
        arc: &AnalyticArc,
    ) -> Result<StateHistory, IntegrationError>;
}

/// Lambert targeting followed by Kepler sampling of the resulting conic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertTargeter {
    pub central_mu_km3_s2: f64,
    /// Samples per leg, endpoints included; values below two are raised to two.
    pub samples: usize,
}

impl LambertTargeter {
    pub fn new(central_mu_km3_s2: f64, samples: usize) -> Self {
        Self {
            central_mu_km3_s2,
            samples,
        }
    }
}

impl TwoBodySolver for LambertTargeter {
    fn solve(&self, request: &LegRequest<'_>) -> Result<AnalyticArc, GeometryError> {
        let tof = request.time_of_flight_s;
        if !(tof.is_finite() && tof > 0.0) {
            return Err(GeometryError::DegenerateTimeOfFlight(tof));
        }
        let r1 = request.departure_position_km;
        let (v1, _) = solve_prograde(r1, request.arrival_position_km, tof, self.central_mu_km3_s2)?;
        let departure = compose(&r1, &v1);

        let last = self.samples.max(2) - 1;
        let mut history = StateHistory::with_capacity(last + 1);
        history.push(request.start_epoch_s, departure)?;
        let mut arrival = departure;
        for k in 1..=last {
            let (epoch_s, dt) = if k == last {
                (request.end_epoch_s(), tof)
            } else {
                let dt = tof * (k as f64 / last as f64);
                (request.start_epoch_s + dt, dt)
            };
            let (r, v) = kepler_propagate(&r1, &v1, dt, self.central_mu_km3_s2)?;
            arrival = compose(&r, &v);
            history.push(epoch_s, arrival)?;
        }

        let (rm, vm) = kepler_propagate(&r1, &v1, tof / 2.0, self.central_mu_km3_s2)?;
        Ok(AnalyticArc {
            history,
            departure,
            arrival,
            midpoint: (request.start_epoch_s + tof / 2.0, compose(&rm, &vm)),
        })
    }
}

/// State the numerical propagation starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationAnchor {
    /// Forward from the analytic departure state.
    #[default]
    Departure,
    /// Backward and forward from the analytic mid-leg state.
    Midpoint,
}

/// Point-mass propagation of a leg through the body environment.
#[derive(Debug, Clone)]
pub struct FullPropagator<'a> {
    bodies: &'a BodyMap,
    acceleration: AccelerationModel,
    settings: IntegratorSettings,
    anchor: PropagationAnchor,
}

impl<'a> FullPropagator<'a> {
    /// Fails when the acceleration model names a body missing from `bodies`.
    pub fn new(
        bodies: &'a BodyMap,
        acceleration: AccelerationModel,
        settings: IntegratorSettings,
        anchor: PropagationAnchor,
    ) -> Result<Self, EphemerisError> {
        bodies.get(&acceleration.central_body)?;
        for name in &acceleration.third_bodies {
            bodies.get(name)?;
        }
        Ok(Self {
            bodies,
            acceleration,
            settings,
            anchor,
        })
    }

    pub fn acceleration(&self) -> &AccelerationModel {
        &self.acceleration
    }
}

impl NumericalPropagator for FullPropagator<'_> {
    fn propagate(
        &self,
        request: &LegRequest<'_>,
        arc: &AnalyticArc,
    ) -> Result<StateHistory, IntegrationError> {
        let dynamics =
            PointMassDynamics::for_leg(self.bodies, &self.acceleration, &request.leg_bodies())?;
        let start = request.start_epoch_s;
        let end = request.end_epoch_s();

        match self.anchor {
            PropagationAnchor::Departure => {
                integrate(&dynamics, &self.settings, start, &arc.departure, end)
            }
            PropagationAnchor::Midpoint => {
                let (mid_epoch, mid_state) = arc.midpoint;
                let backward = integrate(&dynamics, &self.settings, mid_epoch, &mid_state, start)?;
                let forward = integrate(&dynamics, &self.settings, mid_epoch, &mid_state, end)?;
                let mut merged = backward;
                for (&epoch_s, state) in forward.epochs().iter().zip(forward.states()).skip(1) {
                    merged.push(epoch_s, *state)?;
                }
                Ok(merged)
            }
        }
    }
}

/// Analytic and numerical histories of one evaluation leg.
#[derive(Debug, Clone, PartialEq)]
pub struct LegHistories {
    pub index: usize,
    pub analytic: StateHistory,
    pub numerical: StateHistory,
}

/// Solve and propagate one leg; the numerical run starts from the analytic states.
pub fn propagate_leg(
    request: &LegRequest<'_>,
    solver: &dyn TwoBodySolver,
    propagator: &dyn NumericalPropagator,
) -> Result<LegHistories, LegError> {
    let arc = solver.solve(request)?;
    let numerical = propagator.propagate(request, &arc)?;
    debug!(
        "leg {}: {} analytic and {} numerical samples over {:.3} days",
        request.index,
        arc.history.len(),
        numerical.len(),
        mga_core::time::seconds_to_days(request.time_of_flight_s)
    );
    Ok(LegHistories {
        index: request.index,
        analytic: arc.history,
        numerical,
    })
}
