#![allow(dead_code)]

use mga_fidelity::base::StateHistory;
use mga_fidelity::base::constants::{AU_KM, MU_SUN};
use mga_fidelity::base::time::days_to_seconds;
use mga_fidelity::compare::{AnalyticArc, LegRequest, NumericalPropagator};
use mga_fidelity::ephem::{ApproximatePlanet, Body, BodyMap, FixedState, Planet};
use mga_fidelity::propagator::IntegrationError;
use mga_fidelity::trajectory::{
    BoundaryKind, LegBoundary, MissionDescription, PatchedConicSolution, TrajectoryError,
    TrajectoryEvaluator, TrajectoryLayout, split_leg_duration,
};

pub fn names(bodies: &[&str]) -> Vec<String> {
    bodies.iter().map(|name| name.to_string()).collect()
}

/// Sun at the origin plus mean-element inner planets and Jupiter.
pub fn solar_system() -> BodyMap {
    let mut bodies = BodyMap::new();
    bodies.insert(Body::new(
        "Sun",
        MU_SUN,
        696_000.0,
        Box::new(FixedState::origin()),
    ));
    for (name, planet, mu, radius) in [
        ("Venus", Planet::Venus, 324_858.592, 6_051.8),
        ("Earth", Planet::EarthMoonBarycenter, 398_600.435_436, 6_371.0),
        ("Mars", Planet::Mars, 42_828.375_214, 3_389.5),
        ("Jupiter", Planet::Jupiter, 126_712_764.1, 69_911.0),
    ] {
        bodies.insert(Body::new(
            name,
            mu,
            radius,
            Box::new(ApproximatePlanet::new(planet)),
        ));
    }
    bodies
}

/// Earth -> Venus -> Mars without manoeuvres.
pub fn earth_venus_mars() -> MissionDescription {
    MissionDescription::new(
        names(&["Earth", "Venus", "Mars"]),
        vec![
            mga_fidelity::trajectory::LegType::Departure,
            mga_fidelity::trajectory::LegType::Swingby,
        ],
        vec![10_200.0, 150.0, 250.0],
    )
}

/// Earth -> Venus -> (DSM) -> Earth -> Mars.
pub fn earth_venus_earth_mars_dsm(fraction: f64) -> MissionDescription {
    use mga_fidelity::trajectory::LegType::{Departure, Swingby, SwingbyWithDsm};
    MissionDescription::new(
        names(&["Earth", "Venus", "Earth", "Mars"]),
        vec![Departure, SwingbyWithDsm, Swingby],
        vec![10_280.0, 130.0, 250.0, 200.0, fraction, 4.0, 12_000.0, 0.0],
    )
}

/// Boundary points laid out on a widening spiral, with epochs taken from the
/// parameter vector the same way the patched-conic evaluator takes them.
#[derive(Debug, Default)]
pub struct SpiralEvaluator;

impl TrajectoryEvaluator for SpiralEvaluator {
    fn evaluate(
        &self,
        mission: &MissionDescription,
        layout: &TrajectoryLayout,
    ) -> Result<PatchedConicSolution, TrajectoryError> {
        let p = &mission.parameters;
        let mut epoch_s = days_to_seconds(p[layout.departure_epoch_slot()]);
        let mut boundaries = Vec::new();
        for slot in layout.slots() {
            let duration = p[layout.duration_slot(slot.leg_index)];
            boundaries.push(spiral_point(
                boundaries.len(),
                epoch_s,
                BoundaryKind::Body(mission.bodies[slot.leg_index].clone()),
            ));
            if let Some(dsm) = slot.dsm_index {
                let (pre, _) = split_leg_duration(p[layout.dsm_fraction_slot(dsm)], duration);
                boundaries.push(spiral_point(
                    boundaries.len(),
                    epoch_s + days_to_seconds(pre),
                    BoundaryKind::DeepSpaceManoeuvre {
                        leg: slot.leg_index,
                    },
                ));
            }
            epoch_s += days_to_seconds(duration);
        }
        let last = layout.number_of_legs();
        boundaries.push(spiral_point(
            boundaries.len(),
            epoch_s,
            BoundaryKind::Body(mission.bodies[last].clone()),
        ));
        Ok(PatchedConicSolution {
            total_delta_v_km_s: 0.0,
            boundaries,
        })
    }
}

fn spiral_point(index: usize, epoch_s: f64, kind: BoundaryKind) -> LegBoundary {
    let angle = index as f64;
    let radius = AU_KM * (1.0 + 0.1 * index as f64);
    LegBoundary {
        position_km: [radius * angle.cos(), radius * angle.sin(), 0.0],
        epoch_s,
        delta_v_km_s: 0.0,
        kind,
    }
}

/// Returns the analytic history unchanged, failing on the listed legs.
#[derive(Debug, Default)]
pub struct EchoPropagator {
    pub failing: Vec<usize>,
}

impl NumericalPropagator for EchoPropagator {
    fn propagate(
        &self,
        request: &LegRequest<'_>,
        arc: &AnalyticArc,
    ) -> Result<StateHistory, IntegrationError> {
        if self.failing.contains(&request.index) {
            return Err(IntegrationError::NonFiniteState {
                epoch_s: request.start_epoch_s,
            });
        }
        Ok(arc.history.clone())
    }
}
