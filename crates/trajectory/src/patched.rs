//! Patched-conic MGA-1DSM evaluator (velocity formulation).
//!
//! Plain legs are Lambert arcs between consecutive bodies. A DSM leg leaves its
//! flyby body on the powered-flyby outgoing velocity, coasts on a Kepler arc for
//! the pre-manoeuvre fraction of the leg and then follows a Lambert arc to the next
//! body; the manoeuvre removes the velocity mismatch at the junction.

use std::fmt;

use log::debug;
use mga_core::time::days_to_seconds;
use mga_core::vector::{Vector3, norm, sub};
use mga_ephem::{Body, BodyMap, EphemerisError};
use mga_impulsive::{LambertSolverError, solve_prograde};
use mga_orbits::{
    FlybyError, KeplerError, PoweredFlyby, capture_delta_v, escape_delta_v,
    gravity_assist_delta_v, kepler_propagate, powered_flyby_outgoing_velocity,
};
use thiserror::Error;

use crate::layout::{LegType, TrajectoryLayout, split_leg_duration};
use crate::mission::MissionDescription;

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
    #[error("leg {leg}: duration must be positive and finite, got {days} days")]
    InvalidTimeOfFlight { leg: usize, days: f64 },
    #[error("leg {leg}: DSM fraction {fraction} lies outside [0, 1]")]
    InvalidDsmFraction { leg: usize, fraction: f64 },
    #[error("leg {leg}: no incoming velocity to swing by with")]
    MissingIncomingVelocity { leg: usize },
    #[error("leg {leg}: {source}")]
    Lambert {
        leg: usize,
        #[source]
        source: LambertSolverError,
    },
    #[error("leg {leg}: DSM coast failed: {source}")]
    Kepler {
        leg: usize,
        #[source]
        source: KeplerError,
    },
    #[error("leg {leg}: flyby failed: {source}")]
    Flyby {
        leg: usize,
        #[source]
        source: FlybyError,
    },
}

/// What a boundary point marks.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryKind {
    Body(String),
    DeepSpaceManoeuvre { leg: usize },
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(name) => f.write_str(name),
            Self::DeepSpaceManoeuvre { leg } => write!(f, "DSM{leg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegBoundary {
    pub position_km: Vector3,
    /// Seconds past J2000.
    pub epoch_s: f64,
    pub delta_v_km_s: f64,
    pub kind: BoundaryKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatchedConicSolution {
    pub total_delta_v_km_s: f64,
    /// `legs_including_dsm + 1` points in temporal order.
    pub boundaries: Vec<LegBoundary>,
}

/// Source of the patched-conic boundary points for a mission.
pub trait TrajectoryEvaluator: Send + Sync {
    fn evaluate(
        &self,
        mission: &MissionDescription,
        layout: &TrajectoryLayout,
    ) -> Result<PatchedConicSolution, TrajectoryError>;
}

#[derive(Debug, Clone, Copy)]
pub struct PatchedConicEvaluator<'a> {
    bodies: &'a BodyMap,
    central_mu_km3_s2: f64,
}

impl<'a> PatchedConicEvaluator<'a> {
    pub fn new(bodies: &'a BodyMap, central_body: &str) -> Result<Self, EphemerisError> {
        let central_mu_km3_s2 = bodies.get(central_body)?.mu_km3_s2;
        Ok(Self {
            bodies,
            central_mu_km3_s2,
        })
    }

    fn lambert(
        &self,
        leg: usize,
        r1: Vector3,
        r2: Vector3,
        tof_s: f64,
    ) -> Result<(Vector3, Vector3), TrajectoryError> {
        solve_prograde(r1, r2, tof_s, self.central_mu_km3_s2)
            .map_err(|source| TrajectoryError::Lambert { leg, source })
    }
}

impl TrajectoryEvaluator for PatchedConicEvaluator<'_> {
    fn evaluate(
        &self,
        mission: &MissionDescription,
        layout: &TrajectoryLayout,
    ) -> Result<PatchedConicSolution, TrajectoryError> {
        let p = &mission.parameters;
        let mut epoch_s = days_to_seconds(p[layout.departure_epoch_slot()]);
        let mut boundaries = Vec::with_capacity(layout.boundary_count());
        let mut incoming: Option<Vector3> = None;

        for slot in layout.slots() {
            let leg = slot.leg_index;
            let departure = self.bodies.get(&mission.bodies[leg])?;
            let arrival = self.bodies.get(&mission.bodies[leg + 1])?;

            let duration_days = p[layout.duration_slot(leg)];
            let duration_s = days_to_seconds(duration_days);
            if !(duration_s.is_finite() && duration_s > 0.0) {
                return Err(TrajectoryError::InvalidTimeOfFlight {
                    leg,
                    days: duration_days,
                });
            }
            let departure_state = departure.state_at(epoch_s)?;
            let arrival_epoch_s = epoch_s + duration_s;
            let arrival_state = arrival.state_at(arrival_epoch_s)?;
            let body_label = BoundaryKind::Body(mission.bodies[leg].clone());

            match slot.dsm_index {
                None => {
                    let (v1, v2) = self.lambert(
                        leg,
                        departure_state.position_km,
                        arrival_state.position_km,
                        duration_s,
                    )?;
                    let delta_v_km_s = if slot.leg_type == LegType::Departure {
                        let vinf = norm(&sub(&v1, &departure_state.velocity_km_s));
                        match &mission.departure_orbit {
                            Some(orbit) => escape_delta_v(departure.mu_km3_s2, orbit, vinf),
                            None => vinf,
                        }
                    } else {
                        let incoming = incoming.ok_or(TrajectoryError::MissingIncomingVelocity { leg })?;
                        gravity_assist_delta_v(
                            departure.mu_km3_s2,
                            &departure_state.velocity_km_s,
                            &incoming,
                            &v1,
                            minimum_pericenter(mission, leg, departure),
                        )
                        .map_err(|source| TrajectoryError::Flyby { leg, source })?
                    };
                    boundaries.push(LegBoundary {
                        position_km: departure_state.position_km,
                        epoch_s,
                        delta_v_km_s,
                        kind: body_label,
                    });
                    incoming = Some(v2);
                }
                Some(dsm) => {
                    let block = &p[layout.dsm_block(dsm)];
                    let fraction = block[0];
                    if !(0.0..=1.0).contains(&fraction) {
                        return Err(TrajectoryError::InvalidDsmFraction { leg, fraction });
                    }
                    let flyby = PoweredFlyby {
                        rotation_angle_rad: block[1],
                        pericenter_radius_km: block[2],
                        pericenter_delta_v_km_s: block[3],
                    };
                    let incoming_velocity =
                        incoming.ok_or(TrajectoryError::MissingIncomingVelocity { leg })?;
                    let outgoing = powered_flyby_outgoing_velocity(
                        &departure_state.velocity_km_s,
                        &incoming_velocity,
                        departure.mu_km3_s2,
                        &flyby,
                    )
                    .map_err(|source| TrajectoryError::Flyby { leg, source })?;

                    let (pre_days, post_days) = split_leg_duration(fraction, duration_days);
                    let pre_s = days_to_seconds(pre_days);
                    let (dsm_position, dsm_velocity) = kepler_propagate(
                        &departure_state.position_km,
                        &outgoing,
                        pre_s,
                        self.central_mu_km3_s2,
                    )
                    .map_err(|source| TrajectoryError::Kepler { leg, source })?;
                    let (v1, v2) = self.lambert(
                        leg,
                        dsm_position,
                        arrival_state.position_km,
                        days_to_seconds(post_days),
                    )?;

                    boundaries.push(LegBoundary {
                        position_km: departure_state.position_km,
                        epoch_s,
                        delta_v_km_s: flyby.pericenter_delta_v_km_s.abs(),
                        kind: body_label,
                    });
                    boundaries.push(LegBoundary {
                        position_km: dsm_position,
                        epoch_s: epoch_s + pre_s,
                        delta_v_km_s: norm(&sub(&v1, &dsm_velocity)),
                        kind: BoundaryKind::DeepSpaceManoeuvre { leg },
                    });
                    incoming = Some(v2);
                }
            }
            epoch_s = arrival_epoch_s;
        }

        let last = layout.number_of_legs();
        let final_body = self.bodies.get(&mission.bodies[last])?;
        let final_state = final_body.state_at(epoch_s)?;
        let incoming = incoming.ok_or(TrajectoryError::MissingIncomingVelocity { leg: last })?;
        let vinf = norm(&sub(&incoming, &final_state.velocity_km_s));
        let capture = match &mission.capture_orbit {
            Some(orbit) => capture_delta_v(final_body.mu_km3_s2, orbit, vinf),
            None => vinf,
        };
        boundaries.push(LegBoundary {
            position_km: final_state.position_km,
            epoch_s,
            delta_v_km_s: capture,
            kind: BoundaryKind::Body(mission.bodies[last].clone()),
        });

        let total_delta_v_km_s = boundaries.iter().map(|b| b.delta_v_km_s).sum();
        debug!(
            "patched-conic trajectory: {} boundaries, total delta-v {total_delta_v_km_s:.4} km/s",
            boundaries.len()
        );
        Ok(PatchedConicSolution {
            total_delta_v_km_s,
            boundaries,
        })
    }
}

fn minimum_pericenter(mission: &MissionDescription, body_index: usize, body: &Body) -> f64 {
    mission
        .minimum_pericenter_radii_km
        .get(body_index)
        .copied()
        .unwrap_or(body.radius_km)
}
