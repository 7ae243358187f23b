//! Orbit utility helpers (Kepler propagation, patched-conic escape/capture and flyby estimates).

pub mod flyby;
pub mod kepler;

pub use flyby::{
    FlybyError, PoweredFlyby, gravity_assist_delta_v, powered_flyby_outgoing_velocity,
};
pub use kepler::{KeplerElements, KeplerError, elements_to_state, propagate as kepler_propagate};

/// Shape of a parking or capture orbit, fixed by its semi-major axis and eccentricity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitShape {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
}

impl OrbitShape {
    pub fn pericenter_radius_km(&self) -> f64 {
        self.semi_major_axis_km * (1.0 - self.eccentricity)
    }
}

/// Patched-conic escape delta-v, applied at pericenter of the parking orbit.
pub fn escape_delta_v(mu_km3_s2: f64, orbit: &OrbitShape, vinf_km_s: f64) -> f64 {
    pericenter_delta_v(mu_km3_s2, orbit, vinf_km_s)
}

/// Patched-conic capture delta-v into the target orbit, applied at its pericenter.
pub fn capture_delta_v(mu_km3_s2: f64, orbit: &OrbitShape, vinf_km_s: f64) -> f64 {
    pericenter_delta_v(mu_km3_s2, orbit, vinf_km_s)
}

fn pericenter_delta_v(mu_km3_s2: f64, orbit: &OrbitShape, vinf_km_s: f64) -> f64 {
    let rp = orbit.pericenter_radius_km();
    let orbit_speed = (mu_km3_s2 * (1.0 + orbit.eccentricity) / rp).sqrt();
    let hyperbolic_speed = (vinf_km_s * vinf_km_s + 2.0 * mu_km3_s2 / rp).sqrt();
    (hyperbolic_speed - orbit_speed).max(0.0)
}
