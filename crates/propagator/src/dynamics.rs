//! Point-mass gravity: the central body at the frame origin plus third-body
//! perturbations expressed relative to the accelerating central body.

use mga_core::state::{State6, position, velocity};
use mga_core::vector::{norm, scale, sub};
use mga_ephem::{Body, BodyMap, EphemerisError, normalize_body_name};

use crate::IntegrationError;
use crate::integrator::OdeSystem;

/// Which bodies act on the spacecraft during a full propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct AccelerationModel {
    pub central_body: String,
    pub third_bodies: Vec<String>,
    /// Drop a leg's own departure and arrival bodies from the perturbers; the
    /// arcs start and end at their centres where point-mass gravity is singular.
    pub exclude_leg_bodies: bool,
}

impl AccelerationModel {
    pub fn central_only(central_body: impl Into<String>) -> Self {
        Self {
            central_body: central_body.into(),
            third_bodies: Vec::new(),
            exclude_leg_bodies: true,
        }
    }

    /// Perturbing bodies active for a leg bounded by `leg_bodies`.
    pub fn perturbers_for_leg<'m>(&'m self, leg_bodies: &[&str]) -> Vec<&'m str> {
        let excluded: Vec<String> = leg_bodies.iter().map(|name| normalize_body_name(name)).collect();
        let central = normalize_body_name(&self.central_body);
        self.third_bodies
            .iter()
            .map(String::as_str)
            .filter(|name| {
                let key = normalize_body_name(name);
                key != central && !(self.exclude_leg_bodies && excluded.contains(&key))
            })
            .collect()
    }
}

/// Equations of motion for a spacecraft under point-mass gravity.
#[derive(Debug)]
pub struct PointMassDynamics<'a> {
    central_mu_km3_s2: f64,
    perturbers: Vec<&'a Body>,
}

impl<'a> PointMassDynamics<'a> {
    pub fn new(
        bodies: &'a BodyMap,
        central_body: &str,
        perturbers: &[&str],
    ) -> Result<Self, EphemerisError> {
        let central = bodies.get(central_body)?;
        let perturbers = perturbers
            .iter()
            .map(|name| bodies.get(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            central_mu_km3_s2: central.mu_km3_s2,
            perturbers,
        })
    }

    /// Build the dynamics for one leg of `model`.
    pub fn for_leg(
        bodies: &'a BodyMap,
        model: &AccelerationModel,
        leg_bodies: &[&str],
    ) -> Result<Self, EphemerisError> {
        Self::new(
            bodies,
            &model.central_body,
            &model.perturbers_for_leg(leg_bodies),
        )
    }

    pub fn perturber_names(&self) -> impl Iterator<Item = &str> {
        self.perturbers.iter().map(|body| body.name.as_str())
    }
}

impl OdeSystem for PointMassDynamics<'_> {
    fn derivative(&self, epoch_s: f64, state: &State6) -> Result<State6, IntegrationError> {
        let r = position(state);
        let v = velocity(state);
        let r_mag = norm(&r);
        let mut acceleration = scale(&r, -self.central_mu_km3_s2 / (r_mag * r_mag * r_mag));

        for body in &self.perturbers {
            let rb = body.state_at(epoch_s)?.position_km;
            let relative = sub(&rb, &r);
            let d = norm(&relative);
            let rb_mag = norm(&rb);
            for i in 0..3 {
                acceleration[i] +=
                    body.mu_km3_s2 * (relative[i] / (d * d * d) - rb[i] / (rb_mag * rb_mag * rb_mag));
            }
        }

        Ok([
            v[0],
            v[1],
            v[2],
            acceleration[0],
            acceleration[1],
            acceleration[2],
        ])
    }
}
