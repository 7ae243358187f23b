//! Patched-conic gravity assists: powered flyby propagation and swingby delta-v.

use mga_core::vector::{Vector3, add, cross, dot, norm, scale, sub, unit};
use thiserror::Error;

const MAX_BRACKET_DOUBLINGS: usize = 200;
const MAX_BISECTIONS: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum FlybyError {
    #[error("pericenter radius must be positive and finite, got {0} km")]
    InvalidPericenter(f64),
    #[error("incoming hyperbolic excess velocity is zero")]
    ZeroExcessVelocity,
    #[error("incoming excess velocity is parallel to the body velocity; b-plane undefined")]
    DegenerateBPlane,
    #[error("pericenter burn of {delta_v_km_s} km/s leaves the spacecraft bound to the body")]
    CapturedByBody { delta_v_km_s: f64 },
}

/// Flyby geometry for a swingby defined by its b-plane rotation, pericenter and burn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoweredFlyby {
    pub rotation_angle_rad: f64,
    pub pericenter_radius_km: f64,
    pub pericenter_delta_v_km_s: f64,
}

/// Heliocentric outgoing velocity after a powered flyby.
///
/// The excess velocity is rotated in the plane spanned by the incoming excess
/// velocity and the b-plane direction selected by the rotation angle, with the
/// burn applied tangentially at pericenter.
pub fn powered_flyby_outgoing_velocity(
    body_velocity: &Vector3,
    incoming_velocity: &Vector3,
    mu_km3_s2: f64,
    flyby: &PoweredFlyby,
) -> Result<Vector3, FlybyError> {
    let rp = flyby.pericenter_radius_km;
    if !(rp.is_finite() && rp > 0.0) {
        return Err(FlybyError::InvalidPericenter(rp));
    }
    let vinf_in = sub(incoming_velocity, body_velocity);
    let vin = norm(&vinf_in);
    if vin == 0.0 {
        return Err(FlybyError::ZeroExcessVelocity);
    }

    let vp_in = (vin * vin + 2.0 * mu_km3_s2 / rp).sqrt();
    let vp_out = vp_in + flyby.pericenter_delta_v_km_s;
    let vout_squared = vp_out * vp_out - 2.0 * mu_km3_s2 / rp;
    if vout_squared <= 0.0 {
        return Err(FlybyError::CapturedByBody {
            delta_v_km_s: flyby.pericenter_delta_v_km_s,
        });
    }
    let vout = vout_squared.sqrt();

    let bending = half_bending(mu_km3_s2, rp, vin) + half_bending(mu_km3_s2, rp, vout);

    let ix = unit(&vinf_in);
    let iy_raw = cross(&ix, body_velocity);
    if norm(&iy_raw) == 0.0 {
        return Err(FlybyError::DegenerateBPlane);
    }
    let iy = unit(&iy_raw);
    let iz = cross(&ix, &iy);

    let (sin_b, cos_b) = bending.sin_cos();
    let (sin_r, cos_r) = flyby.rotation_angle_rad.sin_cos();
    let direction = add(
        &scale(&ix, cos_b),
        &add(&scale(&iy, cos_r * sin_b), &scale(&iz, sin_r * sin_b)),
    );
    Ok(add(body_velocity, &scale(&direction, vout)))
}

/// Delta-v needed at a swingby to turn the incoming into the outgoing excess velocity.
///
/// The pericenter radius that produces the required bending is searched above
/// `minimum_pericenter_km`; when the bending needs a lower pericenter, the
/// missing bending is paid for with an extra impulse.
pub fn gravity_assist_delta_v(
    mu_km3_s2: f64,
    body_velocity: &Vector3,
    incoming_velocity: &Vector3,
    outgoing_velocity: &Vector3,
    minimum_pericenter_km: f64,
) -> Result<f64, FlybyError> {
    if !(minimum_pericenter_km.is_finite() && minimum_pericenter_km > 0.0) {
        return Err(FlybyError::InvalidPericenter(minimum_pericenter_km));
    }
    let vinf_in = sub(incoming_velocity, body_velocity);
    let vinf_out = sub(outgoing_velocity, body_velocity);
    let vin = norm(&vinf_in);
    let vout = norm(&vinf_out);
    if vin == 0.0 || vout == 0.0 {
        return Ok((vout - vin).abs());
    }

    let cos_bending = (dot(&vinf_in, &vinf_out) / (vin * vout)).clamp(-1.0, 1.0);
    let bending = cos_bending.acos();
    if bending <= 1e-12 {
        return Ok((vout - vin).abs());
    }

    let bending_at = |rp: f64| half_bending(mu_km3_s2, rp, vin) + half_bending(mu_km3_s2, rp, vout);

    let max_bending = bending_at(minimum_pericenter_km);
    if bending > max_bending {
        let bending_cost = 2.0 * vin.min(vout) * ((bending - max_bending) / 2.0).sin();
        let speed_cost = pericenter_speed_change(mu_km3_s2, minimum_pericenter_km, vin, vout);
        return Ok(bending_cost + speed_cost);
    }

    let mut lo = minimum_pericenter_km;
    let mut hi = 2.0 * minimum_pericenter_km;
    let mut doublings = 0;
    while bending_at(hi) >= bending {
        lo = hi;
        hi *= 2.0;
        doublings += 1;
        if doublings > MAX_BRACKET_DOUBLINGS {
            return Ok((vout - vin).abs());
        }
    }
    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if bending_at(mid) >= bending {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-12 * hi {
            break;
        }
    }
    let rp = 0.5 * (lo + hi);
    Ok(pericenter_speed_change(mu_km3_s2, rp, vin, vout))
}

fn half_bending(mu_km3_s2: f64, rp: f64, vinf: f64) -> f64 {
    let eccentricity = 1.0 + rp * vinf * vinf / mu_km3_s2;
    (1.0 / eccentricity).asin()
}

fn pericenter_speed_change(mu_km3_s2: f64, rp: f64, vin: f64, vout: f64) -> f64 {
    let escape = 2.0 * mu_km3_s2 / rp;
    ((vout * vout + escape).sqrt() - (vin * vin + escape).sqrt()).abs()
}
