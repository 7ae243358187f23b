//! Two-body propagation in universal variables and classical element conversion.

use mga_core::vector::{Vector3, dot, norm};
use thiserror::Error;

const MAX_ITERATIONS: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum KeplerError {
    #[error("initial position must be non-zero")]
    ZeroRadius,
    #[error("gravitational parameter must be positive, got {0}")]
    InvalidGravitationalParameter(f64),
    #[error("universal-variable iteration did not converge for dt = {dt_s} s")]
    NoConvergence { dt_s: f64 },
    #[error("Kepler's equation did not converge for M = {0} rad")]
    KeplerEquation(f64),
    #[error("only elliptic elements are supported, got e = {0}")]
    NonEllipticElements(f64),
}

/// Propagate `(r0, v0)` by `dt_s` seconds (forward or backward) under two-body dynamics.
pub fn propagate(
    r0: &Vector3,
    v0: &Vector3,
    dt_s: f64,
    mu_km3_s2: f64,
) -> Result<(Vector3, Vector3), KeplerError> {
    if mu_km3_s2 <= 0.0 || !mu_km3_s2.is_finite() {
        return Err(KeplerError::InvalidGravitationalParameter(mu_km3_s2));
    }
    let r0_mag = norm(r0);
    if r0_mag == 0.0 {
        return Err(KeplerError::ZeroRadius);
    }
    if dt_s == 0.0 {
        return Ok((*r0, *v0));
    }

    let sqrt_mu = mu_km3_s2.sqrt();
    let rdotv = dot(r0, v0);
    let energy = dot(v0, v0) / 2.0 - mu_km3_s2 / r0_mag;
    // alpha = 1/a
    let alpha = -2.0 * energy / mu_km3_s2;

    let mut chi = initial_guess(r0_mag, rdotv, alpha, dt_s, mu_km3_s2);

    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let chi2 = chi * chi;
        let psi = alpha * chi2;
        let (c2, c3) = stumpff_c2c3(psi);

        let r = chi2 * c2 + rdotv / sqrt_mu * chi * (1.0 - psi * c3) + r0_mag * (1.0 - psi * c2);
        let t_of_chi =
            r0_mag * chi * (1.0 - psi * c3) + rdotv / sqrt_mu * chi2 * c2 + chi2 * chi * c3;
        let delta = (t_of_chi - sqrt_mu * dt_s) / r;
        chi -= delta;

        if !chi.is_finite() {
            break;
        }
        if delta.abs() <= 1e-12 * chi.abs().max(1.0) {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(KeplerError::NoConvergence { dt_s });
    }

    let chi2 = chi * chi;
    let psi = alpha * chi2;
    let (c2, c3) = stumpff_c2c3(psi);
    let r_mag = chi2 * c2 + rdotv / sqrt_mu * chi * (1.0 - psi * c3) + r0_mag * (1.0 - psi * c2);

    let f = 1.0 - chi2 / r0_mag * c2;
    let g = dt_s - chi2 * chi / sqrt_mu * c3;
    let g_dot = 1.0 - chi2 / r_mag * c2;
    let f_dot = sqrt_mu / (r_mag * r0_mag) * chi * (psi * c3 - 1.0);

    let r = [
        f * r0[0] + g * v0[0],
        f * r0[1] + g * v0[1],
        f * r0[2] + g * v0[2],
    ];
    let v = [
        f_dot * r0[0] + g_dot * v0[0],
        f_dot * r0[1] + g_dot * v0[1],
        f_dot * r0[2] + g_dot * v0[2],
    ];
    Ok((r, v))
}

fn initial_guess(r0_mag: f64, rdotv: f64, alpha: f64, dt_s: f64, mu: f64) -> f64 {
    let fallback = mu.sqrt() * dt_s / r0_mag;
    let guess = if alpha > 1e-12 {
        mu.sqrt() * dt_s * alpha
    } else if alpha < -1e-12 {
        let a = 1.0 / alpha;
        let sign = dt_s.signum();
        let numerator = -2.0 * mu * alpha * dt_s;
        let denominator = rdotv + sign * (-mu * a).sqrt() * (1.0 - r0_mag * alpha);
        sign * (-a).sqrt() * (numerator / denominator).ln()
    } else {
        fallback
    };
    if guess.is_finite() { guess } else { fallback }
}

/// Stumpff functions c2(psi) and c3(psi).
fn stumpff_c2c3(psi: f64) -> (f64, f64) {
    if psi > 1e-6 {
        let sqrt_psi = psi.sqrt();
        let c2 = (1.0 - sqrt_psi.cos()) / psi;
        let c3 = (sqrt_psi - sqrt_psi.sin()) / (psi * sqrt_psi);
        (c2, c3)
    } else if psi < -1e-6 {
        let sqrt_neg_psi = (-psi).sqrt();
        let c2 = (1.0 - sqrt_neg_psi.cosh()) / psi;
        let c3 = (sqrt_neg_psi.sinh() - sqrt_neg_psi) / ((-psi) * sqrt_neg_psi);
        (c2, c3)
    } else {
        let c2 = 1.0 / 2.0 - psi / 24.0 + psi * psi / 720.0;
        let c3 = 1.0 / 6.0 - psi / 120.0 + psi * psi / 5040.0;
        (c2, c3)
    }
}

/// Classical elliptic elements; angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerElements {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub raan: f64,
    pub argument_of_periapsis: f64,
    pub mean_anomaly: f64,
}

/// Convert elliptic elements into a Cartesian state relative to the attracting body.
pub fn elements_to_state(
    elements: &KeplerElements,
    mu_km3_s2: f64,
) -> Result<(Vector3, Vector3), KeplerError> {
    let e = elements.eccentricity;
    if !(0.0..1.0).contains(&e) {
        return Err(KeplerError::NonEllipticElements(e));
    }
    if mu_km3_s2 <= 0.0 || !mu_km3_s2.is_finite() {
        return Err(KeplerError::InvalidGravitationalParameter(mu_km3_s2));
    }
    let a = elements.semi_major_axis_km;
    let ecc_anomaly = eccentric_anomaly(elements.mean_anomaly, e)?;
    let (sin_e, cos_e) = ecc_anomaly.sin_cos();
    let root = (1.0 - e * e).sqrt();

    let x = a * (cos_e - e);
    let y = a * root * sin_e;
    let mean_motion = (mu_km3_s2 / (a * a * a)).sqrt();
    let e_dot = mean_motion / (1.0 - e * cos_e);
    let vx = -a * sin_e * e_dot;
    let vy = a * root * cos_e * e_dot;

    let (sin_w, cos_w) = elements.argument_of_periapsis.sin_cos();
    let (sin_o, cos_o) = elements.raan.sin_cos();
    let (sin_i, cos_i) = elements.inclination.sin_cos();

    // Perifocal -> inertial rotation columns for the in-plane axes.
    let p = [
        cos_w * cos_o - sin_w * sin_o * cos_i,
        cos_w * sin_o + sin_w * cos_o * cos_i,
        sin_w * sin_i,
    ];
    let q = [
        -sin_w * cos_o - cos_w * sin_o * cos_i,
        -sin_w * sin_o + cos_w * cos_o * cos_i,
        cos_w * sin_i,
    ];

    let r = [
        x * p[0] + y * q[0],
        x * p[1] + y * q[1],
        x * p[2] + y * q[2],
    ];
    let v = [
        vx * p[0] + vy * q[0],
        vx * p[1] + vy * q[1],
        vx * p[2] + vy * q[2],
    ];
    Ok((r, v))
}

/// Solve Kepler's equation M = E - e sin(E) by Newton-Raphson.
fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> Result<f64, KeplerError> {
    let m = mean_anomaly.rem_euclid(std::f64::consts::TAU);
    let mut ea = if e < 0.8 { m } else { std::f64::consts::PI };
    for _ in 0..MAX_ITERATIONS {
        let delta = (ea - e * ea.sin() - m) / (1.0 - e * ea.cos());
        ea -= delta;
        if delta.abs() < 1e-14 {
            return Ok(ea);
        }
    }
    Err(KeplerError::KeplerEquation(mean_anomaly))
}
