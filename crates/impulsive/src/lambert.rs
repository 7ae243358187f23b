use lambert_bate::get_velocities;
use thiserror::Error;

const TOLERANCE: f64 = 1e-8;
const MAX_ITERATIONS: usize = 500;

#[derive(Debug, Error)]
pub enum LambertSolverError {
    #[error("time of flight must be positive and finite, got {0} s")]
    InvalidTimeOfFlight(f64),
    #[error("lambert solver failed: {0}")]
    Failure(String),
}

/// Solve Lambert's problem for a single revolution along the requested branch.
pub fn solve(
    r1_km: [f64; 3],
    r2_km: [f64; 3],
    time_of_flight_s: f64,
    mu_km3_s2: f64,
    short: bool,
) -> Result<([f64; 3], [f64; 3]), LambertSolverError> {
    if !time_of_flight_s.is_finite() || time_of_flight_s <= 0.0 {
        return Err(LambertSolverError::InvalidTimeOfFlight(time_of_flight_s));
    }
    let (v1, v2) = get_velocities(
        r1_km,
        r2_km,
        time_of_flight_s,
        mu_km3_s2,
        short,
        TOLERANCE,
        MAX_ITERATIONS,
    )
    .map_err(|e| LambertSolverError::Failure(format!("{e:?}")))?;

    if v1.iter().chain(v2.iter()).any(|v| !v.is_finite()) {
        return Err(LambertSolverError::Failure(
            "non-finite terminal velocity".to_string(),
        ));
    }
    Ok((v1, v2))
}

/// Solve Lambert's problem along the prograde (counter-clockwise about +z) branch.
///
/// The short-way branch is prograde when `(r1 x r2).z` is non-negative; otherwise
/// the long way round keeps the motion prograde.
pub fn solve_prograde(
    r1_km: [f64; 3],
    r2_km: [f64; 3],
    time_of_flight_s: f64,
    mu_km3_s2: f64,
) -> Result<([f64; 3], [f64; 3]), LambertSolverError> {
    let h_z = r1_km[0] * r2_km[1] - r1_km[1] * r2_km[0];
    solve(r1_km, r2_km, time_of_flight_s, mu_km3_s2, h_z >= 0.0)
}
