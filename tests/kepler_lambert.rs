use mga_fidelity::base::constants::{AU_KM, MU_SUN};
use mga_fidelity::base::time::days_to_seconds;
use mga_fidelity::base::vector::{cross, dot, norm, sub};
use mga_fidelity::impulsive::{LambertSolverError, lambert_solve, solve_prograde};
use mga_fidelity::orbits::{
    KeplerElements, OrbitShape, PoweredFlyby, capture_delta_v, elements_to_state, escape_delta_v,
    gravity_assist_delta_v, kepler_propagate, powered_flyby_outgoing_velocity,
};

const MU_EARTH: f64 = 398_600.435_436;
const MU_VENUS: f64 = 324_858.592;

#[test]
fn lambert_quarter_orbit_matches_expected_velocity() {
    let r1 = [AU_KM, 0.0, 0.0];
    let r2 = [0.0, AU_KM, 0.0];
    let tof = (std::f64::consts::PI / 2.0) * (AU_KM.powi(3) / MU_SUN).sqrt();

    let (v1, v2) = lambert_solve(r1, r2, tof, MU_SUN, true).expect("lambert solve");

    let expected_speed = (MU_SUN / AU_KM).sqrt();
    assert!(
        (dot(&v1, &[0.0, 1.0, 0.0]) / norm(&v1)).abs() > 0.99,
        "expected near tangential velocity at departure: {v1:?}"
    );
    assert!(
        (dot(&v2, &[-1.0, 0.0, 0.0]) / norm(&v2)).abs() > 0.99,
        "expected near tangential velocity at arrival: {v2:?}"
    );
    assert!((norm(&v1) - expected_speed).abs() < 0.5);
    assert!((norm(&v2) - expected_speed).abs() < 0.5);
}

#[test]
fn prograde_branch_goes_the_long_way_when_needed() {
    let r1 = [AU_KM, 0.0, 0.0];
    let angle = 210_f64.to_radians();
    let r2 = [1.2 * AU_KM * angle.cos(), 1.2 * AU_KM * angle.sin(), 0.0];

    let (v1, _) = solve_prograde(r1, r2, days_to_seconds(220.0), MU_SUN).expect("lambert");
    assert!(cross(&r1, &v1)[2] > 0.0, "transfer must be prograde: {v1:?}");
}

#[test]
fn lambert_rejects_non_positive_time_of_flight() {
    let err = lambert_solve([AU_KM, 0.0, 0.0], [0.0, AU_KM, 0.0], 0.0, MU_SUN, true)
        .expect_err("zero time of flight");
    assert!(matches!(err, LambertSolverError::InvalidTimeOfFlight(_)));
}

#[test]
fn kepler_arc_from_lambert_reaches_the_target() {
    let r1 = [1.0e8, 1.1e8, 2.0e5];
    let r2 = [-1.9e8, 0.6e8, -3.0e6];
    let tof = days_to_seconds(200.0);

    let (v1, v2) = solve_prograde(r1, r2, tof, MU_SUN).expect("lambert");
    let (r, v) = kepler_propagate(&r1, &v1, tof, MU_SUN).expect("kepler");

    assert!(norm(&sub(&r, &r2)) < 1e-6 * norm(&r2));
    assert!(norm(&sub(&v, &v2)) < 1e-4);
}

#[test]
fn kepler_returns_to_start_after_one_period() {
    let elements = KeplerElements {
        semi_major_axis_km: 1.3 * AU_KM,
        eccentricity: 0.2,
        inclination: 0.1,
        raan: 0.4,
        argument_of_periapsis: 1.1,
        mean_anomaly: 2.0,
    };
    let (r0, v0) = elements_to_state(&elements, MU_SUN).expect("elements");
    let a = elements.semi_major_axis_km;
    let period = std::f64::consts::TAU * (a * a * a / MU_SUN).sqrt();

    let (r, v) = kepler_propagate(&r0, &v0, period, MU_SUN).expect("forward");
    assert!(norm(&sub(&r, &r0)) < 1.0);
    assert!(norm(&sub(&v, &v0)) < 1e-6);

    let (half_r, half_v) = kepler_propagate(&r0, &v0, period / 2.0, MU_SUN).expect("half");
    let (back_r, back_v) = kepler_propagate(&half_r, &half_v, -period / 2.0, MU_SUN).expect("back");
    assert!(norm(&sub(&back_r, &r0)) < 1.0);
    assert!(norm(&sub(&back_v, &v0)) < 1e-6);
}

#[test]
fn kepler_conserves_energy_on_hyperbolic_arcs() {
    let r0 = [7_000.0, 0.0, 0.0];
    let v0 = [0.0, 12.0, 0.5];
    let energy = |r: &[f64; 3], v: &[f64; 3]| dot(v, v) / 2.0 - MU_EARTH / norm(r);

    let (r, v) = kepler_propagate(&r0, &v0, 86_400.0, MU_EARTH).expect("kepler");
    assert!(energy(&r, &v) > 0.0);
    assert!((energy(&r, &v) - energy(&r0, &v0)).abs() < 1e-6);
}

#[test]
fn unpowered_flyby_keeps_excess_speed_and_needs_no_impulse() {
    let body_velocity = [0.0, 35.0, 0.0];
    let incoming = [4.0, 32.0, 0.5];
    let flyby = PoweredFlyby {
        rotation_angle_rad: 0.7,
        pericenter_radius_km: 9_000.0,
        pericenter_delta_v_km_s: 0.0,
    };

    let outgoing = powered_flyby_outgoing_velocity(&body_velocity, &incoming, MU_VENUS, &flyby)
        .expect("flyby");
    let vinf_in = sub(&incoming, &body_velocity);
    let vinf_out = sub(&outgoing, &body_velocity);
    assert!((norm(&vinf_in) - norm(&vinf_out)).abs() < 1e-9);

    let v2 = dot(&vinf_in, &vinf_in);
    let expected_bending = 2.0 * (1.0 / (1.0 + 9_000.0 * v2 / MU_VENUS)).asin();
    let bending = (dot(&vinf_in, &vinf_out) / (norm(&vinf_in) * norm(&vinf_out))).acos();
    assert!((bending - expected_bending).abs() < 1e-9);

    let dv = gravity_assist_delta_v(MU_VENUS, &body_velocity, &incoming, &outgoing, 6_351.8)
        .expect("gravity assist");
    assert!(dv.abs() < 1e-6, "unexpected swingby delta-v {dv}");
}

#[test]
fn powered_flyby_burn_changes_excess_speed() {
    let body_velocity = [0.0, 35.0, 0.0];
    let incoming = [4.0, 32.0, 0.5];
    let flyby = PoweredFlyby {
        rotation_angle_rad: 0.0,
        pericenter_radius_km: 9_000.0,
        pericenter_delta_v_km_s: 0.5,
    };
    let outgoing = powered_flyby_outgoing_velocity(&body_velocity, &incoming, MU_VENUS, &flyby)
        .expect("flyby");
    assert!(norm(&sub(&outgoing, &body_velocity)) > norm(&sub(&incoming, &body_velocity)));

    let dv = gravity_assist_delta_v(MU_VENUS, &body_velocity, &incoming, &outgoing, 6_351.8)
        .expect("gravity assist");
    assert!((dv - 0.5).abs() < 1e-6, "swingby delta-v {dv}");
}

#[test]
fn escape_and_capture_delta_v_from_parking_orbits() {
    let leo = OrbitShape {
        semi_major_axis_km: 6_678.0,
        eccentricity: 0.0,
    };
    let vinf = 3.0;
    let expected = (vinf * vinf + 2.0 * MU_EARTH / 6_678.0).sqrt() - (MU_EARTH / 6_678.0).sqrt();
    let escape = escape_delta_v(MU_EARTH, &leo, vinf);
    assert!((escape - expected).abs() < 1e-12);
    assert!((escape - 3.6045).abs() < 1e-3);

    let elliptic = OrbitShape {
        semi_major_axis_km: 30_000.0,
        eccentricity: 0.7,
    };
    assert!(capture_delta_v(MU_EARTH, &elliptic, vinf) < capture_delta_v(MU_EARTH, &leo, vinf));
    assert_eq!(
        capture_delta_v(MU_EARTH, &elliptic, vinf),
        escape_delta_v(MU_EARTH, &elliptic, vinf)
    );
}
