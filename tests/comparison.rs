mod common;

use common::{EchoPropagator, SpiralEvaluator, earth_venus_earth_mars_dsm, earth_venus_mars, names, solar_system};
use mga_fidelity::base::constants::MU_SUN;
use mga_fidelity::base::time::days_to_seconds;
use mga_fidelity::compare::{
    ComparisonOptions, EpochOrigin, FullPropagator, GeometryError, LambertTargeter, LegError,
    LegRequest, MgaComparison, PropagationAnchor, TwoBodySolver, endpoint_residual,
    propagate_leg,
};
use mga_fidelity::propagator::{AccelerationModel, IntegratorSettings};
use mga_fidelity::trajectory::{
    BoundaryKind, LegType::{Departure, Swingby}, MissionDescription, PatchedConicEvaluator,
    TrajectoryEvaluator,
};

fn tight_rkf78() -> IntegratorSettings {
    IntegratorSettings::RungeKuttaFehlberg78 {
        initial_step_s: 3_600.0,
        min_step_s: 1e-3,
        max_step_s: 2.0 * 86_400.0,
        relative_tolerance: 1e-13,
        absolute_tolerance: 1e-10,
        max_steps: 200_000,
    }
}

#[test]
fn sun_only_propagation_reproduces_the_conic() {
    let bodies = solar_system();
    let mission = earth_venus_mars();
    let evaluator = PatchedConicEvaluator::new(&bodies, "Sun").expect("evaluator");
    let solver = LambertTargeter::new(MU_SUN, 50);
    let propagator = FullPropagator::new(
        &bodies,
        AccelerationModel::central_only("Sun"),
        tight_rkf78(),
        PropagationAnchor::Departure,
    )
    .expect("propagator");

    for epoch_origin in [EpochOrigin::default(), EpochOrigin::LegDeparture] {
        let report = MgaComparison::new(&evaluator, &solver, &propagator)
            .with_options(ComparisonOptions {
                epoch_origin,
                parallel: true,
            })
            .run(&mission)
            .expect("comparison");

        assert!(report.is_complete(), "failures: {:?}", report.failures());
        let residuals = report.residuals();
        assert_eq!(residuals.len(), 1);
        let residual = residuals[&0];
        assert!(residual.departure.iter().all(|v| *v == 0.0));
        assert!(
            residual.arrival_position_error_km() < 1.0,
            "arrival position residual {} km",
            residual.arrival_position_error_km()
        );
        assert!(residual.arrival_velocity_error_km_s() < 1e-6);
    }
}

#[test]
fn midpoint_anchor_matches_the_conic_at_both_ends() {
    let bodies = solar_system();
    let mission = earth_venus_mars();
    let evaluator = PatchedConicEvaluator::new(&bodies, "Sun").expect("evaluator");
    let solver = LambertTargeter::new(MU_SUN, 20);
    let propagator = FullPropagator::new(
        &bodies,
        AccelerationModel::central_only("Sun"),
        tight_rkf78(),
        PropagationAnchor::Midpoint,
    )
    .expect("propagator");

    let report = MgaComparison::new(&evaluator, &solver, &propagator)
        .run(&mission)
        .expect("comparison");
    let residual = report.residuals()[&0];
    assert!(residual.departure_position_error_km() < 1.0);
    assert!(residual.arrival_position_error_km() < 1.0);
    assert!(residual.departure_velocity_error_km_s() < 1e-6);
}

#[test]
fn third_bodies_produce_a_finite_nonzero_residual() {
    let bodies = solar_system();
    let mission = earth_venus_mars();
    let evaluator = PatchedConicEvaluator::new(&bodies, "Sun").expect("evaluator");
    let solver = LambertTargeter::new(MU_SUN, 20);
    let acceleration = AccelerationModel {
        central_body: "Sun".into(),
        third_bodies: names(&["Venus", "Earth", "Mars", "Jupiter"]),
        exclude_leg_bodies: true,
    };
    let propagator = FullPropagator::new(
        &bodies,
        acceleration,
        IntegratorSettings::default(),
        PropagationAnchor::Departure,
    )
    .expect("propagator");

    let report = MgaComparison::new(&evaluator, &solver, &propagator)
        .with_options(ComparisonOptions {
            epoch_origin: EpochOrigin::LegDeparture,
            parallel: false,
        })
        .run(&mission)
        .expect("comparison");

    let residual = report.residuals()[&0];
    let error = residual.arrival_position_error_km();
    assert!(error.is_finite());
    assert!(error > 0.0);
    assert!(residual.departure.iter().all(|v| *v == 0.0));
}

#[test]
fn dsm_mission_compares_every_sub_leg() {
    let bodies = solar_system();
    let mission = earth_venus_earth_mars_dsm(0.3);
    let evaluator = PatchedConicEvaluator::new(&bodies, "Sun").expect("evaluator");
    let solver = LambertTargeter::new(MU_SUN, 20);
    let propagator = FullPropagator::new(
        &bodies,
        AccelerationModel::central_only("Sun"),
        tight_rkf78(),
        PropagationAnchor::Departure,
    )
    .expect("propagator");

    let report = MgaComparison::new(&evaluator, &solver, &propagator)
        .run(&mission)
        .expect("comparison");

    assert_eq!(report.boundaries.len(), 5);
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.times_of_flight_days.len(), 3);
    assert_eq!(report.times_of_flight_days[0], 130.0);
    assert!((report.times_of_flight_days[1] - 75.0).abs() < 1e-12);
    assert!((report.times_of_flight_days[2] - 175.0).abs() < 1e-12);

    assert_eq!(report.outcomes[0].from, BoundaryKind::Body("Earth".into()));
    assert_eq!(report.outcomes[1].to, BoundaryKind::DeepSpaceManoeuvre { leg: 1 });
    assert_eq!(report.outcomes[2].from, BoundaryKind::DeepSpaceManoeuvre { leg: 1 });
    assert_eq!(report.outcomes[2].to, BoundaryKind::Body("Earth".into()));

    assert!(report.is_complete(), "failures: {:?}", report.failures());
    for residual in report.residuals().values() {
        assert!(residual.arrival_position_error_km() < 1.0);
    }
}

#[test]
fn evaluator_boundaries_follow_the_parameter_vector() {
    let bodies = solar_system();
    let mission = earth_venus_earth_mars_dsm(0.3);
    let layout = mission.layout().expect("layout");
    let evaluator = PatchedConicEvaluator::new(&bodies, "Sun").expect("evaluator");

    let solution = evaluator.evaluate(&mission, &layout).expect("evaluate");
    assert_eq!(solution.boundaries.len(), layout.boundary_count());

    let t0 = days_to_seconds(10_280.0);
    let epochs: Vec<f64> = solution.boundaries.iter().map(|b| b.epoch_s).collect();
    assert_eq!(epochs[0], t0);
    assert_eq!(epochs[1], t0 + days_to_seconds(130.0));
    assert!((epochs[2] - (epochs[1] + days_to_seconds(75.0))).abs() < 1e-3);
    assert!((epochs[3] - (epochs[1] + days_to_seconds(250.0))).abs() < 1e-3);
    assert!((epochs[4] - (epochs[3] + days_to_seconds(200.0))).abs() < 1e-3);

    let total: f64 = solution.boundaries.iter().map(|b| b.delta_v_km_s).sum();
    assert!((solution.total_delta_v_km_s - total).abs() < 1e-12);
    assert!(solution.boundaries.iter().all(|b| b.delta_v_km_s >= 0.0));
    // Unpowered flyby at Venus.
    assert_eq!(solution.boundaries[1].delta_v_km_s, 0.0);
}

#[test]
fn repeated_runs_are_bit_identical() {
    let bodies = solar_system();
    let mission = earth_venus_earth_mars_dsm(0.3);
    let evaluator = PatchedConicEvaluator::new(&bodies, "Sun").expect("evaluator");
    let solver = LambertTargeter::new(MU_SUN, 20);
    let acceleration = AccelerationModel {
        central_body: "Sun".into(),
        third_bodies: names(&["Venus", "Earth", "Mars", "Jupiter"]),
        exclude_leg_bodies: true,
    };
    let propagator = FullPropagator::new(
        &bodies,
        acceleration,
        IntegratorSettings::default(),
        PropagationAnchor::Departure,
    )
    .expect("propagator");
    let comparison = MgaComparison::new(&evaluator, &solver, &propagator).with_options(
        ComparisonOptions {
            epoch_origin: EpochOrigin::LegDeparture,
            parallel: true,
        },
    );

    let first = comparison.run(&mission).expect("first run");
    let second = comparison.run(&mission).expect("second run");
    let sequential = MgaComparison::new(&evaluator, &solver, &propagator)
        .with_options(ComparisonOptions {
            epoch_origin: EpochOrigin::LegDeparture,
            parallel: false,
        })
        .run(&mission)
        .expect("sequential run");

    assert_eq!(first.residuals(), second.residuals());
    assert_eq!(first.residuals(), sequential.residuals());
    assert_eq!(first.times_of_flight_days, second.times_of_flight_days);
}

#[test]
fn histories_share_first_and_last_epochs() {
    let bodies = solar_system();
    let solver = LambertTargeter::new(MU_SUN, 7);
    let request = LegRequest {
        index: 0,
        departure_position_km: [1.0e8, 1.0e8, 0.0],
        arrival_position_km: [-1.5e8, 0.8e8, 1.0e6],
        time_of_flight_s: days_to_seconds(140.0),
        start_epoch_s: 12_345.678,
        departure_body: Some("Earth"),
        arrival_body: None,
    };

    for anchor in [PropagationAnchor::Departure, PropagationAnchor::Midpoint] {
        let propagator = FullPropagator::new(
            &bodies,
            AccelerationModel {
                central_body: "Sun".into(),
                third_bodies: names(&["Earth", "Jupiter"]),
                exclude_leg_bodies: true,
            },
            IntegratorSettings::default(),
            anchor,
        )
        .expect("propagator");

        let histories = propagate_leg(&request, &solver, &propagator).expect("leg");
        assert_eq!(histories.analytic.len(), 7);
        let (a0, _) = histories.analytic.first().unwrap();
        let (a1, _) = histories.analytic.last().unwrap();
        let (n0, _) = histories.numerical.first().unwrap();
        let (n1, _) = histories.numerical.last().unwrap();
        assert_eq!(a0, request.start_epoch_s);
        assert_eq!(a1, request.end_epoch_s());
        assert_eq!(a0, n0);
        assert_eq!(a1, n1);

        assert!(endpoint_residual(&histories.analytic, &histories.numerical).is_ok());
    }
}

#[test]
fn failing_leg_leaves_sibling_residuals_intact() {
    let mission = MissionDescription::new(
        names(&["Earth", "Venus", "Earth", "Mars", "Jupiter"]),
        vec![Departure, Swingby, Swingby, Swingby],
        vec![0.0, 100.0, 120.0, 140.0, 160.0],
    );
    let evaluator = SpiralEvaluator;
    let solver = LambertTargeter::new(MU_SUN, 10);
    let propagator = EchoPropagator { failing: vec![1] };

    let report = MgaComparison::new(&evaluator, &solver, &propagator)
        .run(&mission)
        .expect("comparison");

    assert_eq!(report.outcomes.len(), 3);
    assert!(!report.is_complete());
    let residuals = report.residuals();
    assert_eq!(residuals.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
    for residual in residuals.values() {
        assert!(residual.departure.iter().all(|v| *v == 0.0));
        assert!(residual.arrival.iter().all(|v| *v == 0.0));
    }
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[&1], LegError::Integration(_)));
}

#[test]
fn zero_duration_sub_leg_is_reported_not_masked() {
    let bodies = solar_system();
    let mission = earth_venus_earth_mars_dsm(0.0);
    let evaluator = PatchedConicEvaluator::new(&bodies, "Sun").expect("evaluator");
    let solver = LambertTargeter::new(MU_SUN, 10);
    let propagator = FullPropagator::new(
        &bodies,
        AccelerationModel::central_only("Sun"),
        IntegratorSettings::default(),
        PropagationAnchor::Departure,
    )
    .expect("propagator");

    let report = MgaComparison::new(&evaluator, &solver, &propagator)
        .run(&mission)
        .expect("comparison");

    assert_eq!(report.times_of_flight_days[1], 0.0);
    let failures = report.failures();
    assert_eq!(failures.keys().copied().collect::<Vec<_>>(), vec![1]);
    assert!(matches!(
        failures[&1],
        LegError::Geometry(GeometryError::DegenerateTimeOfFlight(_))
    ));
    assert!(report.residuals().contains_key(&0));
    assert!(report.residuals().contains_key(&2));
}

#[test]
fn tiny_dsm_fraction_fails_per_leg_not_per_run() {
    let bodies = solar_system();
    let evaluator = PatchedConicEvaluator::new(&bodies, "Sun").expect("evaluator");
    let solver = LambertTargeter::new(MU_SUN, 10);
    let propagator = FullPropagator::new(
        &bodies,
        AccelerationModel::central_only("Sun"),
        IntegratorSettings::default(),
        PropagationAnchor::Departure,
    )
    .expect("propagator");

    for fraction in [1e-6, 1e-7] {
        let mission = earth_venus_earth_mars_dsm(fraction);
        let report = MgaComparison::new(&evaluator, &solver, &propagator)
            .run(&mission)
            .unwrap_or_else(|err| panic!("fraction {fraction}: {err}"));

        assert_eq!(report.outcomes.len(), 3);
        assert!((report.times_of_flight_days[1] - fraction * 250.0).abs() < 1e-12);
        assert!(report.outcomes[0].result.is_ok());
        assert!(report.outcomes[2].result.is_ok());
        match &report.outcomes[1].result {
            Ok(residual) => assert!(residual.arrival_position_error_km().is_finite()),
            Err(err) => assert!(matches!(err, LegError::Geometry(_)), "fraction {fraction}: {err}"),
        }
    }
}

#[test]
fn lambert_targeter_rejects_degenerate_time_of_flight() {
    let solver = LambertTargeter::new(MU_SUN, 10);
    let request = LegRequest {
        index: 0,
        departure_position_km: [1.0e8, 0.0, 0.0],
        arrival_position_km: [0.0, 1.2e8, 0.0],
        time_of_flight_s: -5.0,
        start_epoch_s: 0.0,
        departure_body: None,
        arrival_body: None,
    };
    assert!(matches!(
        solver.solve(&request),
        Err(GeometryError::DegenerateTimeOfFlight(_))
    ));
}
