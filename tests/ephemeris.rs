use mga_fidelity::base::constants::MU_SUN;
use mga_fidelity::base::time::days_to_seconds;
use mga_fidelity::base::units::km_to_au;
use mga_fidelity::base::vector::norm;
use mga_fidelity::ephem::{
    ApproximatePlanet, Body, BodyMap, Ephemeris, EphemerisError, FixedState, Planet, StateVector,
    normalize_body_name,
};

#[test]
fn earth_at_j2000_sits_near_perihelion() {
    let state = ApproximatePlanet::new(Planet::EarthMoonBarycenter)
        .state(0.0)
        .expect("earth state");
    let r_au = km_to_au(norm(&state.position_km));
    let speed = norm(&state.velocity_km_s);

    assert!((0.98..0.99).contains(&r_au), "earth distance {r_au} AU");
    assert!((speed - 30.29).abs() < 0.1, "earth speed {speed} km/s");
    assert!(state.position_km[2].abs() < 1.0e3);
}

#[test]
fn planets_stay_within_their_orbital_bounds() {
    let cases = [
        (Planet::Venus, 0.718, 0.729),
        (Planet::Mars, 1.38, 1.67),
        (Planet::Jupiter, 4.95, 5.46),
    ];
    for (planet, perihelion, aphelion) in cases {
        let ephemeris = ApproximatePlanet::new(planet);
        for day in (0..4_000).step_by(250) {
            let state = ephemeris.state(days_to_seconds(day as f64)).expect("state");
            let r_au = km_to_au(norm(&state.position_km));
            assert!(
                (perihelion..aphelion).contains(&r_au),
                "{planet:?} at day {day}: {r_au} AU"
            );
            let energy = norm(&state.velocity_km_s).powi(2) / 2.0 - MU_SUN / norm(&state.position_km);
            assert!(energy < 0.0);
        }
    }
}

#[test]
fn planet_names_resolve_case_insensitively() {
    assert_eq!(Planet::from_name("earth").unwrap(), Planet::EarthMoonBarycenter);
    assert_eq!(Planet::from_name("EMB").unwrap(), Planet::EarthMoonBarycenter);
    assert_eq!(Planet::from_name(" Mars Barycenter ").unwrap(), Planet::Mars);
    assert!(matches!(
        Planet::from_name("Vulcan"),
        Err(EphemerisError::UnknownPlanet(name)) if name == "Vulcan"
    ));
}

#[test]
fn body_map_lookups_ignore_case_and_whitespace() {
    let mut bodies = BodyMap::new();
    assert!(bodies.is_empty());
    bodies.insert(Body::new("Sun", MU_SUN, 696_000.0, Box::new(FixedState::origin())));
    bodies.insert(Body::new(
        "Mars",
        42_828.375_214,
        3_389.5,
        Box::new(ApproximatePlanet::new(Planet::Mars)),
    ));

    assert_eq!(bodies.len(), 2);
    assert!(bodies.contains(" mars"));
    assert_eq!(bodies.get("SUN").expect("sun").name, "Sun");
    assert_eq!(bodies.names().collect::<Vec<_>>(), vec!["Mars", "Sun"]);
    assert!(matches!(
        bodies.get("Pluto"),
        Err(EphemerisError::UnknownBody(name)) if name == "Pluto"
    ));
    assert_eq!(normalize_body_name("  Venus "), "VENUS");

    bodies.insert(Body::new("MARS", 1.0, 1.0, Box::new(FixedState::origin())));
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies.get("mars").expect("mars").mu_km3_s2, 1.0);
}

#[test]
fn fixed_state_ignores_the_epoch() {
    let fixed = FixedState {
        state: StateVector {
            position_km: [1.0, 2.0, 3.0],
            velocity_km_s: [0.1, 0.2, 0.3],
        },
    };
    let body = Body::new("Probe", 0.0, 0.0, Box::new(fixed));
    let early = body.state_at(-1.0e9).expect("state");
    let late = body.state_at(1.0e9).expect("state");
    assert_eq!(early, late);
    assert_eq!(late.to_state6(), [1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);
}
