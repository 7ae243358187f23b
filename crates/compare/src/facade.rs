//! Re-exported APIs and configuration conversions for consumers of the comparison crate.

pub use crate::differ::{LegResidual, endpoint_residual};
pub use crate::driver::{ComparisonOptions, ComparisonReport, EpochOrigin, LegOutcome, MgaComparison};
pub use crate::engine::{
    AnalyticArc, FullPropagator, LambertTargeter, LegRequest, NumericalPropagator,
    PropagationAnchor, TwoBodySolver,
};
pub use crate::error::{ComparisonError, ConfigurationError, GeometryError, LegError};

pub mod environment {
    use mga_config::{BodyConfig, EphemerisConfig};
    use mga_ephem::{
        ApproximatePlanet, Body, BodyMap, EphemerisError, FixedState, Planet, StateVector,
    };

    /// Convert a catalog entry into a runtime body.
    pub fn body_from_config(config: &BodyConfig) -> Result<Body, EphemerisError> {
        let ephemeris: Box<dyn mga_ephem::Ephemeris> = match &config.ephemeris {
            EphemerisConfig::Approximate { planet } => {
                let planet = Planet::from_name(planet.as_deref().unwrap_or(&config.name))?;
                Box::new(ApproximatePlanet::new(planet))
            }
            EphemerisConfig::Fixed {
                position_km,
                velocity_km_s,
            } => Box::new(FixedState {
                state: StateVector {
                    position_km: *position_km,
                    velocity_km_s: *velocity_km_s,
                },
            }),
        };
        Ok(Body::new(
            config.name.clone(),
            config.mu_km3_s2,
            config.radius_km,
            ephemeris,
        ))
    }

    /// Build a body map; later entries replace earlier ones with the same name.
    pub fn body_map<'a, I>(configs: I) -> Result<BodyMap, EphemerisError>
    where
        I: IntoIterator<Item = &'a BodyConfig>,
    {
        let mut bodies = BodyMap::new();
        for config in configs {
            bodies.insert(body_from_config(config)?);
        }
        Ok(bodies)
    }
}

pub mod scenario {
    use std::path::Path;

    use log::info;
    use mga_config::{
        AccelerationConfig, AnchorConfig, ComparisonConfig, ConfigError, EpochOriginConfig,
        IntegratorConfig, LegTypeConfig, MissionConfig, ScenarioConfig, load_bodies,
    };
    use mga_ephem::{BodyMap, EphemerisError};
    use mga_orbits::OrbitShape;
    use mga_propagator::{AccelerationModel, IntegratorSettings};
    use mga_trajectory::{LegType, MissionDescription, PatchedConicEvaluator};
    use thiserror::Error;

    use super::environment::body_map;
    use crate::driver::{ComparisonOptions, ComparisonReport, EpochOrigin, MgaComparison};
    use crate::engine::{FullPropagator, LambertTargeter, PropagationAnchor};
    use crate::error::ComparisonError;

    /// Errors surfaced while turning a scenario into a comparison run.
    #[derive(Debug, Error)]
    pub enum ScenarioError {
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error("body environment: {0}")]
        Ephemeris(#[from] EphemerisError),
        #[error(transparent)]
        Comparison(#[from] ComparisonError),
        #[error("scenario `{0}` defines no bodies and no body catalog")]
        NoBodies(String),
    }

    pub fn leg_type_from_config(config: LegTypeConfig) -> LegType {
        match config {
            LegTypeConfig::Departure => LegType::Departure,
            LegTypeConfig::Swingby => LegType::Swingby,
            LegTypeConfig::SwingbyDsm => LegType::SwingbyWithDsm,
        }
    }

    pub fn mission_from_config(config: &MissionConfig) -> MissionDescription {
        let leg_types: Vec<LegType> = config
            .leg_types
            .iter()
            .copied()
            .map(leg_type_from_config)
            .collect();
        let orbit = |shape: &mga_config::OrbitShapeConfig| OrbitShape {
            semi_major_axis_km: shape.semi_major_axis_km,
            eccentricity: shape.eccentricity,
        };
        MissionDescription {
            number_of_legs: config.number_of_legs.unwrap_or(leg_types.len()),
            bodies: config.bodies.clone(),
            leg_types,
            parameters: config.parameters.clone(),
            minimum_pericenter_radii_km: config.minimum_pericenter_radii_km.clone(),
            departure_orbit: config.departure_orbit.as_ref().map(orbit),
            capture_orbit: config.capture_orbit.as_ref().map(orbit),
        }
    }

    pub fn acceleration_from_config(config: &AccelerationConfig) -> AccelerationModel {
        AccelerationModel {
            central_body: config.central_body.clone(),
            third_bodies: config.third_bodies.clone(),
            exclude_leg_bodies: config.exclude_leg_bodies,
        }
    }

    pub fn integrator_from_config(config: &IntegratorConfig) -> IntegratorSettings {
        match *config {
            IntegratorConfig::Rk4 { step_s } => IntegratorSettings::RungeKutta4 { step_s },
            IntegratorConfig::Rkf78 {
                initial_step_s,
                min_step_s,
                max_step_s,
                relative_tolerance,
                absolute_tolerance,
                max_steps,
            } => IntegratorSettings::RungeKuttaFehlberg78 {
                initial_step_s,
                min_step_s,
                max_step_s,
                relative_tolerance,
                absolute_tolerance,
                max_steps,
            },
        }
    }

    pub fn options_from_config(config: &ComparisonConfig) -> ComparisonOptions {
        let epoch_origin = match config.epoch_origin {
            EpochOriginConfig::Shared => EpochOrigin::Shared {
                epoch_s: config.shared_epoch_s,
            },
            EpochOriginConfig::LegDeparture => EpochOrigin::LegDeparture,
        };
        ComparisonOptions {
            epoch_origin,
            parallel: config.parallel,
        }
    }

    pub fn anchor_from_config(config: AnchorConfig) -> PropagationAnchor {
        match config {
            AnchorConfig::Departure => PropagationAnchor::Departure,
            AnchorConfig::Midpoint => PropagationAnchor::Midpoint,
        }
    }

    /// Body environment of a scenario: the catalog (or `catalog_override`) plus inline bodies.
    pub fn scenario_bodies(
        scenario: &ScenarioConfig,
        catalog_override: Option<&Path>,
    ) -> Result<BodyMap, ScenarioError> {
        let mut configs = match catalog_override.or(scenario.body_catalog.as_deref()) {
            Some(path) => load_bodies(path)?,
            None => Vec::new(),
        };
        configs.extend(scenario.bodies.iter().cloned());
        if configs.is_empty() {
            return Err(ScenarioError::NoBodies(scenario.name.clone()));
        }
        Ok(body_map(&configs)?)
    }

    /// Run the full comparison described by `scenario` against `bodies`.
    pub fn run_scenario(
        scenario: &ScenarioConfig,
        bodies: &BodyMap,
    ) -> Result<ComparisonReport, ScenarioError> {
        let mission = mission_from_config(&scenario.mission);
        for name in &mission.bodies {
            bodies.get(name)?;
        }
        let acceleration = acceleration_from_config(&scenario.acceleration);
        let central_mu = bodies.get(&acceleration.central_body)?.mu_km3_s2;

        let evaluator = PatchedConicEvaluator::new(bodies, &acceleration.central_body)?;
        let solver = LambertTargeter::new(central_mu, scenario.comparison.analytic_samples);
        let propagator = FullPropagator::new(
            bodies,
            acceleration,
            integrator_from_config(&scenario.integrator),
            anchor_from_config(scenario.comparison.anchor),
        )?;

        info!(
            "scenario `{}`: {} through {}",
            scenario.name,
            mission.bodies.join(" -> "),
            propagator
                .acceleration()
                .third_bodies
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        let report = MgaComparison::new(&evaluator, &solver, &propagator)
            .with_options(options_from_config(&scenario.comparison))
            .run(&mission)?;
        Ok(report)
    }
}

pub mod report {
    use mga_export::residuals::{BoundaryRecord, LegRecord, ResidualRecord, ResidualReport};

    use crate::driver::ComparisonReport;

    /// Flatten a comparison report into its export representation.
    pub fn to_export(scenario: &str, report: &ComparisonReport) -> ResidualReport {
        let boundaries = report
            .boundaries
            .iter()
            .enumerate()
            .map(|(index, boundary)| BoundaryRecord {
                index,
                label: boundary.kind.to_string(),
                epoch_s: boundary.epoch_s,
                position_km: boundary.position_km,
                delta_v_km_s: boundary.delta_v_km_s,
            })
            .collect();

        let legs = report
            .outcomes
            .iter()
            .map(|outcome| {
                let (residual, error) = match &outcome.result {
                    Ok(residual) => (
                        Some(ResidualRecord {
                            departure: residual.departure,
                            arrival: residual.arrival,
                            departure_position_error_km: residual.departure_position_error_km(),
                            departure_velocity_error_km_s: residual
                                .departure_velocity_error_km_s(),
                            arrival_position_error_km: residual.arrival_position_error_km(),
                            arrival_velocity_error_km_s: residual.arrival_velocity_error_km_s(),
                        }),
                        None,
                    ),
                    Err(err) => (None, Some(err.to_string())),
                };
                LegRecord {
                    index: outcome.index,
                    from: outcome.from.to_string(),
                    to: outcome.to.to_string(),
                    time_of_flight_days: outcome.time_of_flight_days,
                    start_epoch_s: outcome.start_epoch_s,
                    residual,
                    error,
                }
            })
            .collect();

        ResidualReport {
            scenario: scenario.to_string(),
            total_delta_v_km_s: report.total_delta_v_km_s,
            times_of_flight_days: report.times_of_flight_days.clone(),
            boundaries,
            legs,
            complete: report.is_complete(),
        }
    }
}
