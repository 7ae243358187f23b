//! Body environment for patched-conic and full-dynamics propagation.
//!
//! A [`BodyMap`] holds every named body the comparison needs: its gravitational
//! parameter, mean radius and an [`Ephemeris`] giving its heliocentric state at an
//! epoch (seconds past J2000, ecliptic J2000 frame).

use std::collections::BTreeMap;
use std::fmt::Debug;

use mga_core::state::{State6, compose};
use mga_core::vector::Vector3;
use mga_orbits::KeplerError;
use thiserror::Error;

pub mod approximate;

pub use approximate::{ApproximatePlanet, Planet};

/// Position and velocity of a body relative to the central body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
}

impl StateVector {
    pub fn to_state6(&self) -> State6 {
        compose(&self.position_km, &self.velocity_km_s)
    }
}

/// Errors surfaced while resolving bodies or evaluating ephemerides.
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("body `{0}` is not present in the body map")]
    UnknownBody(String),
    #[error("no approximate ephemeris for `{0}`")]
    UnknownPlanet(String),
    #[error("ephemeris evaluation failed: {0}")]
    Kepler(#[from] KeplerError),
}

/// Source of a body's state as a function of epoch.
pub trait Ephemeris: Debug + Send + Sync {
    fn state(&self, epoch_s: f64) -> Result<StateVector, EphemerisError>;
}

/// Ephemeris returning the same state at every epoch (central bodies, test fixtures).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedState {
    pub state: StateVector,
}

impl FixedState {
    /// A body resting at the frame origin.
    pub fn origin() -> Self {
        Self {
            state: StateVector {
                position_km: [0.0; 3],
                velocity_km_s: [0.0; 3],
            },
        }
    }
}

impl Ephemeris for FixedState {
    fn state(&self, _epoch_s: f64) -> Result<StateVector, EphemerisError> {
        Ok(self.state)
    }
}

/// Named celestial body with its gravity and ephemeris.
#[derive(Debug)]
pub struct Body {
    pub name: String,
    pub mu_km3_s2: f64,
    pub radius_km: f64,
    ephemeris: Box<dyn Ephemeris>,
}

impl Body {
    pub fn new(
        name: impl Into<String>,
        mu_km3_s2: f64,
        radius_km: f64,
        ephemeris: Box<dyn Ephemeris>,
    ) -> Self {
        Self {
            name: name.into(),
            mu_km3_s2,
            radius_km,
            ephemeris,
        }
    }

    pub fn state_at(&self, epoch_s: f64) -> Result<StateVector, EphemerisError> {
        self.ephemeris.state(epoch_s)
    }
}

/// Bodies keyed by case-insensitive name.
#[derive(Debug, Default)]
pub struct BodyMap {
    bodies: BTreeMap<String, Body>,
}

impl BodyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a body, replacing any body registered under the same name.
    pub fn insert(&mut self, body: Body) {
        self.bodies.insert(normalize_body_name(&body.name), body);
    }

    pub fn get(&self, name: &str) -> Result<&Body, EphemerisError> {
        self.bodies
            .get(&normalize_body_name(name))
            .ok_or_else(|| EphemerisError::UnknownBody(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bodies.contains_key(&normalize_body_name(name))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bodies.values().map(|body| body.name.as_str())
    }
}

/// Normalize a body name for lookups.
pub fn normalize_body_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}
