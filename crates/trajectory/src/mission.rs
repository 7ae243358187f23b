use mga_orbits::OrbitShape;

use crate::layout::{LayoutError, LegType, TrajectoryLayout, check_leg_order};

/// Everything the patched-conic evaluator needs besides the body environment.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionDescription {
    pub number_of_legs: usize,
    /// Body order; leg `i` departs `bodies[i]` and arrives at `bodies[i + 1]`.
    pub bodies: Vec<String>,
    pub leg_types: Vec<LegType>,
    pub parameters: Vec<f64>,
    /// One radius per body; empty means each body's mean radius.
    pub minimum_pericenter_radii_km: Vec<f64>,
    pub departure_orbit: Option<OrbitShape>,
    pub capture_orbit: Option<OrbitShape>,
}

impl MissionDescription {
    pub fn new(bodies: Vec<String>, leg_types: Vec<LegType>, parameters: Vec<f64>) -> Self {
        Self {
            number_of_legs: leg_types.len(),
            bodies,
            leg_types,
            parameters,
            minimum_pericenter_radii_km: Vec::new(),
            departure_orbit: None,
            capture_orbit: None,
        }
    }

    /// Validate the leg order and sequence lengths and build the layout table.
    pub fn layout(&self) -> Result<TrajectoryLayout, LayoutError> {
        check_leg_order(&self.leg_types)?;
        if self.number_of_legs != self.leg_types.len() {
            return Err(LayoutError::LegCountMismatch {
                declared: self.number_of_legs,
                leg_types: self.leg_types.len(),
            });
        }
        let expected = self.number_of_legs + 1;
        if self.bodies.len() != expected {
            return Err(LayoutError::BodyCountMismatch {
                legs: self.number_of_legs,
                expected,
                actual: self.bodies.len(),
            });
        }
        if !self.minimum_pericenter_radii_km.is_empty()
            && self.minimum_pericenter_radii_km.len() != expected
        {
            return Err(LayoutError::PericenterCountMismatch {
                expected,
                actual: self.minimum_pericenter_radii_km.len(),
            });
        }
        TrajectoryLayout::new(&self.leg_types, self.parameters.len())
    }
}
