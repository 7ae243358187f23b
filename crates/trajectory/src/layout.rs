//! Leg layout table shared by the trajectory evaluator and the time-of-flight resolver.
//!
//! The packed parameter vector is laid out as
//!
//! ```text
//! [t0, T_0, T_1, ..., T_{n-1}, (f, rotation, r_p, dv_p) per DSM leg in leg order]
//! ```
//!
//! where `t0` is the departure epoch and `T_i` the undivided duration of leg `i`, both
//! in days. Every index into that vector goes through the lookups on
//! [`TrajectoryLayout`].

use std::ops::Range;

use thiserror::Error;

/// Number of parameter entries carried by each DSM leg.
pub const DSM_BLOCK_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegType {
    Departure,
    Swingby,
    SwingbyWithDsm,
}

impl LegType {
    pub fn has_dsm(self) -> bool {
        matches!(self, Self::SwingbyWithDsm)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Departure => "departure",
            Self::Swingby => "swingby",
            Self::SwingbyWithDsm => "swingby_dsm",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("leg sequence is empty")]
    EmptyLegSequence,
    #[error("declared {declared} legs but {leg_types} leg types were given")]
    LegCountMismatch { declared: usize, leg_types: usize },
    #[error("the first leg must be a departure leg, got {0:?}")]
    FirstLegNotDeparture(LegType),
    #[error("leg {0} is a departure leg; only the first leg may depart")]
    DepartureAfterFirstLeg(usize),
    #[error("{legs} legs need {expected} bodies in the body order, got {actual}")]
    BodyCountMismatch {
        legs: usize,
        expected: usize,
        actual: usize,
    },
    #[error("expected {expected} minimum pericenter radii (one per body), got {actual}")]
    PericenterCountMismatch { expected: usize, actual: usize },
    #[error("parameter vector needs at least {required} entries for {legs} legs, got {actual}")]
    TooFewParameters {
        legs: usize,
        required: usize,
        actual: usize,
    },
    #[error("{trailing} trailing parameters do not form whole DSM blocks of {DSM_BLOCK_LEN}")]
    MisalignedDsmBlocks { trailing: usize },
    #[error("parameter vector encodes {from_parameters} DSM legs but leg types declare {from_leg_types}")]
    DsmCountMismatch {
        from_parameters: usize,
        from_leg_types: usize,
    },
}

/// One row of the layout table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegSlot {
    pub leg_type: LegType,
    /// Position of the leg in the leg sequence.
    pub leg_index: usize,
    /// Running DSM counter, present only for DSM legs.
    pub dsm_index: Option<usize>,
    /// Boundary point the leg departs from.
    pub first_boundary: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryLayout {
    slots: Vec<LegSlot>,
    dsm_count: usize,
    parameter_count: usize,
}

impl TrajectoryLayout {
    /// Build the table from the leg types and the length of the parameter vector.
    /// Only counts are checked; see [`check_leg_order`] for the ordering rules.
    pub fn new(leg_types: &[LegType], parameter_count: usize) -> Result<Self, LayoutError> {
        if leg_types.is_empty() {
            return Err(LayoutError::EmptyLegSequence);
        }

        let legs = leg_types.len();
        let dsm_count = legs_including_dsm(legs, parameter_count)? - legs;
        let declared = leg_types.iter().filter(|leg| leg.has_dsm()).count();
        if dsm_count != declared {
            return Err(LayoutError::DsmCountMismatch {
                from_parameters: dsm_count,
                from_leg_types: declared,
            });
        }

        let mut slots = Vec::with_capacity(legs);
        let mut dsm_index = 0;
        let mut boundary = 0;
        for (leg_index, &leg_type) in leg_types.iter().enumerate() {
            let dsm = leg_type.has_dsm().then(|| {
                dsm_index += 1;
                dsm_index - 1
            });
            slots.push(LegSlot {
                leg_type,
                leg_index,
                dsm_index: dsm,
                first_boundary: boundary,
            });
            boundary += if dsm.is_some() { 2 } else { 1 };
        }

        Ok(Self {
            slots,
            dsm_count,
            parameter_count,
        })
    }

    pub fn slots(&self) -> &[LegSlot] {
        &self.slots
    }

    pub fn number_of_legs(&self) -> usize {
        self.slots.len()
    }

    pub fn dsm_count(&self) -> usize {
        self.dsm_count
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    pub fn legs_including_dsm(&self) -> usize {
        self.slots.len() + self.dsm_count
    }

    /// Boundary points: departure, every flyby and DSM, and the final arrival.
    pub fn boundary_count(&self) -> usize {
        self.legs_including_dsm() + 1
    }

    /// Inter-boundary segments that are propagated and compared; the trailing
    /// segment into the final body is not among them.
    pub fn evaluation_leg_count(&self) -> usize {
        self.legs_including_dsm().saturating_sub(1)
    }

    pub fn departure_epoch_slot(&self) -> usize {
        0
    }

    /// Slot holding the undivided duration of `leg`.
    pub fn duration_slot(&self, leg: usize) -> usize {
        1 + leg
    }

    /// Parameter range of the `dsm`-th DSM block.
    pub fn dsm_block(&self, dsm: usize) -> Range<usize> {
        let start = self.slots.len() + 1 + DSM_BLOCK_LEN * dsm;
        start..start + DSM_BLOCK_LEN
    }

    pub fn dsm_fraction_slot(&self, dsm: usize) -> usize {
        self.dsm_block(dsm).start
    }
}

/// The first leg must depart and no later leg may.
pub fn check_leg_order(leg_types: &[LegType]) -> Result<(), LayoutError> {
    let Some(&first) = leg_types.first() else {
        return Err(LayoutError::EmptyLegSequence);
    };
    if first != LegType::Departure {
        return Err(LayoutError::FirstLegNotDeparture(first));
    }
    match leg_types
        .iter()
        .skip(1)
        .position(|leg| *leg == LegType::Departure)
    {
        Some(position) => Err(LayoutError::DepartureAfterFirstLeg(position + 1)),
        None => Ok(()),
    }
}

/// Legs plus DSM sub-legs implied by the parameter-vector length.
pub fn legs_including_dsm(number_of_legs: usize, parameter_count: usize) -> Result<usize, LayoutError> {
    let required = 1 + number_of_legs;
    if parameter_count < required {
        return Err(LayoutError::TooFewParameters {
            legs: number_of_legs,
            required,
            actual: parameter_count,
        });
    }
    let trailing = parameter_count - required;
    if trailing % DSM_BLOCK_LEN != 0 {
        return Err(LayoutError::MisalignedDsmBlocks { trailing });
    }
    Ok(trailing / DSM_BLOCK_LEN + number_of_legs)
}

/// Split a DSM leg's duration at the manoeuvre: `(fraction * T, (1 - fraction) * T)`.
pub fn split_leg_duration(fraction: f64, duration: f64) -> (f64, f64) {
    (fraction * duration, (1.0 - fraction) * duration)
}
