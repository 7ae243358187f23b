//! Leg time-of-flight resolution.

use mga_trajectory::{TrajectoryLayout, split_leg_duration};

use crate::error::ConfigurationError;

/// Time of flight, in days, for each inter-boundary segment before the final leg.
///
/// Legs `0..n - 1` are visited in order; a DSM leg contributes its
/// pre- and post-manoeuvre durations, every other leg its undivided duration.
/// The final leg is not resolved.
pub fn resolve_times_of_flight(
    layout: &TrajectoryLayout,
    parameters: &[f64],
) -> Result<Vec<f64>, ConfigurationError> {
    if parameters.len() != layout.parameter_count() {
        return Err(ConfigurationError::ParameterCountMismatch {
            expected: layout.parameter_count(),
            actual: parameters.len(),
        });
    }

    let resolved_legs = layout.number_of_legs().saturating_sub(1);
    let mut times = Vec::with_capacity(layout.legs_including_dsm());
    for slot in &layout.slots()[..resolved_legs] {
        let duration = parameters[layout.duration_slot(slot.leg_index)];
        match slot.dsm_index {
            None => times.push(duration),
            Some(dsm) => {
                let fraction = parameters[layout.dsm_fraction_slot(dsm)];
                let (pre, post) = split_leg_duration(fraction, duration);
                times.push(pre);
                times.push(post);
            }
        }
    }
    Ok(times)
}
