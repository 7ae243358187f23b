//! Core units, constants, and shared primitives for the MGA fidelity workspace.

/// Physical constants expressed in kilometre/second units (unless stated otherwise).
pub mod constants {
    /// Gravitational parameter of the Sun (km³/s²).
    pub const MU_SUN: f64 = 1.327_124_400_18e11;
    /// Kilometres per astronomical unit.
    pub const AU_KM: f64 = 149_597_870.7;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Days per Julian century.
    pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert kilometres to astronomical units.
    #[inline]
    pub fn km_to_au(v: f64) -> f64 {
        v / super::constants::AU_KM
    }

    /// Convert astronomical units to kilometres.
    #[inline]
    pub fn au_to_km(v: f64) -> f64 {
        v * super::constants::AU_KM
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::{DAYS_PER_JULIAN_CENTURY, SECONDS_PER_DAY};

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }

    /// Julian centuries elapsed since J2000 for an epoch in seconds past J2000.
    #[inline]
    pub fn julian_centuries_since_j2000(seconds: f64) -> f64 {
        seconds_to_days(seconds) / DAYS_PER_JULIAN_CENTURY
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in kilometres or km/s depending on context.
    pub type Vector3 = [f64; 3];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product of two vectors.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector in the direction of `v`; the zero vector maps to itself.
    #[inline]
    pub fn unit(v: &Vector3) -> Vector3 {
        let n = norm(v);
        if n == 0.0 { *v } else { scale(v, 1.0 / n) }
    }
}

/// Six-component Cartesian states (position km, velocity km/s).
pub mod state {
    use super::vector::Vector3;

    /// Position followed by velocity.
    pub type State6 = [f64; 6];

    /// Assemble a state from position and velocity.
    #[inline]
    pub fn compose(position: &Vector3, velocity: &Vector3) -> State6 {
        [
            position[0],
            position[1],
            position[2],
            velocity[0],
            velocity[1],
            velocity[2],
        ]
    }

    /// Position part of a state.
    #[inline]
    pub fn position(state: &State6) -> Vector3 {
        [state[0], state[1], state[2]]
    }

    /// Velocity part of a state.
    #[inline]
    pub fn velocity(state: &State6) -> Vector3 {
        [state[3], state[4], state[5]]
    }

    /// Element-wise difference `a - b`.
    #[inline]
    pub fn difference(a: &State6, b: &State6) -> State6 {
        let mut out = [0.0; 6];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = a[i] - b[i];
        }
        out
    }

    /// True when every component is finite.
    #[inline]
    pub fn is_finite(state: &State6) -> bool {
        state.iter().all(|v| v.is_finite())
    }
}

pub mod history;

pub use history::{HistoryError, StateHistory};
