//! Fixed-step RK4 and adaptive Runge-Kutta-Fehlberg 7(8) integrators.
//!
//! Both integrators accept `tf < t0` and then step backward in time. The returned
//! history is always ordered by increasing epoch, lands exactly on `tf` and holds
//! the initial state plus one sample per accepted step.

use log::debug;
use mga_core::StateHistory;
use mga_core::state::{self, State6};

use crate::IntegrationError;
use crate::coefficients::{A, B, B_ERR, C, STAGES};

/// First-order system `dy/dt = f(t, y)` over a Cartesian state.
pub trait OdeSystem {
    fn derivative(&self, epoch_s: f64, state: &State6) -> Result<State6, IntegrationError>;
}

/// Integrator selection and its tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntegratorSettings {
    RungeKutta4 {
        step_s: f64,
    },
    RungeKuttaFehlberg78 {
        initial_step_s: f64,
        min_step_s: f64,
        max_step_s: f64,
        relative_tolerance: f64,
        absolute_tolerance: f64,
        max_steps: u64,
    },
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self::RungeKuttaFehlberg78 {
            initial_step_s: 3_600.0,
            min_step_s: 1e-3,
            max_step_s: 5.0 * 86_400.0,
            relative_tolerance: 1e-12,
            absolute_tolerance: 1e-9,
            max_steps: 1_000_000,
        }
    }
}

impl IntegratorSettings {
    pub fn validate(&self) -> Result<(), IntegrationError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        match *self {
            Self::RungeKutta4 { step_s } => {
                if !positive(step_s) {
                    return Err(IntegrationError::InvalidSettings(format!(
                        "rk4 step must be positive, got {step_s}"
                    )));
                }
            }
            Self::RungeKuttaFehlberg78 {
                initial_step_s,
                min_step_s,
                max_step_s,
                relative_tolerance,
                absolute_tolerance,
                max_steps,
            } => {
                if !(positive(initial_step_s) && positive(min_step_s) && positive(max_step_s)) {
                    return Err(IntegrationError::InvalidSettings(
                        "rkf78 step sizes must be positive".into(),
                    ));
                }
                if min_step_s > max_step_s {
                    return Err(IntegrationError::InvalidSettings(format!(
                        "rkf78 minimum step {min_step_s} exceeds maximum step {max_step_s}"
                    )));
                }
                if !(positive(relative_tolerance) || positive(absolute_tolerance)) {
                    return Err(IntegrationError::InvalidSettings(
                        "rkf78 needs a positive relative or absolute tolerance".into(),
                    ));
                }
                if relative_tolerance < 0.0 || absolute_tolerance < 0.0 {
                    return Err(IntegrationError::InvalidSettings(
                        "rkf78 tolerances must not be negative".into(),
                    ));
                }
                if max_steps == 0 {
                    return Err(IntegrationError::InvalidSettings(
                        "rkf78 max_steps must be at least one".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Integrate `system` from `(t0, y0)` to `tf`.
pub fn integrate<S: OdeSystem + ?Sized>(
    system: &S,
    settings: &IntegratorSettings,
    t0: f64,
    y0: &State6,
    tf: f64,
) -> Result<StateHistory, IntegrationError> {
    settings.validate()?;
    if !state::is_finite(y0) {
        return Err(IntegrationError::NonFiniteState { epoch_s: t0 });
    }

    let mut samples = vec![(t0, *y0)];
    if tf != t0 {
        match *settings {
            IntegratorSettings::RungeKutta4 { step_s } => {
                rk4_fixed(system, step_s, t0, y0, tf, &mut samples)?
            }
            IntegratorSettings::RungeKuttaFehlberg78 { .. } => {
                rkf78_adaptive(system, settings, t0, y0, tf, &mut samples)?
            }
        }
    }
    if tf < t0 {
        samples.reverse();
    }

    let mut history = StateHistory::with_capacity(samples.len());
    for (epoch_s, sample) in samples {
        history.push(epoch_s, sample)?;
    }
    Ok(history)
}

fn rk4_fixed<S: OdeSystem + ?Sized>(
    system: &S,
    step_s: f64,
    t0: f64,
    y0: &State6,
    tf: f64,
    samples: &mut Vec<(f64, State6)>,
) -> Result<(), IntegrationError> {
    let span = tf - t0;
    let direction = span.signum();
    let steps = (span.abs() / step_s).ceil().max(1.0) as u64;

    let mut t = t0;
    let mut y = *y0;
    for k in 1..=steps {
        let remaining = tf - t;
        let h = direction * step_s.min(remaining.abs());
        y = rk4_step(system, t, &y, h)?;
        t = if k == steps { tf } else { t + h };
        if !state::is_finite(&y) {
            return Err(IntegrationError::NonFiniteState { epoch_s: t });
        }
        samples.push((t, y));
    }
    debug!("rk4 integrated {span:.3} s in {steps} steps");
    Ok(())
}

fn rk4_step<S: OdeSystem + ?Sized>(
    system: &S,
    t: f64,
    y: &State6,
    h: f64,
) -> Result<State6, IntegrationError> {
    let k1 = system.derivative(t, y)?;
    let k2 = system.derivative(t + h / 2.0, &axpy(y, h / 2.0, &k1))?;
    let k3 = system.derivative(t + h / 2.0, &axpy(y, h / 2.0, &k2))?;
    let k4 = system.derivative(t + h, &axpy(y, h, &k3))?;

    let mut next = *y;
    for i in 0..6 {
        next[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    Ok(next)
}

fn rkf78_adaptive<S: OdeSystem + ?Sized>(
    system: &S,
    settings: &IntegratorSettings,
    t0: f64,
    y0: &State6,
    tf: f64,
    samples: &mut Vec<(f64, State6)>,
) -> Result<(), IntegrationError> {
    let IntegratorSettings::RungeKuttaFehlberg78 {
        initial_step_s,
        min_step_s,
        max_step_s,
        relative_tolerance,
        absolute_tolerance,
        max_steps,
    } = *settings
    else {
        return Err(IntegrationError::InvalidSettings(
            "rkf78 integration requires rkf78 settings".into(),
        ));
    };

    let direction = (tf - t0).signum();
    let mut t = t0;
    let mut y = *y0;
    let mut h = initial_step_s.clamp(min_step_s, max_step_s) * direction;
    let mut attempts: u64 = 0;
    let mut rejected: u64 = 0;

    while (tf - t) * direction > 0.0 {
        let remaining = tf - t;
        let last = h.abs() >= remaining.abs();
        if last {
            h = remaining;
        }

        attempts += 1;
        if attempts > max_steps {
            return Err(IntegrationError::MaxStepsExceeded { max_steps });
        }

        let (candidate, error) =
            rkf78_step(system, t, &y, h, relative_tolerance, absolute_tolerance)?;
        if !(error.is_finite() && state::is_finite(&candidate)) {
            return Err(IntegrationError::NonFiniteState { epoch_s: t + h });
        }

        if error <= 1.0 {
            t = if last { tf } else { t + h };
            y = candidate;
            samples.push((t, y));
        } else {
            rejected += 1;
            if h.abs() <= min_step_s {
                return Err(IntegrationError::StepSizeTooSmall {
                    epoch_s: t,
                    step_s: h.abs(),
                });
            }
        }

        let factor = if error == 0.0 {
            5.0
        } else {
            (0.9 * error.powf(-1.0 / 8.0)).clamp(0.2, 5.0)
        };
        h = (h.abs() * factor).clamp(min_step_s, max_step_s) * direction;
    }

    debug!(
        "rkf78 integrated {:.3} s: {} accepted, {} rejected steps",
        tf - t0,
        attempts - rejected,
        rejected
    );
    Ok(())
}

/// One embedded step; returns the eighth-order solution and the scaled error norm.
fn rkf78_step<S: OdeSystem + ?Sized>(
    system: &S,
    t: f64,
    y: &State6,
    h: f64,
    relative_tolerance: f64,
    absolute_tolerance: f64,
) -> Result<(State6, f64), IntegrationError> {
    let mut k = [[0.0; 6]; STAGES];
    for stage in 0..STAGES {
        let mut trial = *y;
        for (j, kj) in k.iter().enumerate().take(stage) {
            let a = A[stage][j];
            if a != 0.0 {
                for i in 0..6 {
                    trial[i] += h * a * kj[i];
                }
            }
        }
        k[stage] = system.derivative(t + C[stage] * h, &trial)?;
    }

    let mut next = *y;
    let mut error = 0.0_f64;
    for i in 0..6 {
        let mut increment = 0.0;
        let mut estimate = 0.0;
        for stage in 0..STAGES {
            increment += B[stage] * k[stage][i];
            estimate += B_ERR[stage] * k[stage][i];
        }
        next[i] += h * increment;
        let scale = absolute_tolerance + relative_tolerance * y[i].abs().max(next[i].abs());
        error = error.max((h * estimate).abs() / scale);
    }
    Ok((next, error))
}

fn axpy(y: &State6, a: f64, x: &State6) -> State6 {
    let mut out = *y;
    for i in 0..6 {
        out[i] += a * x[i];
    }
    out
}
