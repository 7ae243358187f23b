//! Time-indexed state histories produced by the analytic and numerical propagators.

use thiserror::Error;

use crate::state::State6;

#[derive(Debug, Error, PartialEq)]
pub enum HistoryError {
    #[error("epoch {epoch_s} s does not follow the previous epoch {previous_s} s")]
    NonIncreasingEpoch { epoch_s: f64, previous_s: f64 },
    #[error("epoch must be finite, got {0}")]
    NonFiniteEpoch(f64),
}

/// Ordered mapping from epoch (seconds, strictly increasing) to a Cartesian state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateHistory {
    epochs: Vec<f64>,
    states: Vec<State6>,
}

impl StateHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            epochs: Vec::with_capacity(capacity),
            states: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample; the epoch must be later than every epoch already stored.
    pub fn push(&mut self, epoch_s: f64, state: State6) -> Result<(), HistoryError> {
        if !epoch_s.is_finite() {
            return Err(HistoryError::NonFiniteEpoch(epoch_s));
        }
        if let Some(&previous_s) = self.epochs.last() {
            if epoch_s <= previous_s {
                return Err(HistoryError::NonIncreasingEpoch {
                    epoch_s,
                    previous_s,
                });
            }
        }
        self.epochs.push(epoch_s);
        self.states.push(state);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Sample at the minimum epoch.
    pub fn first(&self) -> Option<(f64, &State6)> {
        Some((*self.epochs.first()?, self.states.first()?))
    }

    /// Sample at the maximum epoch.
    pub fn last(&self) -> Option<(f64, &State6)> {
        Some((*self.epochs.last()?, self.states.last()?))
    }

    pub fn epochs(&self) -> &[f64] {
        &self.epochs
    }

    pub fn states(&self) -> &[State6] {
        &self.states
    }
}
