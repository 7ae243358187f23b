//! Patched-conic versus full-propagation fidelity analysis for multi-gravity-assist
//! trajectories.
//!
//! The member crates are re-exported here so front-ends (the `mga_compare` CLI,
//! integration tests) depend on a single package.

pub use mga_compare as compare;
pub use mga_config as config;
pub use mga_core as base;
pub use mga_ephem as ephem;
pub use mga_export as export;
pub use mga_impulsive as impulsive;
pub use mga_orbits as orbits;
pub use mga_propagator as propagator;
pub use mga_trajectory as trajectory;
