//! Trajectory-side building blocks of the comparison: the leg layout table, the
//! mission description and the patched-conic evaluator that turns a packed
//! parameter vector into boundary points.

pub mod layout;
pub mod mission;
pub mod patched;

pub use layout::{
    DSM_BLOCK_LEN, LayoutError, LegSlot, LegType, TrajectoryLayout, check_leg_order,
    legs_including_dsm, split_leg_duration,
};
pub use mission::MissionDescription;
pub use patched::{
    BoundaryKind, LegBoundary, PatchedConicEvaluator, PatchedConicSolution, TrajectoryError,
    TrajectoryEvaluator,
};
