//! Gait control module
//!
//! Turns the operator's requested direction into a stream of joint-angle frames. Single-leg
//! stride cycles are generated from the gait's shape parameters (`leg_cycle`), combined into
//! whole-robot trajectories per direction (`stacker`), and played back one frame per cycle by the
//! `GaitManager`. `GaitCtrl` wraps the manager as a cyclic module.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod leg_cycle;
mod manager;
mod params;
mod stacker;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::tc::{DirectionSymbol, TurnTier};

// Internal
pub use leg_cycle::*;
pub use manager::*;
pub use params::*;
pub use stacker::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Lowest height the foot may be lifted to, measured from the motor axes.
///
/// Units: millimeters
pub const MIN_LIFT_HEIGHT_MM: f64 = 5.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while generating trajectories.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum GenError {
    #[error(
        "Lifting {} mm from a height of {} mm would bring the foot closer than {} mm to the body",
        .y_range_lift,
        .y0,
        MIN_LIFT_HEIGHT_MM
    )]
    BelowPhysicalLimit { y0: f64, y_range_lift: f64 },

    #[error("No feasible leg cycle found at stride scale {0}, even after shrinking the ranges")]
    Infeasible(f64),

    #[error("Lift and stance step counts must both be non-zero, found {s1} and {s2}")]
    InvalidStepCounts { s1: usize, s2: usize },

    #[error("Trajectory for {0} needs a {1:?} {2:?} leg cycle which was not generated")]
    MissingCycle(DirectionSymbol, Stride, TurnTier),
}

/// Errors raised by the `GaitManager`.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum GaitMgrError {
    #[error("There is no gait named {0:?}")]
    UnknownGait(String),

    #[error("Failed to load gait {0:?}, keeping the previous gait: {1}")]
    GaitLoadFailed(String, GenError),

    #[error("Direction {0} (and its fallbacks) is not supported by the current gait")]
    DirectionUnsupported(DirectionSymbol),

    #[error("No gait has been loaded")]
    NoGaitLoaded,

    #[error("Cannot tick the gait while not moving")]
    NotMoving,
}

/// Possible errors that can occur during GaitCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum GaitCtrlError {
    #[error("Could not load the GaitCtrl parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not set up the GaitCtrl archives: {0}")]
    ArchiveInitError(String),

    #[error("Could not load the default gait: {0}")]
    DefaultGaitError(GaitMgrError),

    #[error("Gait manager error: {0}")]
    MgrError(GaitMgrError),
}
