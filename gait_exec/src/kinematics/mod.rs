//! # Leg kinematics module
//!
//! Each leg is a closed five-bar linkage: two motors sit a fixed distance `d` apart on the body,
//! each drives an upper link, and the two lower links meet at the foot. Positions are expressed in
//! the leg's motor frame, with the q2 motor axis at the origin, the q1 motor axis at `(d, 0)` and
//! `y` growing away from the body.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod solver;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use solver::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Dimensions of one leg. All legs on the robot share the same geometry.
///
/// Units: millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegGeometry {
    /// Distance between the two motor axes.
    pub d: f64,

    /// Upper link driven by the q1 motor.
    pub l1: f64,

    /// Lower link attached to the q1 upper link.
    pub l2: f64,

    /// Upper link driven by the q2 motor.
    pub l1p: f64,

    /// Lower link attached to the q2 upper link.
    pub l2p: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors from the inverse kinematics solution.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq)]
pub enum IkError {
    #[error("Foot position ({0}, {1}) is outside the leg's workspace")]
    Unreachable(f64, f64),
}

/// Errors from the forward kinematics solution.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq)]
pub enum FkError {
    #[error("The linkage Jacobian is singular at the current estimate")]
    Singular,

    #[error("Forward kinematics did not converge within {0} iterations")]
    NotConverged(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for LegGeometry {
    fn default() -> Self {
        Self {
            d: 19.5,
            l1: 25.0,
            l2: 40.0,
            l1p: 25.0,
            l2p: 40.0,
        }
    }
}

impl LegGeometry {
    /// Horizontal position of the midpoint between the two motors.
    pub fn mid_x(&self) -> f64 {
        self.d / 2.0
    }

    /// The neutral standing position, two thirds of full extension below the motor midpoint.
    pub fn neutral_pose(&self) -> (f64, f64) {
        (
            self.mid_x(),
            util::maths::round_dp((self.l1 + self.l2) * 0.667, 2),
        )
    }
}
