//! # Mechanisms Equipment Commands
//!
//! Joint-angle demands sent to the leg actuators. Each leg is driven by a pair of motors sharing a
//! fixed-width base, so a leg's demand is a pair of angles `(q1, q2)` and the whole robot's demand
//! is a frame of four such pairs.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Write;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of legs on the robot.
pub const NUM_LEGS: usize = 4;

/// The number of actuators on the robot (two per leg).
pub const NUM_ACTS: usize = 2 * NUM_LEGS;

/// Controller command ID for a plain position move.
const CMD_ID_MOVE: u8 = 0;

/// Controller command ID for a battery query.
const CMD_ID_BATTERY: u8 = 1;

/// Controller command ID for the on-board jump routine.
const CMD_ID_JUMP: u8 = 2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The angles of the two motors of one leg.
///
/// Units: degrees
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct JointAngles {
    /// Angle of the left (outer) motor.
    pub q1_deg: f64,

    /// Angle of the right (inner) motor.
    pub q2_deg: f64,
}

/// Joint angles for all legs, in the fixed order FL, FR, BL, BR.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct JointFrame(pub [JointAngles; NUM_LEGS]);

/// Demands that are sent to the actuation side once per cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MechDems {
    /// The demanded joint angles.
    pub frame: JointFrame,

    /// Hint for how long the move should take. Zero means move immediately.
    ///
    /// Units: milliseconds
    pub dur_ms: u32,

    /// Whether the actuation side should record this movement.
    pub record: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the legs, in frame order.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone, PartialOrd, Ord)]
pub enum LegId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

/// Special (non-position) commands understood by the robot controller.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum CtrlCmd {
    /// Energise all motors.
    EnableTorque,

    /// Release all motors.
    DisableTorque,

    /// Ask the robot to report its battery level.
    CheckBattery,

    /// Run the robot's on-board jump routine.
    Jump,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl JointAngles {
    pub fn new(q1_deg: f64, q2_deg: f64) -> Self {
        Self { q1_deg, q2_deg }
    }

    /// True if both angles are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.q1_deg.is_finite() && self.q2_deg.is_finite()
    }
}

impl LegId {
    /// Index of this leg inside a [`JointFrame`].
    pub fn index(&self) -> usize {
        match self {
            LegId::FrontLeft => 0,
            LegId::FrontRight => 1,
            LegId::BackLeft => 2,
            LegId::BackRight => 3,
        }
    }
}

impl JointFrame {
    /// Build a frame with the same leg pose on every leg.
    pub fn mirrored(angles: JointAngles) -> Self {
        Self([angles; NUM_LEGS])
    }

    /// Get the angles of one leg.
    pub fn leg(&self, id: LegId) -> JointAngles {
        self.0[id.index()]
    }

    /// Flatten into `[q1_fl, q2_fl, q1_fr, q2_fr, q1_bl, q2_bl, q1_br, q2_br]`.
    pub fn to_flat(&self) -> [f64; NUM_ACTS] {
        let mut flat = [0f64; NUM_ACTS];

        for (i, leg) in self.0.iter().enumerate() {
            flat[2 * i] = leg.q1_deg;
            flat[2 * i + 1] = leg.q2_deg;
        }

        flat
    }
}

impl MechDems {
    /// Render the demands in the controller's text protocol:
    /// `q1,q2,...,q8,0,<dur_ms>,<torque>;`
    pub fn to_ctrl_string(&self, torque_on: bool) -> String {
        let mut s = String::new();

        for q in self.frame.to_flat().iter() {
            // Writing into a String can't fail
            write!(s, "{:.1},", q).ok();
        }

        write!(s, "{},{},{};", CMD_ID_MOVE, self.dur_ms, torque_on as u8).ok();

        s
    }
}

impl CtrlCmd {
    /// Render the command in the controller's text protocol.
    ///
    /// Special commands carry zeroed joint fields and a zero move duration.
    pub fn to_ctrl_string(&self) -> String {
        let (cmd_id, torque) = match self {
            CtrlCmd::EnableTorque => (CMD_ID_MOVE, 1),
            CtrlCmd::DisableTorque => (CMD_ID_MOVE, 0),
            CtrlCmd::CheckBattery => (CMD_ID_BATTERY, 0),
            CtrlCmd::Jump => (CMD_ID_JUMP, 0),
        };

        format!("{}{},0,{};", "0,".repeat(NUM_ACTS), cmd_id, torque)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ctrl_strings() {
        assert_eq!(
            CtrlCmd::EnableTorque.to_ctrl_string(),
            "0,0,0,0,0,0,0,0,0,0,1;"
        );
        assert_eq!(
            CtrlCmd::DisableTorque.to_ctrl_string(),
            "0,0,0,0,0,0,0,0,0,0,0;"
        );
        assert_eq!(
            CtrlCmd::CheckBattery.to_ctrl_string(),
            "0,0,0,0,0,0,0,0,1,0,0;"
        );
        assert_eq!(CtrlCmd::Jump.to_ctrl_string(), "0,0,0,0,0,0,0,0,2,0,0;");

        let dems = MechDems {
            frame: JointFrame::mirrored(JointAngles::new(45.0, 135.24)),
            dur_ms: 500,
            record: false,
        };
        assert_eq!(
            dems.to_ctrl_string(true),
            "45.0,135.2,45.0,135.2,45.0,135.2,45.0,135.2,0,500,1;"
        );
    }

    #[test]
    fn test_frame_order() {
        let mut frame = JointFrame::default();
        frame.0[LegId::BackLeft.index()] = JointAngles::new(1.0, 2.0);

        assert_eq!(frame.leg(LegId::BackLeft), JointAngles::new(1.0, 2.0));
        assert_eq!(frame.to_flat()[4], 1.0);
        assert_eq!(frame.to_flat()[5], 2.0);
    }
}
