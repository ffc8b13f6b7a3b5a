//! Parameters structure for GaitCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::input::{ClassifierParams, JoystickMode};
use crate::kinematics::LegGeometry;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Gait control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Dimensions shared by all legs.
    #[serde(default)]
    pub geometry: LegGeometry,

    /// Name of the gait loaded at startup.
    pub default_gait: String,

    /// The available gaits, in switching order.
    #[serde(default)]
    pub gaits: GaitTable,

    /// How analog axes are turned into directions.
    #[serde(default)]
    pub joystick_mode: JoystickMode,

    /// Thresholds for the analog classifier.
    #[serde(default)]
    pub classifier: ClassifierParams,

    /// Move duration hint used when returning to the rest pose on a reset request.
    ///
    /// Units: milliseconds
    pub reset_dur_ms: u32,

    /// Move duration hint used when settling into a newly loaded gait's rest pose.
    ///
    /// Units: milliseconds
    pub switch_gait_dur_ms: u32,
}

/// The shape of one gait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitParams {
    /// How the legs are phased against each other.
    pub kind: PatternKind,

    /// Foot position at rest, which is also the centre of the stride.
    ///
    /// Units: millimeters
    pub x0: f64,
    pub y0: f64,

    /// Horizontal length of a full stride.
    ///
    /// Units: millimeters
    pub x_range: f64,

    /// Peak height the foot is lifted by during the swing.
    ///
    /// Units: millimeters
    pub y_range_lift: f64,

    /// Peak depth the foot is pushed down by during the stance.
    ///
    /// Units: millimeters
    pub y_range_stance: f64,

    /// Number of samples in the lift (swing) phase.
    pub s1: usize,

    /// Number of samples in the stance phase.
    pub s2: usize,
}

/// A gait with its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedGait {
    pub name: String,

    #[serde(flatten)]
    pub params: GaitParams,
}

/// Ordered table of named gaits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GaitTable(pub Vec<NamedGait>);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The leg phasing pattern of a gait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Diagonal pairs in phase, pairs half a cycle apart.
    Trot,

    /// Each leg a quarter cycle behind the previous one.
    Walk,

    /// Front pair and back pair a quarter cycle apart.
    Bound,

    /// All legs in phase.
    Pronk,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GaitParams {
    /// Number of samples in one full cycle.
    pub fn cycle_len(&self) -> usize {
        self.s1 + self.s2
    }

    /// The foot position the legs rest at for this gait.
    pub fn rest_pose(&self) -> (f64, f64) {
        (self.x0, self.y0)
    }
}

impl GaitTable {
    pub fn get(&self, name: &str) -> Option<&GaitParams> {
        self.0.iter().find(|g| g.name == name).map(|g| &g.params)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|g| g.name.as_str()).collect()
    }

    /// The gait after `name` in table order, wrapping at the end.
    ///
    /// If `name` isn't in the table the first gait is returned.
    pub fn next_after(&self, name: &str) -> Option<&str> {
        let idx = match self.0.iter().position(|g| g.name == name) {
            Some(i) => (i + 1) % self.0.len(),
            None => 0,
        };

        self.0.get(idx).map(|g| g.name.as_str())
    }
}

impl Default for GaitTable {
    /// The built-in gaits.
    fn default() -> Self {
        use PatternKind::*;

        let gait = |name: &str, kind, x0, y0, x_range, y_range_lift, y_range_stance, s1, s2| {
            NamedGait {
                name: name.to_string(),
                params: GaitParams {
                    kind,
                    x0,
                    y0,
                    x_range,
                    y_range_lift,
                    y_range_stance,
                    s1,
                    s2,
                },
            }
        };

        GaitTable(vec![
            gait("TROT", Trot, 9.75, 43.36, 40.0, 20.0, 0.0, 15, 30),
            gait("TROT_HIGH", Trot, 9.75, 60.0, 20.0, 10.0, 0.0, 15, 30),
            gait("TROT_LOW", Trot, 9.75, 25.0, 20.0, 10.0, 0.0, 15, 30),
            gait("TROT_FAST", Trot, 9.75, 43.36, 50.0, 20.0, 0.0, 12, 24),
            gait("WALK", Walk, 9.75, 43.36, 30.0, 20.0, 0.0, 20, 140),
            gait("BOUND", Bound, 9.75, 33.36, 40.0, 0.0, 20.0, 50, 10),
            gait("PRONK", Pronk, 9.75, 33.36, 40.0, 0.0, 20.0, 60, 10),
        ])
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            geometry: LegGeometry::default(),
            default_gait: "TROT".to_string(),
            gaits: GaitTable::default(),
            joystick_mode: JoystickMode::default(),
            classifier: ClassifierParams::default(),
            reset_dur_ms: 500,
            switch_gait_dur_ms: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
