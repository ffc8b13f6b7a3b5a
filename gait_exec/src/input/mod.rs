//! # Input classification module
//!
//! Turns raw operator input (a pair of analog axes, or the set of pressed keys) into a direction
//! symbol for gait control and a list of requested actions.
//!
//! Axis conventions: negative horizontal is left, negative vertical is forward.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::{Action, DirectionSymbol, Heading, Key, Side, Tc, TurnTier};
use serde::{Deserialize, Serialize};
use util::maths::clamp;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Movement keys in priority order.
const MOVEMENT_KEYS: [(Key, DirectionSymbol); 6] = [
    (Key::W, DirectionSymbol::Forward),
    (Key::S, DirectionSymbol::Backward),
    (Key::A, DirectionSymbol::Left),
    (Key::D, DirectionSymbol::Right),
    (Key::Q, DirectionSymbol::ForwardLeft(TurnTier::ThreeQuarter)),
    (Key::E, DirectionSymbol::ForwardRight(TurnTier::ThreeQuarter)),
];

/// Action keys in priority order.
const ACTION_KEYS: [(Key, Action); 8] = [
    (Key::R, Action::Reset),
    (Key::J, Action::Jump),
    (Key::G, Action::SwitchGait),
    (Key::B, Action::Battery),
    (Key::Z, Action::Record),
    (Key::C, Action::ShowRange),
    (Key::H, Action::Greet),
    (Key::Escape, Action::Exit),
];

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Thresholds used by the analog classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Axis magnitudes below this are treated as zero.
    pub deadzone: f64,

    /// Minimum horizontal magnitude for a turn on the spot.
    pub spin_min_horizontal: f64,

    /// Maximum vertical magnitude for a turn on the spot.
    pub spin_max_vertical: f64,

    /// Horizontal magnitude at which a travelling turn becomes a three-quarter turn.
    pub three_quarter_min_horizontal: f64,

    /// Horizontal magnitude at which a travelling turn becomes a half turn.
    pub half_min_horizontal: f64,
}

/// Classified operator input for one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    /// The requested direction, `None` if no movement is requested.
    pub direction: Option<DirectionSymbol>,

    /// Requested actions in priority order.
    pub actions: Vec<Action>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// How analog axes are turned into directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoystickMode {
    /// Graduated turns from the full analog range.
    Analog,

    /// Only the four plain directions.
    Binary,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            deadzone: 0.1,
            spin_min_horizontal: 0.85,
            spin_max_vertical: 0.4,
            three_quarter_min_horizontal: 0.25,
            half_min_horizontal: 0.6,
        }
    }
}

impl Default for JoystickMode {
    fn default() -> Self {
        JoystickMode::Analog
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Zero an axis value whose magnitude is below the threshold.
pub fn deadzone(value: f64, threshold: f64) -> f64 {
    if value.abs() < threshold {
        0.0
    } else {
        value
    }
}

/// Classify a pair of (already deadzoned) analog axes with the default thresholds.
pub fn classify(horizontal: f64, vertical: f64) -> Option<DirectionSymbol> {
    classify_with(&ClassifierParams::default(), horizontal, vertical)
}

/// Classify a pair of (already deadzoned) analog axes.
///
/// - Both axes zero is no movement.
/// - A strong horizontal input with a weak vertical one is a turn on the spot.
/// - A dominant vertical input is straight travel, turning towards the horizontal input with a
///   tier given by its magnitude.
/// - Anything else is a turn on the spot.
pub fn classify_with(
    params: &ClassifierParams,
    horizontal: f64,
    vertical: f64,
) -> Option<DirectionSymbol> {
    if horizontal == 0.0 && vertical == 0.0 {
        return None;
    }

    let (abs_h, abs_v) = (horizontal.abs(), vertical.abs());
    let side = if horizontal < 0.0 { Side::Left } else { Side::Right };

    if abs_h >= params.spin_min_horizontal && abs_v <= params.spin_max_vertical {
        return Some(DirectionSymbol::spin(side));
    }

    if abs_v > abs_h {
        let heading = if vertical < 0.0 {
            Heading::Forward
        } else {
            Heading::Backward
        };

        let dir = if abs_h < params.three_quarter_min_horizontal {
            DirectionSymbol::straight(heading)
        } else if abs_h < params.half_min_horizontal {
            DirectionSymbol::turn(heading, side, TurnTier::ThreeQuarter)
        } else {
            DirectionSymbol::turn(heading, side, TurnTier::Half)
        };

        return Some(dir);
    }

    Some(DirectionSymbol::spin(side))
}

/// Classify a pair of (already deadzoned) axes into the four plain directions only.
///
/// Any vertical input wins over horizontal input.
pub fn classify_binary(horizontal: f64, vertical: f64) -> Option<DirectionSymbol> {
    if vertical < 0.0 {
        Some(DirectionSymbol::Forward)
    } else if vertical > 0.0 {
        Some(DirectionSymbol::Backward)
    } else if horizontal < 0.0 {
        Some(DirectionSymbol::Left)
    } else if horizontal > 0.0 {
        Some(DirectionSymbol::Right)
    } else {
        None
    }
}

/// The direction of the highest priority pressed movement key.
pub fn classify_keys(keys: &[Key]) -> Option<DirectionSymbol> {
    MOVEMENT_KEYS
        .iter()
        .find(|(k, _)| keys.contains(k))
        .map(|(_, d)| *d)
}

/// The actions of all pressed action keys, in priority order.
pub fn actions_from_keys(keys: &[Key]) -> Vec<Action> {
    ACTION_KEYS
        .iter()
        .filter(|(k, _)| keys.contains(k))
        .map(|(_, a)| *a)
        .collect()
}

/// Classify one input command.
pub fn classify_tc(tc: &Tc, params: &ClassifierParams, mode: JoystickMode) -> Classified {
    match tc {
        Tc::None => Classified::default(),
        Tc::Axes {
            horizontal,
            vertical,
        } => {
            let h = deadzone(clamp(*horizontal, -1.0, 1.0), params.deadzone);
            let v = deadzone(clamp(*vertical, -1.0, 1.0), params.deadzone);

            let direction = match mode {
                JoystickMode::Analog => classify_with(params, h, v),
                JoystickMode::Binary => classify_binary(h, v),
            };

            Classified {
                direction,
                actions: vec![],
            }
        }
        Tc::Keys(keys) => Classified {
            direction: classify_keys(keys),
            actions: actions_from_keys(keys),
        },
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use DirectionSymbol::*;
    use TurnTier::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(0.0, 0.0), None);
        assert_eq!(classify(0.0, -1.0), Some(Forward));
        assert_eq!(classify(0.0, 1.0), Some(Backward));
        assert_eq!(classify(-0.5, -1.0), Some(ForwardLeft(ThreeQuarter)));
        assert_eq!(classify(-0.9, -1.0), Some(ForwardLeft(Half)));
        assert_eq!(classify(-1.0, 0.0), Some(Left));
        assert_eq!(classify(1.0, 0.0), Some(Right));

        // Tier boundaries are inclusive at the lower end
        assert_eq!(classify(-0.25, -1.0), Some(ForwardLeft(ThreeQuarter)));
        assert_eq!(classify(0.6, 1.0), Some(BackwardRight(Half)));
        assert_eq!(classify(0.24, 1.0), Some(Backward));
    }

    #[test]
    fn test_classify_spin_window() {
        // Strong horizontal but too much vertical for a spin, vertical dominant
        assert_eq!(classify(-0.9, -0.95), Some(ForwardLeft(Half)));

        // Horizontal dominant outside the spin window is still a spin
        assert_eq!(classify(0.7, 0.5), Some(Right));
        assert_eq!(classify(-0.85, 0.4), Some(Left));

        // Equal magnitudes are horizontal dominant
        assert_eq!(classify(0.5, -0.5), Some(Right));
    }

    #[test]
    fn test_deadzone() {
        assert_eq!(deadzone(0.05, 0.1), 0.0);
        assert_eq!(deadzone(-0.1, 0.1), -0.1);
        assert_eq!(deadzone(0.8, 0.1), 0.8);

        let params = ClassifierParams::default();
        assert_eq!(
            classify_tc(
                &Tc::Axes {
                    horizontal: 0.05,
                    vertical: -0.08
                },
                &params,
                JoystickMode::Analog
            ),
            Classified::default()
        );
    }

    #[test]
    fn test_classify_binary() {
        assert_eq!(classify_binary(-1.0, -0.2), Some(Forward));
        assert_eq!(classify_binary(-1.0, 0.2), Some(Backward));
        assert_eq!(classify_binary(-0.3, 0.0), Some(Left));
        assert_eq!(classify_binary(0.3, 0.0), Some(Right));
        assert_eq!(classify_binary(0.0, 0.0), None);

        let params = ClassifierParams::default();
        let tc = Tc::Axes {
            horizontal: -0.5,
            vertical: -1.0,
        };
        assert_eq!(
            classify_tc(&tc, &params, JoystickMode::Binary).direction,
            Some(Forward)
        );
        assert_eq!(
            classify_tc(&tc, &params, JoystickMode::Analog).direction,
            Some(ForwardLeft(ThreeQuarter))
        );

        // Out of range axes are clamped before classifying
        let wild = Tc::Axes {
            horizontal: -3.0,
            vertical: 0.2,
        };
        assert_eq!(
            classify_tc(&wild, &params, JoystickMode::Analog).direction,
            Some(Left)
        );
    }

    #[test]
    fn test_keys() {
        assert_eq!(classify_keys(&[]), None);
        assert_eq!(classify_keys(&[Key::D, Key::W]), Some(Forward));
        assert_eq!(classify_keys(&[Key::Q, Key::A]), Some(Left));
        assert_eq!(classify_keys(&[Key::E]), Some(ForwardRight(ThreeQuarter)));
        assert_eq!(classify_keys(&[Key::G]), None);

        assert_eq!(
            actions_from_keys(&[Key::Escape, Key::G, Key::W]),
            vec![Action::SwitchGait, Action::Exit]
        );

        let c = classify_tc(
            &Tc::Keys(vec![Key::S, Key::Z]),
            &ClassifierParams::default(),
            JoystickMode::Analog,
        );
        assert_eq!(c.direction, Some(Backward));
        assert_eq!(c.actions, vec![Action::Record]);
    }
}
