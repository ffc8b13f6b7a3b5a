//! # Input command module
//!
//! This module provides the operator input commands consumed by the gait control cycle. Input is
//! either a pair of analog axes, a set of pressed discrete keys, or nothing at all.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Direction symbols and actions understood by gait control.
pub mod gait_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
pub use gait_ctrl::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An input command, i.e. one poll of the operator's input device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tc {
    /// No input is active.
    None,

    /// Raw analog axis values in [-1, 1], before the deadzone is applied.
    ///
    /// Negative horizontal is left, negative vertical is forward.
    Axes { horizontal: f64, vertical: f64 },

    /// The set of currently pressed discrete keys.
    Keys(Vec<Key>),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Axis value {0} is outside [-1, 1]")]
    AxisOutOfRange(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        let tc: Tc = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        if let Tc::Axes {
            horizontal,
            vertical,
        } = tc
        {
            for v in [horizontal, vertical].iter() {
                if !(-1.0..=1.0).contains(v) {
                    return Err(TcParseError::AxisOutOfRange(*v));
                }
            }
        }

        Ok(tc)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_tc() {
        assert_eq!(Tc::from_json(r#"{"type": "NONE"}"#).unwrap(), Tc::None);

        assert_eq!(
            Tc::from_json(r#"{"type": "AXES", "payload": {"horizontal": -0.5, "vertical": -1.0}}"#)
                .unwrap(),
            Tc::Axes {
                horizontal: -0.5,
                vertical: -1.0
            }
        );

        assert_eq!(
            Tc::from_json(r#"{"type": "KEYS", "payload": ["W", "G"]}"#).unwrap(),
            Tc::Keys(vec![Key::W, Key::G])
        );

        assert!(matches!(
            Tc::from_json(r#"{"type": "AXES", "payload": {"horizontal": 1.5, "vertical": 0.0}}"#),
            Err(TcParseError::AxisOutOfRange(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "JUMP"}"#),
            Err(TcParseError::InvalidJson(_))
        ));
    }
}
