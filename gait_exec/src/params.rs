//! # Gait Executable Parameters
//!
//! This module provide parameters for the gait executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaitExecParams {
    /// Number of control cycles per second.
    ///
    /// Units: Hertz
    pub cycle_frequency_hz: f64,

    /// Write recorded frames to the session archives.
    pub archive_frames: bool,

    /// Number of consecutive cycle overruns after which the executable stops.
    pub max_consec_cycle_overruns: u64,
}

#[derive(Debug, Error, PartialEq)]
pub enum GaitExecParamsError {
    #[error("The cycle frequency must be a finite positive number of Hertz, found {0}")]
    InvalidCycleFrequency(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for GaitExecParams {
    fn default() -> Self {
        Self {
            cycle_frequency_hz: 200.0,
            archive_frames: false,
            max_consec_cycle_overruns: 500,
        }
    }
}

impl GaitExecParams {
    /// Check the parameters can drive the cycle loop.
    pub fn validate(&self) -> Result<(), GaitExecParamsError> {
        let f = self.cycle_frequency_hz;

        if f.is_finite() && f > 0.0 {
            Ok(())
        } else {
            Err(GaitExecParamsError::InvalidCycleFrequency(f))
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
