//! # Input script interpreter module
//!
//! This module provides an interpreter for input scripts, allowing operator input commands to be
//! replayed from a file instead of a live joystick or keyboard.
//!
//! A script is a list of `<time_s>: <json tc>;` entries, one per line. Anything else on a line
//! (comments for example) is ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
#[derive(Debug)]
struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The input command to release
    tc: Tc,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_tcs` to
/// acquire a list of commands that need executing.
#[derive(Debug)]
pub struct ScriptInterpreter {
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Could not build the script pattern: {0}")]
    PatternError(regex::Error),

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script timestamps must not decrease, found {1} s after {0} s")]
    OutOfOrder(f64, f64),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),
}

/// Result of polling the interpreter.
#[derive(Debug, PartialEq)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_str(&script)
    }

    /// Create a new interpreter from the script's contents.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        let mut cmds: VecDeque<Command> = VecDeque::new();

        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::PatternError)?;

        for cap in re.captures_iter(script) {
            let (time_str, payload) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(p)) => (t.as_str(), p.as_str()),
                _ => continue,
            };

            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(prev) = cmds.back() {
                if exec_time_s < prev.exec_time_s {
                    return Err(ScriptError::OutOfOrder(prev.exec_time_s, exec_time_s));
                }
            }

            let tc = Tc::from_json(payload).map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            cmds.push_back(Command { exec_time_s, tc });
        }

        if cmds.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter { cmds })
    }

    /// Return the TCs which are due at the current session time.
    pub fn get_pending_tcs(&mut self) -> PendingTcs {
        self.get_pending_tcs_at(get_elapsed_seconds())
    }

    /// Return the TCs which are due at the given time, in script order.
    pub fn get_pending_tcs_at(&mut self, current_time_s: f64) -> PendingTcs {
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript;
        }

        let mut tc_vec: Vec<Tc> = vec![];

        while let Some(front) = self.cmds.front() {
            if front.exec_time_s >= current_time_s {
                break;
            }
            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        } else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Get the number of TCs left in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
