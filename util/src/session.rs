//! Session management
//!
//! A session is one run of an executable. It owns a timestamped directory under the software root
//! holding the run's log file and its archives, and fixes the epoch that all elapsed times are
//! measured from.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A chrono format string which diplays a timestamp. See
/// https://docs.rs/chrono/0.4.11/chrono/format/strftime/index.html for more
/// information.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A struct storing information about the current session
#[derive(Clone, Debug)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The root directory for this session's archives
    pub arch_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable ({}) is not set", crate::host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error(
        "Cannot initialise the session epoch, have you already initialised the \
         session? (conquer_once error: {0})"
    )]
    CannotInitEpoch(conquer_once::TryInitError),

    #[error("Cannot get the epoch time, did you forget to initialise the session?")]
    CannotGetEpoch,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session within the given directory.
    ///
    /// This will create a new session directory named `{exec_name}_{timestamp}` inside
    /// `$Q8_SW_ROOT/{sessions_dir}`.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let root = crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;

        Self::new_in(root.join(sessions_dir), exec_name)
    }

    /// Start a new session inside an explicit parent directory.
    pub fn new_in<P: AsRef<Path>>(parent: P, exec_name: &str) -> Result<Self, SessionError> {
        // Set the session epoch
        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(SessionError::CannotInitEpoch)?;

        // Format the session epoch as a timestamp
        let timestamp = get_epoch()
            .ok_or(SessionError::CannotGetEpoch)?
            .format(TIMESTAMP_FORMAT);

        let session_root = parent
            .as_ref()
            .join(format!("{}_{}", exec_name, timestamp));
        let arch_root = session_root.join("arch");

        // Creating the archive dir also creates the session root
        fs::create_dir_all(&arch_root).map_err(SessionError::CannotCreateDir)?;

        let log_file_path = session_root.join(format!("{}.log", exec_name));

        Ok(Session {
            session_root,
            arch_root,
            log_file_path,
        })
    }

    /// Create (if needed) a subdirectory of the archive root and return its path.
    pub fn arch_subdir<P: AsRef<Path>>(&self, sub: P) -> Result<PathBuf, SessionError> {
        let path = self.arch_root.join(sub);

        fs::create_dir_all(&path).map_err(SessionError::CannotCreateDir)?;

        Ok(path)
    }

    /// Exit the session.
    pub fn exit(self) {
        info!(
            "Session ended after {:.3} s, data in {:?}",
            get_elapsed_seconds(),
            self.session_root
        );
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session.
///
/// Returns `NaN` if no session has been started yet.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(e) => time::duration_to_seconds(Utc::now() - *e).unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

/// Return a reference to the session's epoch, or `None` if no session has been started yet.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_session_dirs() {
        let parent = std::env::temp_dir().join("q8_util_session_test");

        // The epoch can only be set once per process, so only one session may be created here.
        let session = Session::new_in(&parent, "test").unwrap();

        assert!(session.arch_root.is_dir());
        assert!(session.arch_root.starts_with(&session.session_root));
        assert_eq!(
            session.log_file_path.extension().and_then(|e| e.to_str()),
            Some("log")
        );

        let sub = session.arch_subdir("gait_ctrl").unwrap();
        assert!(sub.is_dir());

        assert!(get_epoch().is_some());
        assert!(get_elapsed_seconds() >= 0.0);

        assert!(matches!(
            Session::new_in(&parent, "test"),
            Err(SessionError::CannotInitEpoch(_))
        ));

        std::fs::remove_dir_all(&parent).ok();
    }
}
