//! Host platform (linux for example) utility functions

use std::env;
use std::path::PathBuf;

/// Environment variable naming the root directory of the software checkout.
pub const SW_ROOT_ENV_VAR: &str = "Q8_SW_ROOT";

/// Get the software root directory from the `Q8_SW_ROOT` environment variable.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
