//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the software root directory.
///
/// The root directory is the checkout of this repository, and is used to
/// locate the `params` and `sessions` directories.
pub const SW_ROOT_ENV_VAR: &str = "DDROVER_SW_ROOT";

/// Get the software root directory from the environment.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
