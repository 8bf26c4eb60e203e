//! Binary path resolution and validation utilities.
//!
//! Used to locate the emulation platform's executables (`mn`) before a
//! launch, so a missing installation is reported up front instead of as a
//! failed spawn halfway through startup.

use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Errors that can occur during binary resolution or validation
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    #[error("Binary not found: {path}")]
    NotFound { path: String },

    #[error("Binary is not executable: {path}")]
    NotExecutable { path: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("'{name}' was not found in PATH")]
    NotInPath { name: String },
}

/// Get the user's home directory from the HOME environment variable
fn get_home_dir() -> Result<PathBuf, BinaryError> {
    env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| BinaryError::NoHomeDir)
}

/// Resolve a binary from a bare name or an explicit path.
///
/// Resolution rules:
/// 1. If the value contains `/` or starts with `~`: treat as explicit path
///    (`~` expands to the home directory)
/// 2. Otherwise: search each directory of `search_path` in order
///
/// ```ignore
/// resolve_binary_path("mn", env::var_os("PATH")) -> /usr/local/bin/mn
/// resolve_binary_path("~/mininet/bin/mn", ..)   -> /home/user/mininet/bin/mn
/// resolve_binary_path("/opt/mininet/mn", ..)     -> /opt/mininet/mn
/// ```
pub fn resolve_binary_path(
    name_or_path: &str,
    search_path: Option<std::ffi::OsString>,
) -> Result<PathBuf, BinaryError> {
    if let Some(rest) = name_or_path.strip_prefix('~') {
        let home_dir = get_home_dir()?;
        return Ok(home_dir.join(rest.trim_start_matches('/')));
    }
    if name_or_path.contains('/') {
        return Ok(PathBuf::from(name_or_path));
    }

    search_path
        .iter()
        .flat_map(env::split_paths)
        .map(|dir| dir.join(name_or_path))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| BinaryError::NotInPath {
            name: name_or_path.to_string(),
        })
}

/// Validate that a binary exists and is executable.
pub fn validate_binary(path: &Path) -> Result<(), BinaryError> {
    let metadata = path.metadata().map_err(|_| BinaryError::NotFound {
        path: path.display().to_string(),
    })?;

    // Check if file is executable (any execute bit set)
    if !metadata.is_file() || metadata.permissions().mode() & 0o111 == 0 {
        return Err(BinaryError::NotExecutable {
            path: path.display().to_string(),
        });
    }

    Ok(())
}

/// Resolve against the process `PATH` and validate in one step.
pub fn validate_binary_spec(name_or_path: &str) -> Result<PathBuf, BinaryError> {
    let resolved = resolve_binary_path(name_or_path, env::var_os("PATH"))?;
    validate_binary(&resolved)?;
    Ok(resolved)
}
