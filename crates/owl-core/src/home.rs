//! Canonical home directory resolution for owl
//!
//! # Precedence
//!
//! 1. `OWL_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! Integration tests set `OWL_HOME` to a temporary directory so that no
//! user-level settings leak into them.

use anyhow::Result;
use std::path::PathBuf;

/// Get the home directory used to locate launcher settings
///
/// # Errors
///
/// Returns an error if `OWL_HOME` is unset and the platform home directory
/// cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("OWL_HOME") {
        let trimmed = home.trim_end_matches(['/', '\\']);
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}
