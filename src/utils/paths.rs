//! Path Utilities
//!
//! Resolves the application directory (~/.spec-mentor/) and the files in it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Spec Mentor directory (~/.spec-mentor/)
pub fn spec_mentor_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".spec-mentor"))
}

/// Get the config file path (~/.spec-mentor/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(spec_mentor_dir()?.join("config.json"))
}

/// Get the local store path (~/.spec-mentor/store.json)
pub fn store_path() -> AppResult<PathBuf> {
    Ok(spec_mentor_dir()?.join("store.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensure the parent directory of a file exists
pub fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
