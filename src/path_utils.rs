//! Path validation helpers

use std::path::{Path, PathBuf};

/// Validates that a path string is not empty or just whitespace
pub fn validate_path_str(path_str: &str) -> Result<(), String> {
    if path_str.trim().is_empty() {
        return Err("Path cannot be empty or contain only whitespace".to_string());
    }
    Ok(())
}

/// Joins `path` onto `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
