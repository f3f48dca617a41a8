//! File system helpers that attach the file's purpose to IO errors

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{GrowthVizError, Result};

/// Open an input file, naming what it is needed for in any error
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.is_file() {
        return Err(GrowthVizError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a readable file (needed for: {purpose})", path.display()),
        )));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "Permission denied - check file permissions",
            _ => "Failed to open file",
        };
        GrowthVizError::Io(io::Error::new(
            e.kind(),
            format!("{context}: {} ({purpose}): {e}", path.display()),
        ))
    })
}

/// Create a directory and its parents unless it already exists
pub fn ensure_directory(path: &Path, purpose: &str) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(GrowthVizError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists but is not a directory ({purpose})", path.display()),
        )));
    }
    fs::create_dir_all(path).map_err(|e| {
        GrowthVizError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create {} ({purpose}): {e}", path.display()),
        ))
    })
}
