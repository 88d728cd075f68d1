use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, SourceError};

const FILE_SCHEME: &str = "file://";

/// Join `reference` onto `directory` (or the working directory) without
/// touching the filesystem beyond reading the current directory.
///
/// Absolute references ignore `directory`. A `file://` prefix is accepted.
pub fn absolutize(reference: &str, directory: Option<&Path>) -> Result<PathBuf> {
    let trimmed = reference.trim();
    let trimmed = trimmed.strip_prefix(FILE_SCHEME).unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(SourceError::Resolve {
            reference: reference.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty reference"),
        });
    }

    absolutize_path(Path::new(trimmed), directory)
}

/// [`absolutize`] for a path that is already a filesystem path. The path is
/// used as is, so non UTF-8 names survive.
pub fn absolutize_path(path: &Path, directory: Option<&Path>) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    if path.as_os_str().is_empty() {
        return Err(SourceError::Resolve {
            reference: String::new(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty reference"),
        });
    }

    let reference = path.display().to_string();
    let base = match directory {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => current_dir(&reference)?.join(dir),
        None => current_dir(&reference)?,
    };
    Ok(base.join(path))
}

/// Resolve `reference` to a canonical absolute path that exists.
pub fn resolve_reference(reference: &str, directory: Option<&Path>) -> Result<PathBuf> {
    let joined = absolutize(reference, directory)?;
    std::fs::canonicalize(&joined).map_err(|source| SourceError::Resolve {
        reference: reference.to_string(),
        source,
    })
}

fn current_dir(reference: &str) -> Result<PathBuf> {
    std::env::current_dir().map_err(|source| SourceError::Resolve {
        reference: reference.to_string(),
        source,
    })
}
