use std::path::PathBuf;

/// Errors that can occur while resolving or loading a declaration.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The reference could not be resolved to an existing location.
    #[error("failed to resolve '{reference}': {source}")]
    Resolve {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    /// The resolved file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is larger than the configured limit.
    #[error("declaration too large ({size} bytes, max {max}): {}", path.display())]
    TooLarge { path: PathBuf, size: u64, max: usize },

    /// The reference names a symlink and symlinks are not allowed.
    #[error("refusing to load declaration symlink: {}", path.display())]
    Symlink { path: PathBuf },

    /// The file changed identity between resolution and open.
    #[error("declaration changed during load: {}", path.display())]
    Changed { path: PathBuf },

    /// The content is not valid in its detected format.
    #[error("failed to parse {} as {format}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    /// The content matches no recognized declaration format.
    #[error("unrecognized declaration format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
}

impl SourceError {
    /// True for failures to locate or read the referenced content.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            SourceError::Resolve { .. }
                | SourceError::Read { .. }
                | SourceError::TooLarge { .. }
                | SourceError::Symlink { .. }
                | SourceError::Changed { .. }
        )
    }

    /// True when content was read but could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            SourceError::Parse { .. } | SourceError::UnsupportedFormat { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
