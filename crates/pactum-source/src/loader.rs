use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::cache::DocumentCache;
use crate::config::LoaderConfig;
use crate::error::{Result, SourceError};
use crate::format::{parse_document, DocumentFormat};
use crate::resolve::{absolutize, absolutize_path};

/// A parsed declaration and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Canonical absolute path the content was read from.
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub content: Value,
}

/// Resolves references and reads declarations from disk.
#[derive(Debug, Default)]
pub struct SourceLoader {
    config: LoaderConfig,
    cache: Option<DocumentCache>,
}

impl SourceLoader {
    /// Create an uncached loader with default config.
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Create an uncached loader with explicit config.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    /// Create a loader that reuses parsed content until a file changes.
    pub fn cached(config: LoaderConfig) -> Self {
        Self {
            config,
            cache: Some(DocumentCache::new()),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&DocumentCache> {
        self.cache.as_ref()
    }

    /// Resolve `reference` against `directory` and load it.
    pub fn load(&self, reference: &str, directory: Option<&Path>) -> Result<Document> {
        let joined = absolutize(reference, directory)?;
        self.load_joined(joined, reference)
    }

    /// [`SourceLoader::load`] for a filesystem path.
    pub fn load_path(&self, path: &Path, directory: Option<&Path>) -> Result<Document> {
        let joined = absolutize_path(path, directory)?;
        self.load_joined(joined, &path.display().to_string())
    }

    fn load_joined(&self, joined: PathBuf, reference: &str) -> Result<Document> {
        let path_metadata =
            std::fs::symlink_metadata(&joined).map_err(|source| SourceError::Resolve {
                reference: reference.to_string(),
                source,
            })?;
        if path_metadata.file_type().is_symlink() && !self.config.allow_symlinks {
            return Err(SourceError::Symlink { path: joined });
        }

        let path = std::fs::canonicalize(&joined).map_err(|source| SourceError::Resolve {
            reference: reference.to_string(),
            source,
        })?;
        tracing::debug!(reference, path = %path.display(), "resolved declaration");

        let file = std::fs::File::open(&path).map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;
        let opened_metadata = file.metadata().map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;

        #[cfg(unix)]
        {
            if !self.config.allow_symlinks && !same_file_identity(&path_metadata, &opened_metadata)
            {
                return Err(SourceError::Changed { path });
            }
        }

        self.check_size(&path, opened_metadata.len())?;

        if let Some(cache) = &self.cache {
            if let Some((format, content)) = cache.get(&path, &opened_metadata) {
                return Ok(Document {
                    path,
                    format,
                    content,
                });
            }
        }

        let mut text = String::new();
        file.take(self.read_limit())
            .read_to_string(&mut text)
            .map_err(|source| SourceError::Read {
                path: path.clone(),
                source,
            })?;
        self.finish(path, &opened_metadata, &text)
    }

    /// Resolve `reference` against `directory` and load it without blocking
    /// the runtime thread.
    #[cfg(feature = "async")]
    pub async fn load_async(&self, reference: &str, directory: Option<&Path>) -> Result<Document> {
        let joined = absolutize(reference, directory)?;
        self.load_joined_async(joined, reference).await
    }

    /// [`SourceLoader::load_async`] for a filesystem path.
    #[cfg(feature = "async")]
    pub async fn load_path_async(&self, path: &Path, directory: Option<&Path>) -> Result<Document> {
        let joined = absolutize_path(path, directory)?;
        self.load_joined_async(joined, &path.display().to_string())
            .await
    }

    #[cfg(feature = "async")]
    async fn load_joined_async(&self, joined: PathBuf, reference: &str) -> Result<Document> {
        use tokio::io::AsyncReadExt;

        let path_metadata =
            tokio::fs::symlink_metadata(&joined)
                .await
                .map_err(|source| SourceError::Resolve {
                    reference: reference.to_string(),
                    source,
                })?;
        if path_metadata.file_type().is_symlink() && !self.config.allow_symlinks {
            return Err(SourceError::Symlink { path: joined });
        }

        let path = tokio::fs::canonicalize(&joined)
            .await
            .map_err(|source| SourceError::Resolve {
                reference: reference.to_string(),
                source,
            })?;
        tracing::debug!(reference, path = %path.display(), "resolved declaration");

        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|source| SourceError::Read {
                path: path.clone(),
                source,
            })?;
        let opened_metadata = file.metadata().await.map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;

        #[cfg(unix)]
        {
            if !self.config.allow_symlinks && !same_file_identity(&path_metadata, &opened_metadata)
            {
                return Err(SourceError::Changed { path });
            }
        }

        self.check_size(&path, opened_metadata.len())?;

        if let Some(cache) = &self.cache {
            if let Some((format, content)) = cache.get(&path, &opened_metadata) {
                return Ok(Document {
                    path,
                    format,
                    content,
                });
            }
        }

        let mut text = String::new();
        file.take(self.read_limit())
            .read_to_string(&mut text)
            .await
            .map_err(|source| SourceError::Read {
                path: path.clone(),
                source,
            })?;
        self.finish(path, &opened_metadata, &text)
    }

    fn check_size(&self, path: &Path, size: u64) -> Result<()> {
        if size > self.config.max_file_size as u64 {
            return Err(SourceError::TooLarge {
                path: path.to_path_buf(),
                size,
                max: self.config.max_file_size,
            });
        }
        Ok(())
    }

    fn read_limit(&self) -> u64 {
        u64::try_from(self.config.max_file_size.saturating_add(1)).unwrap_or(u64::MAX)
    }

    fn finish(
        &self,
        path: PathBuf,
        metadata: &std::fs::Metadata,
        text: &str,
    ) -> Result<Document> {
        // The file may have grown after the metadata check.
        if text.len() > self.config.max_file_size {
            return Err(SourceError::TooLarge {
                path,
                size: text.len() as u64,
                max: self.config.max_file_size,
            });
        }

        let (format, content) = parse_document(&path, text)?;
        if let Some(cache) = &self.cache {
            cache.insert(&path, metadata, format, content.clone());
        }
        Ok(Document {
            path,
            format,
            content,
        })
    }
}

#[cfg(unix)]
fn same_file_identity(
    path_metadata: &std::fs::Metadata,
    opened_metadata: &std::fs::Metadata,
) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}
