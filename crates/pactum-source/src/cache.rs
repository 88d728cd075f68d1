use std::collections::HashMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use serde_json::Value;

use crate::format::DocumentFormat;

/// Parsed declarations keyed by canonical path.
///
/// An entry is reused only while the file's modification time and length
/// match what was observed when it was parsed.
#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: Mutex<HashMap<PathBuf, CachedDocument>>,
}

#[derive(Debug, Clone)]
struct CachedDocument {
    modified: Option<SystemTime>,
    len: u64,
    format: DocumentFormat,
    content: Value,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached content for `path` if `metadata` still matches.
    pub fn get(&self, path: &Path, metadata: &Metadata) -> Option<(DocumentFormat, Value)> {
        let entries = self.lock();
        let entry = entries.get(path)?;
        if entry.modified == metadata.modified().ok() && entry.len == metadata.len() {
            tracing::debug!(path = %path.display(), "declaration cache hit");
            Some((entry.format, entry.content.clone()))
        } else {
            tracing::debug!(path = %path.display(), "declaration cache stale");
            None
        }
    }

    pub fn insert(&self, path: &Path, metadata: &Metadata, format: DocumentFormat, content: Value) {
        self.lock().insert(
            path.to_path_buf(),
            CachedDocument {
                modified: metadata.modified().ok(),
                len: metadata.len(),
                format,
                content,
            },
        );
    }

    pub fn invalidate(&self, path: &Path) -> bool {
        self.lock().remove(path).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, CachedDocument>> {
        // Entries are plain values, a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn stale_entry_is_not_returned() {
        let path = std::env::temp_dir().join(format!(
            "pactum-cache-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::write(&path, "{}").unwrap();
        let before = std::fs::metadata(&path).unwrap();

        let cache = DocumentCache::new();
        cache.insert(&path, &before, DocumentFormat::Json, json!({}));
        assert_eq!(cache.get(&path, &before).unwrap().1, json!({}));

        std::fs::write(&path, r#"{"changed":true}"#).unwrap();
        let after = std::fs::metadata(&path).unwrap();
        assert!(cache.get(&path, &after).is_none());

        assert!(cache.invalidate(&path));
        assert!(cache.is_empty());
        let _ = std::fs::remove_file(&path);
    }
}
