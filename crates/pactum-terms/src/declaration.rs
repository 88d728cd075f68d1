use std::path::{Path, PathBuf};

use serde_json::Value;

/// Raw input for building terms.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// An already structured definition, used as is.
    Inline(Value),
    /// A path or `file://` reference, resolved against a directory context.
    Reference(String),
}

impl From<Value> for Declaration {
    /// A bare JSON string is a reference, anything else is inline.
    fn from(value: Value) -> Self {
        match value {
            Value::String(reference) => Declaration::Reference(reference),
            other => Declaration::Inline(other),
        }
    }
}

impl From<&str> for Declaration {
    fn from(reference: &str) -> Self {
        Declaration::Reference(reference.to_string())
    }
}

impl From<String> for Declaration {
    fn from(reference: String) -> Self {
        Declaration::Reference(reference)
    }
}

impl From<&Path> for Declaration {
    fn from(path: &Path) -> Self {
        Declaration::Reference(path.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Declaration {
    fn from(path: PathBuf) -> Self {
        Declaration::from(path.as_path())
    }
}
