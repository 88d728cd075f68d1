use serde::{Deserialize, Serialize};

/// JSON Schema dialects the compiler can be pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaDraft {
    Draft4,
    Draft6,
    Draft7,
    Draft201909,
    Draft202012,
}

impl From<SchemaDraft> for jsonschema::Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => jsonschema::Draft::Draft4,
            SchemaDraft::Draft6 => jsonschema::Draft::Draft6,
            SchemaDraft::Draft7 => jsonschema::Draft::Draft7,
            SchemaDraft::Draft201909 => jsonschema::Draft::Draft201909,
            SchemaDraft::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

/// Controls how a schema is compiled.
///
/// Options take part in the cache key: the same schema compiled with
/// different options yields distinct cache entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemerOptions {
    /// Dialect to compile against. `None` detects it from `$schema`.
    pub draft: Option<SchemaDraft>,
    /// When true, object schemas reject properties they do not declare.
    pub strict_mode: bool,
}
