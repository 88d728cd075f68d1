use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use pactum_source::SourceLoader;
use serde_json::Value;

use crate::config::SchemerOptions;
use crate::digest::SchemaDigest;
use crate::error::{Result, SchemaError};
use crate::report::{report_validation_errors, ValidationReport};
use crate::strict::close_object_schemas;
use crate::validator::{CompiledSchema, ValidationErrorRecord, Validator};

static SHARED: Lazy<Schemer> = Lazy::new(Schemer::new);

/// Compiles schemas into validators and caches the compiled form.
///
/// The cache is keyed by [`SchemaDigest`], so equal schema content compiled
/// with equal options is compiled once regardless of where the value came
/// from. Compilation runs while the cache lock is held, so concurrent
/// requests for the same schema never compile it twice.
pub struct Schemer {
    loader: SourceLoader,
    cache: Option<Mutex<HashMap<SchemaDigest, Arc<CompiledSchema>>>>,
}

impl Schemer {
    /// Create a caching schemer with a default loader.
    pub fn new() -> Self {
        Self::with_loader(SourceLoader::new())
    }

    /// Create a caching schemer reading schema files through `loader`.
    pub fn with_loader(loader: SourceLoader) -> Self {
        Self {
            loader,
            cache: Some(Mutex::new(HashMap::new())),
        }
    }

    /// Create a schemer that compiles on every request.
    pub fn uncached() -> Self {
        Self {
            loader: SourceLoader::new(),
            cache: None,
        }
    }

    /// Process-wide caching schemer.
    pub fn shared() -> &'static Schemer {
        &SHARED
    }

    /// Compile `schema`, reusing a cached compilation when one exists.
    pub fn get_validator(&self, schema: &Value, options: &SchemerOptions) -> Result<Validator> {
        let digest = SchemaDigest::compute(schema, options);

        let Some(cache) = &self.cache else {
            return compile(schema, options, digest).map(|c| Validator::new(Arc::new(c)));
        };

        let mut entries = lock(cache);
        if let Some(compiled) = entries.get(&digest) {
            tracing::debug!(%digest, "schema cache hit");
            return Ok(Validator::new(Arc::clone(compiled)));
        }

        let compiled = Arc::new(compile(schema, options, digest)?);
        entries.insert(digest, Arc::clone(&compiled));
        Ok(Validator::new(compiled))
    }

    /// Compile an in-memory schema value.
    pub fn from_value(&self, schema: &Value, options: &SchemerOptions) -> Result<Validator> {
        self.get_validator(schema, options)
    }

    /// Parse and compile schema JSON text.
    pub fn from_json(&self, schema_json: &str, options: &SchemerOptions) -> Result<Validator> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.get_validator(&schema, options)
    }

    /// Load a schema file and compile it.
    pub fn from_file(&self, file: &Path, options: &SchemerOptions) -> Result<Validator> {
        let document = self.loader.load_path(file, None)?;
        self.get_validator(&document.content, options)
    }

    /// Load a schema file without blocking the runtime thread and compile it.
    #[cfg(feature = "async")]
    pub async fn from_file_async(&self, file: &Path, options: &SchemerOptions) -> Result<Validator> {
        let document = self.loader.load_path_async(file, None).await?;
        self.get_validator(&document.content, options)
    }

    /// Format an error list for display or serialization.
    pub fn report_validation_errors(errors: &[ValidationErrorRecord]) -> ValidationReport {
        report_validation_errors(errors)
    }

    /// Number of distinct compiled schemas held by the cache.
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| lock(cache).len())
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            lock(cache).clear();
        }
    }
}

impl Default for Schemer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Schemer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schemer")
            .field("cached", &self.cache.is_some())
            .field("cached_len", &self.cached_len())
            .finish()
    }
}

fn compile(schema: &Value, options: &SchemerOptions, digest: SchemaDigest) -> Result<CompiledSchema> {
    let mut schema = schema.clone();
    if options.strict_mode {
        close_object_schemas(&mut schema);
    }

    let built = match options.draft {
        Some(draft) => jsonschema::options()
            .with_draft(draft.into())
            .build(&schema),
        None => jsonschema::validator_for(&schema),
    };
    let engine = built.map_err(|err| SchemaError::CompileFailed {
        message: err.to_string(),
    })?;
    tracing::debug!(%digest, strict = options.strict_mode, "compiled schema");

    Ok(CompiledSchema {
        engine,
        schema,
        digest,
    })
}

fn lock(
    cache: &Mutex<HashMap<SchemaDigest, Arc<CompiledSchema>>>,
) -> MutexGuard<'_, HashMap<SchemaDigest, Arc<CompiledSchema>>> {
    cache.lock().unwrap_or_else(|e| e.into_inner())
}
