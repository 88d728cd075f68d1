use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;

use crate::digest::SchemaDigest;

/// One reason a value was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrorRecord {
    /// JSON pointer to the offending location in the validated value.
    pub instance_path: String,
    /// JSON pointer to the failing keyword in the compiled schema.
    pub schema_path: String,
    /// Name of the failing keyword, e.g. `required` or `type`.
    pub keyword: String,
    pub message: String,
    /// Schema fragment at `schema_path`, when it can be located.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// The value found at `instance_path`.
    pub actual: Value,
}

impl ValidationErrorRecord {
    fn from_engine(error: &jsonschema::ValidationError<'_>, schema: &Value) -> Self {
        let schema_path = error.schema_path.to_string();
        let keyword = schema_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            instance_path: error.instance_path.to_string(),
            expected: schema.pointer(&schema_path).cloned(),
            keyword,
            schema_path,
            message: error.to_string(),
            actual: error.instance.clone().into_owned(),
        }
    }
}

impl fmt::Display for ValidationErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.instance_path.is_empty() || self.instance_path == "/" {
            "/"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "{path}: {}", self.message)
    }
}

/// A compiled schema shared between every validator built from it.
pub(crate) struct CompiledSchema {
    pub(crate) engine: jsonschema::Validator,
    /// The schema as compiled, after any strict-mode rewriting.
    pub(crate) schema: Value,
    pub(crate) digest: SchemaDigest,
}

/// Executable predicate over JSON values.
///
/// [`Validator::validate`] returns a plain `bool`. When it returns `false`,
/// [`Validator::errors`] describes why; the list is replaced on every call.
/// Clones share the compiled schema but keep their own error list.
pub struct Validator {
    compiled: Arc<CompiledSchema>,
    errors: Mutex<Vec<ValidationErrorRecord>>,
}

impl Validator {
    pub(crate) fn new(compiled: Arc<CompiledSchema>) -> Self {
        Self {
            compiled,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Check `data`, recording the errors of this call.
    pub fn validate(&self, data: &Value) -> bool {
        let mut errors = self.lock_errors();
        errors.clear();
        errors.extend(
            self.compiled
                .engine
                .iter_errors(data)
                .map(|err| ValidationErrorRecord::from_engine(&err, &self.compiled.schema)),
        );
        errors.is_empty()
    }

    /// Check `data` without touching the recorded errors.
    pub fn is_valid(&self, data: &Value) -> bool {
        self.compiled.engine.is_valid(data)
    }

    /// Errors recorded by the most recent [`Validator::validate`] call.
    pub fn errors(&self) -> Vec<ValidationErrorRecord> {
        self.lock_errors().clone()
    }

    /// Take the recorded errors, leaving the list empty.
    pub fn take_errors(&self) -> Vec<ValidationErrorRecord> {
        std::mem::take(&mut *self.lock_errors())
    }

    /// The schema this validator enforces.
    pub fn schema(&self) -> &Value {
        &self.compiled.schema
    }

    pub fn digest(&self) -> SchemaDigest {
        self.compiled.digest
    }

    /// True when both validators run the same compiled schema instance.
    pub fn shares_compilation(&self, other: &Validator) -> bool {
        Arc::ptr_eq(&self.compiled, &other.compiled)
    }

    fn lock_errors(&self) -> MutexGuard<'_, Vec<ValidationErrorRecord>> {
        self.errors.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clone for Validator {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.compiled))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("digest", &self.compiled.digest)
            .field("recorded_errors", &self.lock_errors().len())
            .finish()
    }
}
