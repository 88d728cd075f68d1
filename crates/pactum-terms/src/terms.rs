use std::path::Path;

use once_cell::sync::Lazy;
use pactum_source::{LoaderConfig, SourceLoader};
use serde_json::Value;

use crate::declaration::Declaration;
use crate::envelope::{DeclaredSchema, EnvelopeError};
use crate::error::Result;

static SHARED_LOADER: Lazy<SourceLoader> =
    Lazy::new(|| SourceLoader::cached(LoaderConfig::default()));

/// One party's interface declaration.
///
/// The definition never changes after construction. The envelope is checked
/// once, here, and the outcome kept for [`Terms::declared_schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Terms {
    definition: Value,
    envelope: std::result::Result<DeclaredSchema, EnvelopeError>,
}

impl Terms {
    /// Wrap an already parsed definition.
    pub fn new(definition: Value) -> Self {
        let envelope = DeclaredSchema::from_definition(&definition);
        if let Err(err) = &envelope {
            tracing::debug!(%err, "terms definition has no usable envelope");
        }
        Self {
            definition,
            envelope,
        }
    }

    /// Normalize a declaration into a definition.
    ///
    /// Inline values pass through unchanged. References are resolved against
    /// `directory` (or the working directory) and read through a shared
    /// loader that caches by modification time.
    pub fn parse(declaration: impl Into<Declaration>, directory: Option<&Path>) -> Result<Value> {
        Self::parse_with(&SHARED_LOADER, declaration, directory)
    }

    /// [`Terms::parse`] with an explicit loader.
    pub fn parse_with(
        loader: &SourceLoader,
        declaration: impl Into<Declaration>,
        directory: Option<&Path>,
    ) -> Result<Value> {
        match declaration.into() {
            Declaration::Inline(definition) => Ok(definition),
            Declaration::Reference(reference) => {
                let document = loader.load(&reference, directory)?;
                tracing::debug!(
                    reference = %reference,
                    path = %document.path.display(),
                    format = %document.format,
                    "parsed terms declaration"
                );
                Ok(document.content)
            }
        }
    }

    /// [`Terms::parse`] without blocking the runtime thread.
    #[cfg(feature = "async")]
    pub async fn parse_async(
        declaration: impl Into<Declaration>,
        directory: Option<&Path>,
    ) -> Result<Value> {
        match declaration.into() {
            Declaration::Inline(definition) => Ok(definition),
            Declaration::Reference(reference) => {
                let document = SHARED_LOADER.load_async(&reference, directory).await?;
                Ok(document.content)
            }
        }
    }

    /// Parse a declaration and wrap it.
    pub fn load(declaration: impl Into<Declaration>, directory: Option<&Path>) -> Result<Self> {
        Self::parse(declaration, directory).map(Self::new)
    }

    pub fn definition(&self) -> &Value {
        &self.definition
    }

    /// The unwrapped declared schema, or why there is none.
    pub fn declared_schema(&self) -> std::result::Result<&DeclaredSchema, EnvelopeError> {
        self.envelope.as_ref().map_err(Clone::clone)
    }

    /// The declared name, when the envelope carries one.
    pub fn name(&self) -> Option<&str> {
        self.envelope.as_ref().ok()?.name.as_deref()
    }
}

impl From<Value> for Terms {
    fn from(definition: Value) -> Self {
        Self::new(definition)
    }
}
