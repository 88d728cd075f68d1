//! Schema compilation for pactum.
//!
//! [`Schemer`] compiles JSON Schema values into [`Validator`]s, caching the
//! compiled form by a SHA-256 digest of the schema content and options. A
//! validator answers with a plain `bool`; on rejection the structured
//! [`ValidationErrorRecord`]s of the last call stay readable until the next
//! one.

pub mod config;
pub mod digest;
pub mod error;
pub mod report;
pub mod schemer;
pub mod strict;
pub mod validator;

pub use config::{SchemaDraft, SchemerOptions};
pub use digest::SchemaDigest;
pub use error::{Result, SchemaError};
pub use report::{report_validation_errors, ValidationReport};
pub use schemer::Schemer;
pub use validator::{ValidationErrorRecord, Validator};
