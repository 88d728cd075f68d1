use std::fmt;

use pactum_schema::SchemaError;
use pactum_source::SourceError;
use pactum_terms::{EnvelopeError, TermsError};

/// The party a piece of terms belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Provider,
    Consumer,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Provider => f.write_str("provider"),
            Side::Consumer => f.write_str("consumer"),
        }
    }
}

/// Coarse classification of a [`ContractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A reference could not be located or read.
    Resolution,
    /// Content was read but is not a recognized declaration or valid JSON.
    Parse,
    /// Terms lack a usable `declaredSchema` envelope.
    SchemaExtraction,
    /// A schema is not well formed.
    Compilation,
    /// `validate` was called on a contract that did not negotiate.
    NotNegotiated,
}

/// Errors surfaced by contract construction and validation.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// Terms could not be resolved or parsed.
    #[error("failed to load terms: {0}")]
    Terms(#[from] TermsError),

    /// One side's terms have no usable schema.
    #[error("{side} terms: {source}")]
    Extraction {
        side: Side,
        #[source]
        source: EnvelopeError,
    },

    /// A schema could not be obtained or compiled.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The contract holds no validator.
    #[error("contract {name} is not negotiated")]
    NotNegotiated { name: String },
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::Terms(TermsError::Source(err)) => source_kind(err),
            ContractError::Terms(TermsError::Envelope(_)) => ErrorKind::SchemaExtraction,
            ContractError::Extraction { .. } => ErrorKind::SchemaExtraction,
            ContractError::Schema(SchemaError::Source(err)) => source_kind(err),
            ContractError::Schema(SchemaError::InvalidJson(_)) => ErrorKind::Parse,
            ContractError::Schema(SchemaError::CompileFailed { .. }) => ErrorKind::Compilation,
            ContractError::NotNegotiated { .. } => ErrorKind::NotNegotiated,
        }
    }
}

fn source_kind(err: &SourceError) -> ErrorKind {
    if err.is_parse() {
        ErrorKind::Parse
    } else {
        ErrorKind::Resolution
    }
}

pub type Result<T> = std::result::Result<T, ContractError>;
