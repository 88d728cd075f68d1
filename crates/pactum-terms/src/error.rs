use crate::envelope::EnvelopeError;

/// Errors that can occur while building or reading terms.
#[derive(Debug, thiserror::Error)]
pub enum TermsError {
    /// The declaration reference could not be resolved, read, or parsed.
    #[error(transparent)]
    Source(#[from] pactum_source::SourceError),

    /// The definition has no usable declared-schema envelope.
    #[error("invalid terms: {0}")]
    Envelope(#[from] EnvelopeError),
}

pub type Result<T> = std::result::Result<T, TermsError>;
