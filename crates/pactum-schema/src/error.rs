/// Errors that can occur while obtaining a validator.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema source could not be resolved, read, or parsed.
    #[error(transparent)]
    Source(#[from] pactum_source::SourceError),

    /// The schema text is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The schema could not be compiled.
    #[error("failed to compile schema: {message}")]
    CompileFailed { message: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
