use std::fmt;

use pactum_contract::{ContractError, ErrorKind};
use pactum_schema::SchemaError;
use pactum_source::SourceError;
use pactum_terms::TermsError;

// Exit code constants aligned with sysexits where one applies.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const CONFIG: i32 = 65;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn code_for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Resolution
        | ErrorKind::Parse
        | ErrorKind::SchemaExtraction
        | ErrorKind::Compilation => CONFIG,
        ErrorKind::NotNegotiated => DATA_INVALID,
    }
}

pub fn contract_error(context: &str, err: ContractError) -> CliError {
    CliError::new(code_for_kind(err.kind()), format!("{context}: {err}"))
}

pub fn terms_error(context: &str, err: TermsError) -> CliError {
    contract_error(context, ContractError::from(err))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    contract_error(context, ContractError::from(err))
}

pub fn source_error(context: &str, err: SourceError) -> CliError {
    schema_error(context, SchemaError::from(err))
}

/// Command output that cannot be encoded is a defect in pactum itself.
pub fn encode_error(kind: &str, err: serde_json::Error) -> CliError {
    CliError::new(INTERNAL, format!("encode {kind} output: {err}"))
}

/// Stdout refused the write, for example a closed pipe.
pub fn write_error(err: std::io::Error) -> CliError {
    CliError::new(FAILURE, format!("write output: {err}"))
}
