//! Provider/consumer negotiation for pactum.
//!
//! [`negotiate`] decides whether a provider's declared output shape satisfies
//! a consumer's declared input shape and, when it does, compiles the runtime
//! validator. [`Contract`] wraps that outcome behind a single
//! [`Contract::validate`] entry point.
//!
//! Outcomes are reported three ways:
//! - structural problems (unreadable terms, missing envelope, schema that
//!   does not compile) are returned as [`ContractError`];
//! - incompatible but well-formed terms produce a contract that is not
//!   negotiated and lists its [`Incompatibility`] reasons;
//! - data that does not match is `Ok(false)` from [`Contract::validate`].

pub mod compat;
pub mod config;
pub mod contract;
pub mod error;
pub mod negotiate;

pub use compat::{check_compatibility, Incompatibility, Rule};
pub use config::{ContractOptions, Enforce};
pub use contract::Contract;
pub use error::{ContractError, ErrorKind, Result, Side};
pub use negotiate::{negotiate, Negotiation};
