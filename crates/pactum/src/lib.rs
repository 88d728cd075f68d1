//! Negotiate provider/consumer interface declarations into validation contracts.
//!
//! A provider declares the shape of data it emits, a consumer declares the
//! shape it expects. pactum decides whether the first satisfies the second
//! and, when it does, hands back a contract that validates runtime values.
//!
//! ```no_run
//! use pactum::contract::Contract;
//! use pactum::terms::Terms;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Terms::load("provider.json", None)?;
//! let consumer = Terms::load("consumer.toml", None)?;
//! let contract = Contract::new(provider, consumer)?;
//! if contract.is_negotiated() {
//!     assert!(contract.validate(&json!({"id": "abc"}))?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Structure
//!
//! - [`source`]: reference resolution, format detection, document cache
//! - [`schema`]: schema compilation, caching and validation
//! - [`terms`]: one party's declaration and its `declaredSchema` envelope
//! - [`contract`]: negotiation and the negotiated contract

/// Re-export source types.
pub mod source {
    pub use pactum_source::*;
}

/// Re-export schema types.
pub mod schema {
    pub use pactum_schema::*;
}

/// Re-export terms types.
pub mod terms {
    pub use pactum_terms::*;
}

/// Re-export contract types.
pub mod contract {
    pub use pactum_contract::*;
}

pub use pactum_contract::{Contract, ContractError, ContractOptions, ErrorKind};
pub use pactum_schema::{Schemer, SchemerOptions, Validator};
pub use pactum_terms::Terms;
