//! Interface declarations for pactum.
//!
//! A [`Terms`] is one party's declared interface: the shape of data a
//! provider emits, or the shape a consumer expects. Its definition carries
//! the actual schema inside a `declaredSchema` envelope, checked once when
//! the terms are built and exposed as a typed [`DeclaredSchema`].

pub mod declaration;
pub mod envelope;
pub mod error;
pub mod terms;

pub use declaration::Declaration;
pub use envelope::{DeclaredSchema, EnvelopeError, ENVELOPE_KEY};
pub use error::{Result, TermsError};
pub use terms::Terms;
