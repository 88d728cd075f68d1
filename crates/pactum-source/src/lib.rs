//! Declaration resolution and loading for pactum.
//!
//! Turns a string reference plus an optional directory context into an
//! absolute location, reads it with size and symlink guards, and parses the
//! content as JSON or TOML. An optional [`DocumentCache`] skips re-parsing
//! while a file's modification time and length are unchanged.

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod loader;
pub mod resolve;

pub use cache::DocumentCache;
pub use config::LoaderConfig;
pub use error::{Result, SourceError};
pub use format::{parse_document, DocumentFormat};
pub use loader::{Document, SourceLoader};
pub use resolve::{absolutize, absolutize_path, resolve_reference};
