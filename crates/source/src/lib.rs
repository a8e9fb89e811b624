//! StylesheetSource trait for abstracting stylesheet loading.
//!
//! The cascade resolves `@import` chains through this trait, so the same
//! engine can read sheets from disk or from memory (tests, embedded styles).
//!
//! # Example
//!
//! ```
//! use foprep_source::{InMemoryStylesheetSource, StylesheetSource};
//!
//! let source = InMemoryStylesheetSource::new();
//! source.add("base.css", b".hl { color: red }".to_vec()).unwrap();
//! assert!(source.exists("base.css"));
//! ```

mod filesystem;
mod location;
mod memory;

pub use filesystem::FilesystemStylesheetSource;
pub use location::{normalize_location, resolve_location};
pub use memory::InMemoryStylesheetSource;

use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// Error type for stylesheet loading operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Stylesheet not found: {0}")]
    NotFound(String),

    #[error("Failed to load stylesheet '{location}': {message}")]
    LoadFailed { location: String, message: String },
}

/// Shared stylesheet bytes (reference-counted).
pub type SharedStylesheetData = Arc<Vec<u8>>;

/// A place stylesheets are read from.
///
/// Locations are `/`-separated strings. Relative imports are resolved with
/// [`resolve_location`] before they reach a source.
pub trait StylesheetSource: Send + Sync + Debug {
    /// Loads the raw bytes of a stylesheet.
    fn load(&self, location: &str) -> Result<SharedStylesheetData, SourceError>;

    /// Whether a stylesheet exists at `location`.
    fn exists(&self, location: &str) -> bool;

    /// Human-readable name of the source, for logs.
    fn name(&self) -> &'static str;
}
