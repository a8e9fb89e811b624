//! # foprep-dom
//!
//! A small, mutable XML element tree used by the style cascade and namespace
//! rewrite passes.
//!
//! Nodes live in a single arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Node ids are handed out in document order while parsing and the
//! tree shape never changes afterwards (only tags and attributes are edited),
//! so comparing two ids compares their document position.
//!
//! Tag and attribute names are kept exactly as written in the source,
//! including any `prefix:` part. The reader does not resolve namespaces;
//! `xmlns` declarations are ordinary attributes.

mod doctype;
pub mod error;
pub mod name;
pub mod reader;
pub mod tree;
pub mod writer;

pub use error::DomError;
pub use tree::{Descendants, Document, Element, NodeId, NodeKind};
