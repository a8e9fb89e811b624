//! # foprep-selector
//!
//! Translates CSS selectors into [`ElementPath`] queries and evaluates them
//! against a [`foprep_dom::Document`].
//!
//! Element and attribute names are compared verbatim and case-sensitively,
//! the way an XML-aware selector engine does. A namespace prefix in a
//! selector (`fo|block`) matches the literal prefixed name `fo:block`.
//!
//! ```
//! use foprep_dom::Document;
//! use foprep_selector::translate;
//!
//! let doc = Document::parse("<table><tr class='hl'/><tr/></table>").unwrap();
//! let path = translate("tr.hl").unwrap();
//! assert_eq!(path.select(&doc).len(), 1);
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod parser;
pub mod path;
pub mod translate;

pub use error::SelectorError;
pub use parser::parse_selector;
pub use path::{Axis, ElementPath, LocationPath, NameTest, Predicate, Step};
pub use translate::translate;
