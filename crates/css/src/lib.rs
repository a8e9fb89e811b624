//! # foprep-css
//!
//! Turns stylesheet bytes into an ordered list of [`CssRule`]s: style rules
//! with their effective declarations, and `@import` rules left for the
//! caller to expand.

pub mod decode;
pub mod error;
pub mod parser;
pub mod rule;

pub use decode::decode_stylesheet;
pub use error::CssError;
pub use parser::{parse_declarations, parse_stylesheet};
pub use rule::{CssRule, Declarations, ImportRule, StyleRule};

/// Decodes and parses a stylesheet in one step.
pub fn parse_stylesheet_bytes(bytes: &[u8]) -> Result<Vec<CssRule>, CssError> {
    let text = decode_stylesheet(bytes)?;
    parse_stylesheet(&text)
}
