//! Error types for the transform pipeline.
//!
//! Every stage fails with its own variant so callers can report which stage
//! aborted the transform. No variant is ever recovered from internally.

use foprep_css::CssError;
use foprep_dom::DomError;
use foprep_selector::SelectorError;
use foprep_source::SourceError;
use thiserror::Error;

/// Why a stylesheet could not be turned into rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StylesheetFailure {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Css(CssError),

    #[error("circular import: {0}")]
    CircularImport(String),

    #[error("maximum import depth ({0}) exceeded")]
    DepthExceeded(usize),
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Malformed input XML: {0}")]
    XmlParse(#[from] DomError),

    #[error("Stylesheet '{location}': {reason}")]
    Stylesheet {
        location: String,
        #[source]
        reason: StylesheetFailure,
    },

    #[error("Cannot translate selector '{selector}' from '{location}': {source}")]
    SelectorTranslation {
        location: String,
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("Invalid style declaration in '{location}': {message}")]
    StyleDeclaration { location: String, message: String },

    #[error("Cannot encode output as '{encoding}': {message}")]
    Encoding { encoding: String, message: String },
}

impl TransformError {
    pub(crate) fn stylesheet(location: &str, reason: impl Into<StylesheetFailure>) -> Self {
        TransformError::Stylesheet {
            location: location.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn circular_import(chain: &[String], location: &str) -> Self {
        let mut path = chain.join(" -> ");
        path.push_str(" -> ");
        path.push_str(location);
        Self::stylesheet(location, StylesheetFailure::CircularImport(path))
    }

    pub(crate) fn encoding(encoding: &str, message: impl Into<String>) -> Self {
        TransformError::Encoding {
            encoding: encoding.to_string(),
            message: message.into(),
        }
    }

    /// Maps a CSS failure: declaration problems keep their own kind, anything
    /// else means the sheet itself is unusable.
    pub(crate) fn from_css(location: &str, err: CssError) -> Self {
        match err {
            CssError::Declaration { .. } => TransformError::StyleDeclaration {
                location: location.to_string(),
                message: err.to_string(),
            },
            other => Self::stylesheet(location, StylesheetFailure::Css(other)),
        }
    }

    /// Short stage name, for logs and CLI exit messages.
    pub fn stage(&self) -> &'static str {
        match self {
            TransformError::XmlParse(_) => "xml-parse",
            TransformError::Stylesheet { .. } => "stylesheet",
            TransformError::SelectorTranslation { .. } => "selector-translation",
            TransformError::StyleDeclaration { .. } => "style-declaration",
            TransformError::Encoding { .. } => "encoding",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_import_message_shows_chain() {
        let err = TransformError::circular_import(&["a.css".into(), "b.css".into()], "a.css");
        assert_eq!(
            err.to_string(),
            "Stylesheet 'a.css': circular import: a.css -> b.css -> a.css"
        );
        assert_eq!(err.stage(), "stylesheet");
    }

    #[test]
    fn test_css_declaration_errors_keep_their_kind() {
        let err = TransformError::from_css(
            "main.css",
            CssError::Declaration {
                line: 2,
                column: 5,
                message: "missing ':'".into(),
            },
        );
        assert!(matches!(err, TransformError::StyleDeclaration { .. }));
        assert!(err.to_string().contains("line 2"));

        let err = TransformError::from_css(
            "main.css",
            CssError::Syntax {
                line: 1,
                column: 1,
                message: "unterminated block".into(),
            },
        );
        assert!(matches!(
            err,
            TransformError::Stylesheet {
                reason: StylesheetFailure::Css(_),
                ..
            }
        ));
    }

    #[test]
    fn test_source_errors_convert() {
        let err = TransformError::stylesheet("x.css", SourceError::NotFound("x.css".into()));
        assert!(err.to_string().contains("Stylesheet not found: x.css"));
    }
}
