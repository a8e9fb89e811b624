use thiserror::Error;

/// Errors raised while reading or writing a [`crate::Document`].
#[derive(Error, Debug)]
pub enum DomError {
    #[error("XML syntax error at byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Invalid attribute at byte {position}: {message}")]
    Attribute { position: u64, message: String },

    #[error("Invalid reference '&{reference};' at byte {position}")]
    Reference { reference: String, position: u64 },

    #[error("'{name}' at byte {position} is not a valid XML name")]
    InvalidName { name: String, position: u64 },

    #[error("Character U+{code:04X} near byte {position} is not allowed in XML")]
    InvalidCharacter { code: u32, position: u64 },

    #[error("Unsupported document type declaration at byte {position}: {message}")]
    Doctype { position: u64, message: String },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Unexpected content after the root element at byte {0}")]
    TrailingContent(u64),

    #[error("Element <{0}> is never closed")]
    Unclosed(String),

    #[error("Input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Failed to write XML: {0}")]
    Write(#[from] std::io::Error),
}
