// src/error.rs
//! Error types for document generation.

use crate::builder::BuilderError;
use crate::format::InvalidOutputFormat;
use crate::template::TemplateError;
use foprep_core::TransformError;
use thiserror::Error;

/// The main error enum for all high-level generation operations.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Document builder error: {0}")]
    Builder(#[from] BuilderError),
    #[error(transparent)]
    InvalidOutputFormat(#[from] InvalidOutputFormat),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_errors_keep_their_stage() {
        let err: GeneratorError = TransformError::Encoding {
            encoding: "x".into(),
            message: "unknown encoding label".into(),
        }
        .into();
        match &err {
            GeneratorError::Transform(inner) => assert_eq!(inner.stage(), "encoding"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Transform error: "));
    }

    #[test]
    fn test_invalid_format_message_is_passed_through() {
        let err: GeneratorError = InvalidOutputFormat("docx".into()).into();
        assert!(err.to_string().starts_with("Invalid output format 'docx'"));
    }
}
