use thiserror::Error;

/// Errors produced while decoding or parsing a stylesheet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CssError {
    #[error("CSS syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid declaration at line {line}, column {column}: {message}")]
    Declaration {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Stylesheet bytes are not valid {encoding}")]
    Encoding { encoding: &'static str },
}

impl CssError {
    pub(crate) fn syntax(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_col(source, offset);
        CssError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    pub(crate) fn declaration(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_col(source, offset);
        CssError::Declaration {
            line,
            column,
            message: message.into(),
        }
    }
}

/// One-based line and column of a byte offset.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}
