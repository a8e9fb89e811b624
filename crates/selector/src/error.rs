use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Invalid selector '{selector}': {message}")]
    Parse { selector: String, message: String },

    #[error("Cannot translate selector '{selector}': {feature} is not supported")]
    Unsupported { selector: String, feature: String },
}
