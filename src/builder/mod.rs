//! Document builders hand XSL-FO to an external formatter and return the
//! path of the file it produced.
//!
//! ## Available Builders
//!
//! - [`SubprocessBuilder`]: runs the `fop` command once per document
//! - [`FopsBuilder`]: posts to a running fops server (feature: `fops`)

#[cfg(feature = "fops")]
mod fops;
mod subprocess;

#[cfg(feature = "fops")]
pub use self::fops::FopsBuilder;
pub use self::subprocess::SubprocessBuilder;

use crate::format::OutputFormat;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Environment variable naming the formatter command.
pub const FOP_ENV_VAR: &str = "FOP_CMD";

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error(
        "Unable to find the path to execute FOP. Verify your PATH or the environment variable \"FOP_CMD\""
    )]
    CommandNotFound,
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    CommandFailed(String),
    #[error("Failed to create the output file: {0}")]
    OutputFile(#[source] std::io::Error),

    #[cfg(feature = "fops")]
    #[error("Failed to set up the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[cfg(feature = "fops")]
    #[error("Invalid fops server URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
    #[cfg(feature = "fops")]
    #[error("Unable to build the document on the fops server at {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[cfg(feature = "fops")]
    #[error("The fops server answered {status}: {body}")]
    ServerResponse { status: u16, body: String },
}

pub trait DocumentBuilder: Send + Sync + Debug {
    /// Formats `xslfo` as `format`, returning the generated file's path.
    fn build(&self, xslfo: &[u8], format: OutputFormat) -> Result<PathBuf, BuilderError>;
}

/// An empty `foprep-*.<format>` file in `dir`, removed on drop unless kept.
fn output_file(dir: &Path, format: OutputFormat) -> Result<NamedTempFile, BuilderError> {
    tempfile::Builder::new()
        .prefix("foprep-")
        .suffix(&format!(".{}", format))
        .tempfile_in(dir)
        .map_err(BuilderError::OutputFile)
}

/// Detaches the file from its guard so it outlives the builder.
fn keep(file: NamedTempFile) -> Result<PathBuf, BuilderError> {
    file.into_temp_path()
        .keep()
        .map_err(|e| BuilderError::OutputFile(e.error))
}
