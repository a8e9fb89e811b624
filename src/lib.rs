//! # foprep
//!
//! Generates documents from a template, a parameter object and CSS
//! stylesheets by way of XSL-FO:
//!
//! 1. a [`Template`] renders the parameters into plain XML,
//! 2. the [`Transformer`] inlines the cascaded styles and qualifies every
//!    element with the `fo:` namespace,
//! 3. a [`DocumentBuilder`] runs the external formatter on the result, either
//!    as a local command or on a fops server.
//!
//! ```no_run
//! use foprep::{DocumentGenerator, OutputFormat};
//! use serde_json::json;
//!
//! let generator = DocumentGenerator::builder()
//!     .with_template_file("templates/invoice.hbs")?
//!     .with_style_dir("styles")
//!     .with_stylesheet("invoice.css")
//!     .build()?;
//! let path = generator.generate(&json!({"number": 42}), Some(OutputFormat::Pdf))?;
//! println!("{}", path.display());
//! # Ok::<(), foprep::GeneratorError>(())
//! ```

pub mod builder;
pub mod error;
pub mod format;
pub mod generator;
pub mod template;

#[cfg(feature = "fops")]
pub use builder::FopsBuilder;
pub use builder::{BuilderError, DocumentBuilder, FOP_ENV_VAR, SubprocessBuilder};
pub use error::GeneratorError;
pub use format::{InvalidOutputFormat, OutputFormat};
pub use generator::{DocumentGenerator, GeneratorBuilder};
pub use template::{HandlebarsTemplate, Template, TemplateError};

pub use foprep_core::{
    Document, NamespaceBinding, StylesheetFailure, TransformError, TransformJob, Transformer,
    TransformerBuilder, XSL_FO_NAMESPACE,
};
pub use foprep_source::{FilesystemStylesheetSource, InMemoryStylesheetSource, StylesheetSource};
