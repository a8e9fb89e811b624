//! # foprep-core
//!
//! Turns an XML document plus an ordered list of CSS stylesheets into
//! namespace-qualified XSL-FO bytes.
//!
//! A transform runs these stages, each in its own module:
//! - **resolver**: loads the sheets and expands `@import`s in place
//! - **cascade**: inlines every rule's declarations onto the elements it matches
//! - **strip**: drops the `class` attributes the cascade consumed
//! - **namespace**: prefixes every bare tag with the target namespace prefix
//! - **serializer**: encodes the tree behind an XML declaration
//!
//! Without stylesheets only the last two stages run.
//!
//! ```
//! use foprep_core::Transformer;
//!
//! let transformer = Transformer::builder().build().unwrap();
//! let out = transformer.transform::<&str>("<block>Hi</block>", &[], None).unwrap();
//! assert!(String::from_utf8(out).unwrap().ends_with("<fo:block xmlns:fo=\"http://www.w3.org/1999/XSL/Format\">Hi</fo:block>"));
//! ```

pub mod cascade;
pub mod config;
pub mod error;
pub mod namespace;
pub mod resolver;
pub mod serializer;
pub mod strip;

pub use config::{DEFAULT_ENCODING, NamespaceBinding, XSL_FO_NAMESPACE};
pub use error::{StylesheetFailure, TransformError};
pub use resolver::{Rule, StylesheetResolver};

pub use foprep_dom::{Document, DomError};

use encoding_rs::Encoding;
use foprep_source::{FilesystemStylesheetSource, StylesheetSource};
use std::sync::Arc;

/// One independent unit of work for [`Transformer::transform_many`].
#[derive(Debug, Clone, Default)]
pub struct TransformJob {
    pub xml: String,
    pub stylesheets: Vec<String>,
    pub encoding: Option<String>,
}

impl TransformJob {
    pub fn new(xml: impl Into<String>) -> Self {
        Self {
            xml: xml.into(),
            ..Self::default()
        }
    }

    pub fn with_stylesheet(mut self, location: impl Into<String>) -> Self {
        self.stylesheets.push(location.into());
        self
    }

    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }
}

/// The configured transform engine.
///
/// Holds only read-only configuration; every call builds and discards its own
/// tree and rule list, so one transformer can serve many threads.
#[derive(Debug, Clone)]
pub struct Transformer {
    namespace: NamespaceBinding,
    resolver: StylesheetResolver,
    default_encoding: &'static Encoding,
}

impl Transformer {
    pub fn builder() -> TransformerBuilder {
        TransformerBuilder::new()
    }

    pub fn namespace(&self) -> &NamespaceBinding {
        &self.namespace
    }

    pub fn default_encoding(&self) -> &'static Encoding {
        self.default_encoding
    }

    /// Resolves `stylesheets` into the rule list a transform would apply.
    pub fn resolve<S: AsRef<str>>(&self, stylesheets: &[S]) -> Result<Vec<Rule>, TransformError> {
        self.resolver.resolve(stylesheets)
    }

    /// Runs every stage except serialization and returns the rewritten tree.
    pub fn prepare<S: AsRef<str>>(
        &self,
        xml: &str,
        stylesheets: &[S],
    ) -> Result<Document, TransformError> {
        let mut doc = Document::parse(xml)?;
        if stylesheets.is_empty() {
            log::debug!("No stylesheets given, skipping cascade");
        } else {
            let rules = self.resolver.resolve(stylesheets)?;
            cascade::apply_rules(&mut doc, &rules)?;
            let stripped = strip::strip_classes(&mut doc);
            log::trace!("Stripped class from {} element(s)", stripped);
        }
        namespace::qualify_elements(&mut doc, &self.namespace);
        Ok(doc)
    }

    /// Transforms `xml` with `stylesheets` (in cascade order) into encoded
    /// XSL-FO. `encoding` is a WHATWG label; `None` uses the default.
    pub fn transform<S: AsRef<str>>(
        &self,
        xml: &str,
        stylesheets: &[S],
        encoding: Option<&str>,
    ) -> Result<Vec<u8>, TransformError> {
        let encoding = match encoding {
            Some(label) => serializer::output_encoding(label)?,
            None => self.default_encoding,
        };
        let doc = self.prepare(xml, stylesheets)?;
        serializer::serialize(doc, &self.namespace, encoding)
    }

    /// Runs independent transforms, in parallel with the `rayon-executor`
    /// feature. Results are in job order.
    pub fn transform_many(&self, jobs: &[TransformJob]) -> Vec<Result<Vec<u8>, TransformError>> {
        #[cfg(feature = "rayon-executor")]
        {
            use rayon::prelude::*;
            jobs.par_iter().map(|job| self.run_job(job)).collect()
        }
        #[cfg(not(feature = "rayon-executor"))]
        {
            jobs.iter().map(|job| self.run_job(job)).collect()
        }
    }

    fn run_job(&self, job: &TransformJob) -> Result<Vec<u8>, TransformError> {
        self.transform(&job.xml, &job.stylesheets, job.encoding.as_deref())
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self {
            namespace: NamespaceBinding::default(),
            resolver: StylesheetResolver::new(Arc::new(FilesystemStylesheetSource::default())),
            default_encoding: encoding_rs::UTF_8,
        }
    }
}

/// Builder for [`Transformer`].
///
/// Defaults: the `fo` XSL-FO binding, stylesheets read from the current
/// directory, UTF-8 output.
#[derive(Debug, Default)]
pub struct TransformerBuilder {
    namespace: Option<NamespaceBinding>,
    source: Option<Arc<dyn StylesheetSource>>,
    default_encoding: Option<String>,
}

impl TransformerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, binding: NamespaceBinding) -> Self {
        self.namespace = Some(binding);
        self
    }

    /// Where stylesheet locations are loaded from.
    pub fn with_source(mut self, source: Arc<dyn StylesheetSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_default_encoding(mut self, label: impl Into<String>) -> Self {
        self.default_encoding = Some(label.into());
        self
    }

    /// # Errors
    ///
    /// Fails with [`TransformError::Encoding`] if the default encoding label
    /// is unknown or cannot be used for output.
    pub fn build(self) -> Result<Transformer, TransformError> {
        let default_encoding = serializer::output_encoding(
            self.default_encoding.as_deref().unwrap_or(DEFAULT_ENCODING),
        )?;
        let source: Arc<dyn StylesheetSource> = match self.source {
            Some(source) => source,
            None => Arc::new(FilesystemStylesheetSource::default()),
        };
        let namespace = self.namespace.unwrap_or_default();
        log::debug!(
            "Transformer ready: {}={} via {}, default encoding {}",
            namespace.declaration_name(),
            namespace.uri,
            source.name(),
            default_encoding.name()
        );
        Ok(Transformer {
            namespace,
            resolver: StylesheetResolver::new(source),
            default_encoding,
        })
    }
}
