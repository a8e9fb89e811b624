// src/generator.rs
//! The document generator: template -> XML -> styled XSL-FO -> document.

#[cfg(feature = "fops")]
use crate::builder::FopsBuilder;
use crate::builder::{BuilderError, DocumentBuilder, SubprocessBuilder};
use crate::error::GeneratorError;
use crate::format::OutputFormat;
use crate::template::{HandlebarsTemplate, Template};
use foprep_core::{NamespaceBinding, Transformer};
use foprep_source::FilesystemStylesheetSource;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Renders a template, styles and qualifies the result, and hands it to a
/// [`DocumentBuilder`].
///
/// Stylesheets are looked up relative to the style directory: base sheets
/// first, then the sheets added for this generator.
pub struct DocumentGenerator {
    template: Box<dyn Template>,
    stylesheets: Vec<String>,
    default_params: Map<String, Value>,
    output_format: OutputFormat,
    builder: Option<Arc<dyn DocumentBuilder>>,
    transformer: Transformer,
}

impl DocumentGenerator {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn default_params(&self) -> &Map<String, Value> {
        &self.default_params
    }

    /// Merges the default parameters into `params` in place. Defaults win
    /// over values the caller passed under the same key.
    pub fn merge_params(&self, params: &mut Map<String, Value>) {
        for (key, value) in &self.default_params {
            params.insert(key.clone(), value.clone());
        }
    }

    /// Renders and transforms, returning the XSL-FO bytes.
    ///
    /// `params` must be a JSON object (or null). It is copied, never modified.
    pub fn generate_xslfo(&self, params: &Value) -> Result<Vec<u8>, GeneratorError> {
        let mut params = match params {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(GeneratorError::Config(format!(
                    "template parameters must be a JSON object, got {}",
                    other
                )));
            }
        };
        self.merge_params(&mut params);

        let xml = self.template.render(&Value::Object(params))?;
        log::debug!("Generated XML: {}", xml);
        let xslfo = self
            .transformer
            .transform(&xml, &self.stylesheets, None)?;
        log::debug!(
            "Generated XSL-FO from xml_to_fo: {}",
            String::from_utf8_lossy(&xslfo)
        );
        Ok(xslfo)
    }

    /// Generates the document and returns the path of the produced file.
    /// `format` overrides the generator's output format for this call.
    pub fn generate(
        &self,
        params: &Value,
        format: Option<OutputFormat>,
    ) -> Result<PathBuf, GeneratorError> {
        let builder = self.builder.as_ref().ok_or(BuilderError::CommandNotFound)?;
        let format = format.unwrap_or(self.output_format);
        let xslfo = self.generate_xslfo(params)?;
        let path = builder.build(&xslfo, format)?;
        log::info!("Generated {} document at {}", format, path.display());
        Ok(path)
    }
}

/// A builder for creating a [`DocumentGenerator`].
pub struct GeneratorBuilder {
    template: Option<Box<dyn Template>>,
    style_dir: PathBuf,
    base_stylesheets: Vec<String>,
    stylesheets: Vec<String>,
    default_params: Map<String, Value>,
    output_format: OutputFormat,
    document_builder: Option<Arc<dyn DocumentBuilder>>,
    fop_command: Option<PathBuf>,
    fop_args: Vec<String>,
    #[cfg(feature = "fops")]
    fops: Option<FopsTarget>,
    temp_dir: Option<PathBuf>,
    namespace: NamespaceBinding,
    encoding: Option<String>,
}

#[cfg(feature = "fops")]
struct FopsTarget {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self {
            template: None,
            style_dir: PathBuf::from("."),
            base_stylesheets: Vec::new(),
            stylesheets: Vec::new(),
            default_params: Map::new(),
            output_format: OutputFormat::default(),
            document_builder: None,
            fop_command: None,
            fop_args: Vec::new(),
            #[cfg(feature = "fops")]
            fops: None,
            temp_dir: None,
            namespace: NamespaceBinding::default(),
            encoding: None,
        }
    }
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_template(mut self, template: impl Template + 'static) -> Self {
        self.template = Some(Box::new(template));
        self
    }

    /// Uses a Handlebars template given as a string.
    pub fn with_template_source(self, source: &str) -> Result<Self, GeneratorError> {
        Ok(self.with_template(HandlebarsTemplate::from_source(source)?))
    }

    /// Uses a Handlebars template read from a file.
    pub fn with_template_file<P: AsRef<Path>>(self, path: P) -> Result<Self, GeneratorError> {
        Ok(self.with_template(HandlebarsTemplate::from_file(path)?))
    }

    /// Directory stylesheet names are relative to. Defaults to `.`.
    pub fn with_style_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.style_dir = dir.into();
        self
    }

    /// Adds a sheet that cascades before every sheet added with
    /// [`with_stylesheet`](Self::with_stylesheet).
    pub fn with_base_stylesheet(mut self, name: impl Into<String>) -> Self {
        self.base_stylesheets.push(name.into());
        self
    }

    pub fn with_stylesheet(mut self, name: impl Into<String>) -> Self {
        self.stylesheets.push(name.into());
        self
    }

    pub fn with_stylesheets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stylesheets.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds default parameters; later calls override earlier ones per key.
    pub fn with_default_params(mut self, params: Map<String, Value>) -> Self {
        self.default_params.extend(params);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Like [`with_output_format`](Self::with_output_format), parsing the
    /// name case-insensitively.
    pub fn with_output_format_name(self, name: &str) -> Result<Self, GeneratorError> {
        Ok(self.with_output_format(name.parse()?))
    }

    pub fn with_document_builder(mut self, builder: Arc<dyn DocumentBuilder>) -> Self {
        self.document_builder = Some(builder);
        self
    }

    /// Formatter command for the default [`SubprocessBuilder`].
    pub fn with_fop_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.fop_command = Some(command.into());
        self
    }

    /// Extra arguments for the default [`SubprocessBuilder`], placed before
    /// the ones naming input and output.
    pub fn with_fop_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fop_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Formats on the fops server at `host:port` instead of running the
    /// formatter command.
    #[cfg(feature = "fops")]
    pub fn with_fops(mut self, host: impl Into<String>, port: u16) -> Self {
        self.fops = Some(FopsTarget {
            host: host.into(),
            port,
            credentials: None,
        });
        self
    }

    /// Basic credentials for the server set with [`with_fops`](Self::with_fops).
    #[cfg(feature = "fops")]
    pub fn with_fops_basic_auth(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        if let Some(target) = &mut self.fops {
            target.credentials = Some((user.into(), password.into()));
        }
        self
    }

    /// Where the default document builder creates output files.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_namespace(mut self, binding: NamespaceBinding) -> Self {
        self.namespace = binding;
        self
    }

    /// Output encoding label for the XSL-FO. Defaults to UTF-8.
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    /// Consumes the builder and creates the [`DocumentGenerator`].
    ///
    /// Without an explicit document builder a fops server set with
    /// `with_fops` is used, otherwise a [`SubprocessBuilder`]. If no
    /// formatter command can be found, XSL-FO generation still works and
    /// [`DocumentGenerator::generate`] reports the missing command.
    pub fn build(mut self) -> Result<DocumentGenerator, GeneratorError> {
        let builder = self.formatter()?;
        let template = self.template.ok_or_else(|| {
            GeneratorError::Config(
                "No template has been configured. Use `with_template_file` or `with_template`."
                    .to_string(),
            )
        })?;

        let mut transformer = Transformer::builder()
            .with_namespace(self.namespace)
            .with_source(Arc::new(FilesystemStylesheetSource::new(&self.style_dir)));
        if let Some(label) = &self.encoding {
            transformer = transformer.with_default_encoding(label.as_str());
        }
        let transformer = transformer.build()?;

        let stylesheets: Vec<String> = itertools::chain(self.base_stylesheets, self.stylesheets)
            .collect();
        log::info!(
            "Document generator ready: {} stylesheet(s) from {}, output {}",
            stylesheets.len(),
            self.style_dir.display(),
            self.output_format
        );

        Ok(DocumentGenerator {
            template,
            stylesheets,
            default_params: self.default_params,
            output_format: self.output_format,
            builder,
            transformer,
        })
    }

    fn formatter(&mut self) -> Result<Option<Arc<dyn DocumentBuilder>>, GeneratorError> {
        if let Some(builder) = self.document_builder.take() {
            return Ok(Some(builder));
        }

        #[cfg(feature = "fops")]
        if let Some(target) = self.fops.take() {
            let mut fops = FopsBuilder::new(target.host, target.port)?;
            if let Some((user, password)) = target.credentials {
                fops = fops.with_basic_auth(user, password);
            }
            if let Some(label) = &self.encoding {
                fops = fops.with_charset(label.as_str());
            }
            if let Some(dir) = &self.temp_dir {
                fops = fops.with_temp_dir(dir);
            }
            return Ok(Some(Arc::new(fops)));
        }

        let subprocess = match self.fop_command.take() {
            Some(command) => SubprocessBuilder::new(command),
            None => match SubprocessBuilder::from_env() {
                Ok(subprocess) => subprocess,
                Err(e) => {
                    log::warn!("{}", e);
                    return Ok(None);
                }
            },
        };
        let mut subprocess = subprocess.with_extra_args(std::mem::take(&mut self.fop_args));
        if let Some(dir) = &self.temp_dir {
            subprocess = subprocess.with_temp_dir(dir);
        }
        Ok(Some(Arc::new(subprocess)))
    }
}
