//! Templates render generation parameters into the input XML document.

use handlebars::Handlebars;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

const TEMPLATE_NAME: &str = "document";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template syntax error: {0}")]
    Syntax(#[from] handlebars::TemplateError),
    #[error("Template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
    #[error("Failed to read template from '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can turn a parameter object into an XML string.
pub trait Template: Send + Sync {
    fn render(&self, params: &Value) -> Result<String, TemplateError>;
}

/// Plain closures work as templates, which keeps tests and embedders light.
impl<F> Template for F
where
    F: Fn(&Value) -> Result<String, TemplateError> + Send + Sync,
{
    fn render(&self, params: &Value) -> Result<String, TemplateError> {
        self(params)
    }
}

/// A Handlebars template in strict mode: referencing a missing parameter is
/// a render error, not an empty string.
pub struct HandlebarsTemplate {
    registry: Handlebars<'static>,
}

impl HandlebarsTemplate {
    pub fn from_source(source: &str) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_template_string(TEMPLATE_NAME, source)?;
        Ok(Self { registry })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded template from {}", path.display());
        Self::from_source(&source)
    }
}

impl fmt::Debug for HandlebarsTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlebarsTemplate")
            .field("strict", &self.registry.strict_mode())
            .finish()
    }
}

impl Template for HandlebarsTemplate {
    fn render(&self, params: &Value) -> Result<String, TemplateError> {
        Ok(self.registry.render(TEMPLATE_NAME, params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_escapes_values() {
        let template = HandlebarsTemplate::from_source("<p>{{name}}</p>").unwrap();
        assert_eq!(
            template.render(&json!({"name": "A & B"})).unwrap(),
            "<p>A &amp; B</p>"
        );
    }

    #[test]
    fn test_strict_mode_rejects_missing_parameters() {
        let template = HandlebarsTemplate::from_source("<p>{{missing}}</p>").unwrap();
        assert!(matches!(
            template.render(&json!({})),
            Err(TemplateError::Render(_))
        ));
    }

    #[test]
    fn test_syntax_errors_surface_at_load() {
        assert!(matches!(
            HandlebarsTemplate::from_source("{{#each rows}}"),
            Err(TemplateError::Syntax(_))
        ));
    }

    #[test]
    fn test_closures_are_templates() {
        let template = |params: &Value| -> Result<String, TemplateError> {
            Ok(format!("<n>{}</n>", params["n"]))
        };
        assert_eq!(template.render(&json!({"n": 3})).unwrap(), "<n>3</n>");
    }

    #[test]
    fn test_missing_file() {
        let err = HandlebarsTemplate::from_file("/nonexistent/doc.hbs").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/doc.hbs"));
    }
}
