/// Namespace URI of XSL Formatting Objects.
pub const XSL_FO_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Format";

/// Encoding used when neither the call nor the transformer names one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// The prefix every bare tag is qualified with, and the URI it is bound to on
/// the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    pub prefix: String,
    pub uri: String,
}

impl NamespaceBinding {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// The `xmlns:<prefix>` attribute name declaring this binding.
    pub fn declaration_name(&self) -> String {
        format!("xmlns:{}", self.prefix)
    }
}

impl Default for NamespaceBinding {
    fn default() -> Self {
        Self::new("fo", XSL_FO_NAMESPACE)
    }
}
