//! Writes the finished tree as encoded bytes behind an XML 1.1 declaration.

use crate::config::NamespaceBinding;
use crate::error::TransformError;
use encoding_rs::Encoding;
use foprep_dom::Document;

/// Looks up an output encoding by its WHATWG label.
///
/// Encodings that cannot be produced by an encoder (UTF-16, `replacement`)
/// are rejected rather than silently swapped for UTF-8.
pub fn output_encoding(label: &str) -> Result<&'static Encoding, TransformError> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| TransformError::encoding(label, "unknown encoding label"))?;
    if encoding.output_encoding() != encoding {
        return Err(TransformError::encoding(
            label,
            format!("{} cannot be used for output", encoding.name()),
        ));
    }
    Ok(encoding)
}

/// Serializes `doc`, declaring `binding` on its root element.
///
/// Characters that have no representation in `encoding` are an error, in
/// markup and text alike.
pub fn serialize(
    mut doc: Document,
    binding: &NamespaceBinding,
    encoding: &'static Encoding,
) -> Result<Vec<u8>, TransformError> {
    let root = doc.root();
    if let Some(element) = doc.element_mut(root) {
        element.set_attribute(binding.declaration_name(), binding.uri.as_str());
    }

    let mut text = format!(
        "<?xml version=\"1.1\" encoding=\"{}\"?>\n",
        encoding.name()
    );
    let body = doc
        .to_xml()
        .map_err(|e| TransformError::encoding(encoding.name(), e.to_string()))?;
    text.push_str(&body);

    let (bytes, _, had_errors) = encoding.encode(&text);
    if had_errors {
        let offending = text
            .chars()
            .find(|c| {
                let mut buf = [0u8; 4];
                encoding.encode(c.encode_utf8(&mut buf)).2
            })
            .map(|c| format!("U+{:04X}", c as u32))
            .unwrap_or_default();
        return Err(TransformError::encoding(
            encoding.name(),
            format!("character {} is not representable", offending),
        ));
    }
    log::debug!("Serialized {} byte(s) as {}", bytes.len(), encoding.name());
    Ok(bytes.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(xml: &str) -> Document {
        Document::parse(xml).unwrap()
    }

    #[test]
    fn test_declaration_and_namespace_binding() {
        let out = serialize(
            doc("<fo:root><fo:block>x</fo:block></fo:root>"),
            &NamespaceBinding::default(),
            encoding_rs::UTF_8,
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<?xml version=\"1.1\" encoding=\"UTF-8\"?>\n\
             <fo:root xmlns:fo=\"http://www.w3.org/1999/XSL/Format\"><fo:block>x</fo:block></fo:root>"
        );
    }

    #[test]
    fn test_existing_binding_is_replaced() {
        let out = serialize(
            doc(r#"<fo:root xmlns:fo="urn:old" a="1"/>"#),
            &NamespaceBinding::new("fo", "urn:new"),
            encoding_rs::UTF_8,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with(r#"<fo:root xmlns:fo="urn:new" a="1"/>"#));
    }

    #[test]
    fn test_single_byte_encoding() {
        let encoding = output_encoding("latin1").unwrap();
        let out = serialize(doc("<p>café</p>"), &NamespaceBinding::default(), encoding).unwrap();
        assert!(out.starts_with(b"<?xml version=\"1.1\" encoding=\"windows-1252\"?>\n"));
        assert!(out.ends_with(b"caf\xE9</p>"));
    }

    #[test]
    fn test_unrepresentable_character_is_an_error() {
        let encoding = output_encoding("iso-8859-1").unwrap();
        let err = serialize(doc("<p>\u{2603}</p>"), &NamespaceBinding::default(), encoding)
            .unwrap_err();
        match err {
            TransformError::Encoding { message, .. } => assert!(message.contains("U+2603")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_output_encoding_labels() {
        assert_eq!(output_encoding("UTF-8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(output_encoding(" utf8 ").unwrap(), encoding_rs::UTF_8);
        assert_eq!(output_encoding("shift_jis").unwrap().name(), "Shift_JIS");
        assert!(matches!(
            output_encoding("no-such-charset"),
            Err(TransformError::Encoding { .. })
        ));
        assert!(matches!(
            output_encoding("utf-16le"),
            Err(TransformError::Encoding { .. })
        ));
    }
}
