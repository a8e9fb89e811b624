//! Builds a [`Document`] from XML text by driving a `quick_xml::Reader`.
//!
//! Comments and processing instructions are dropped, and the doctype only
//! contributes its internal general entities. CDATA sections become ordinary
//! text. Names are checked against the XML `QName` production and stored
//! verbatim.

use crate::doctype::{Entities, internal_entities, resolve_entity};
use crate::error::DomError;
use crate::name::{is_qname, is_xml_char};
use crate::tree::{Document, Element, NodeId, NodeKind};
use quick_xml::Reader;
use quick_xml::escape::{unescape, unescape_with};
use quick_xml::events::{BytesStart, Event as XmlEvent};

impl Document {
    /// Parses a well-formed XML document.
    pub fn parse(source: &str) -> Result<Self, DomError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);
        reader.config_mut().check_end_names = true;

        let mut doc: Option<Document> = None;
        let mut entities = Entities::new();
        // Open elements, innermost last. Empty once the root has been closed.
        let mut open: Vec<NodeId> = Vec::new();
        let mut buf = Vec::new();

        loop {
            let pos = reader.buffer_position();
            match reader.read_event_into(&mut buf) {
                Ok(XmlEvent::DocType(e)) => {
                    let body = std::str::from_utf8(e.as_ref())?;
                    entities = internal_entities(body).map_err(|message| DomError::Doctype {
                        position: pos,
                        message,
                    })?;
                }
                Ok(XmlEvent::Start(e)) => {
                    let element = read_element(&reader, &e, pos, &entities)?;
                    let id = attach_element(&mut doc, &open, element, pos)?;
                    open.push(id);
                }
                Ok(XmlEvent::Empty(e)) => {
                    let element = read_element(&reader, &e, pos, &entities)?;
                    attach_element(&mut doc, &open, element, pos)?;
                }
                Ok(XmlEvent::End(_)) => {
                    open.pop();
                }
                Ok(XmlEvent::Text(e)) => {
                    let raw = std::str::from_utf8(e.as_ref())?;
                    let text = unescape(raw).map_err(|err| DomError::Syntax {
                        position: pos,
                        source: err.into(),
                    })?;
                    check_chars(&text, pos)?;
                    push_text(&mut doc, &open, &text, pos)?;
                }
                Ok(XmlEvent::CData(e)) => {
                    let raw = std::str::from_utf8(e.as_ref())?;
                    check_chars(raw, pos)?;
                    push_text(&mut doc, &open, raw, pos)?;
                }
                Ok(XmlEvent::GeneralRef(e)) => {
                    let name = std::str::from_utf8(e.as_ref())?;
                    let reference = format!("&{};", name);
                    let resolved = unescape_with(&reference, |n| resolve_entity(&entities, n))
                        .map_err(|_| DomError::Reference {
                            reference: name.to_string(),
                            position: pos,
                        })?;
                    check_chars(&resolved, pos)?;
                    push_text(&mut doc, &open, &resolved, pos)?;
                }
                Ok(XmlEvent::Eof) => break,
                Ok(_) => {}
                Err(source) => {
                    return Err(DomError::Syntax {
                        position: reader.error_position(),
                        source,
                    });
                }
            }
            buf.clear();
        }

        if let Some(&unclosed) = open.last() {
            let name = doc
                .as_ref()
                .and_then(|d| d.element(unclosed))
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            return Err(DomError::Unclosed(name));
        }

        let doc = doc.ok_or(DomError::MissingRoot)?;
        log::trace!("Parsed XML document with {} nodes", doc.len());
        Ok(doc)
    }
}

fn read_element(
    reader: &Reader<&[u8]>,
    start: &BytesStart<'_>,
    pos: u64,
    entities: &Entities,
) -> Result<Element, DomError> {
    let name = checked_name(start.name().as_ref(), pos)?;
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DomError::Attribute {
            position: pos,
            message: e.to_string(),
        })?;
        let key = checked_name(attr.key.as_ref(), pos)?;
        let value = attr
            .decode_and_unescape_value_with(reader.decoder(), |n| resolve_entity(entities, n))
            .map_err(|e| DomError::Attribute {
                position: pos,
                message: e.to_string(),
            })?;
        check_chars(&value, pos)?;
        element.set_attribute(key, value.into_owned());
    }
    Ok(element)
}

fn checked_name(raw: &[u8], pos: u64) -> Result<String, DomError> {
    let name = std::str::from_utf8(raw)?;
    if !is_qname(name) {
        return Err(DomError::InvalidName {
            name: name.to_string(),
            position: pos,
        });
    }
    Ok(name.to_string())
}

fn check_chars(text: &str, pos: u64) -> Result<(), DomError> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(DomError::InvalidCharacter {
            code: u32::from(c),
            position: pos,
        }),
        None => Ok(()),
    }
}

/// Places a new element under the innermost open element, or makes it the
/// root when nothing has been seen yet.
fn attach_element(
    doc: &mut Option<Document>,
    open: &[NodeId],
    element: Element,
    pos: u64,
) -> Result<NodeId, DomError> {
    match (doc.as_mut(), open.last()) {
        (Some(d), Some(&parent)) => Ok(d.append(parent, NodeKind::Element(element))),
        (Some(_), None) => Err(DomError::TrailingContent(pos)),
        (None, _) => {
            let d = doc.insert(Document::new(element));
            Ok(d.root())
        }
    }
}

/// Text outside the root element may only be whitespace.
fn push_text(
    doc: &mut Option<Document>,
    open: &[NodeId],
    text: &str,
    pos: u64,
) -> Result<(), DomError> {
    match (doc.as_mut(), open.last()) {
        (Some(d), Some(&parent)) => {
            d.append_text(parent, text);
            Ok(())
        }
        _ if text.trim().is_empty() => Ok(()),
        (Some(_), None) => Err(DomError::TrailingContent(pos)),
        (None, _) => Err(DomError::MissingRoot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_prefixed_names_verbatim() {
        let doc = Document::parse(r#"<fo:root xmlns:fo="urn:x"><block/></fo:root>"#).unwrap();
        let root = doc.element(doc.root()).unwrap();
        assert_eq!(root.name(), "fo:root");
        assert_eq!(root.attribute("xmlns:fo"), Some("urn:x"));
        let child = doc.element_children(doc.root()).next().unwrap();
        assert_eq!(doc.element(child).unwrap().name(), "block");
    }

    #[test]
    fn test_parse_unescapes_text_and_attributes() {
        let doc = Document::parse(r#"<p title="a &amp; b">x &lt; y &#65;<![CDATA[<raw>]]></p>"#)
            .unwrap();
        let p = doc.element(doc.root()).unwrap();
        assert_eq!(p.attribute("title"), Some("a & b"));
        assert_eq!(doc.string_value(doc.root()), "x < y A<raw>");
        assert_eq!(doc.children(doc.root()).len(), 1);
    }

    #[test]
    fn test_parse_drops_comments_and_instructions() {
        let doc = Document::parse(
            "<?xml version=\"1.0\"?>\n<!-- head --><r><?pi x?><a/><!-- c --></r>\n",
        )
        .unwrap();
        assert_eq!(doc.children(doc.root()).len(), 1);
    }

    #[test]
    fn test_parse_rejects_mismatched_end_tag() {
        let err = Document::parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, DomError::Syntax { .. }));
    }

    #[test]
    fn test_parse_rejects_unclosed_root() {
        let err = Document::parse("<a><b/>").unwrap_err();
        assert!(matches!(err, DomError::Unclosed(name) if name == "a"));
    }

    #[test]
    fn test_parse_rejects_second_root() {
        let err = Document::parse("<a/><b/>").unwrap_err();
        assert!(matches!(err, DomError::TrailingContent(_)));
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(
            Document::parse("  \n").unwrap_err(),
            DomError::MissingRoot
        ));
    }

    #[test]
    fn test_parse_rejects_text_outside_root() {
        assert!(Document::parse("<a/>tail").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_entity() {
        assert!(matches!(
            Document::parse("<a>&nbsp;</a>").unwrap_err(),
            DomError::Reference { reference, .. } if reference == "nbsp"
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_element_names() {
        for source in ["<1a/>", "<:a/>", "<a:/>", "<a:b:c/>", "<r><-x/></r>"] {
            assert!(
                matches!(Document::parse(source), Err(DomError::InvalidName { .. })),
                "{source} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_invalid_attribute_names() {
        for source in [r#"<a 1x="v"/>"#, r#"<a :x="v"/>"#, r#"<a x:y:z="v"/>"#] {
            assert!(
                matches!(Document::parse(source), Err(DomError::InvalidName { .. })),
                "{source} should be rejected"
            );
        }
        assert!(Document::parse(r#"<a xml:lang="en" xmlns:fo="urn:fo"/>"#).is_ok());
    }

    #[test]
    fn test_parse_rejects_restricted_characters() {
        for source in [
            "<a>\u{1}</a>",
            "<a><![CDATA[\u{1F}]]></a>",
            "<a>&#1;</a>",
            "<a x=\"\u{8}\"/>",
            "<a>\u{FFFF}</a>",
        ] {
            assert!(
                matches!(
                    Document::parse(source),
                    Err(DomError::InvalidCharacter { .. })
                ),
                "{source:?} should be rejected"
            );
        }
        let doc = Document::parse("<a>\ttab\n</a>").unwrap();
        assert_eq!(doc.string_value(doc.root()), "\ttab\n");
    }

    #[test]
    fn test_parse_expands_internal_entities() {
        let doc = Document::parse(
            r#"<!DOCTYPE a [<!ENTITY x "y"><!ENTITY co "ACME &amp; Co">]><a t="&co;">&x;-&co;</a>"#,
        )
        .unwrap();
        assert_eq!(doc.string_value(doc.root()), "y-ACME & Co");
        assert_eq!(
            doc.element(doc.root()).unwrap().attribute("t"),
            Some("ACME & Co")
        );
    }

    #[test]
    fn test_parse_rejects_markup_entities() {
        let err = Document::parse(r#"<!DOCTYPE a [<!ENTITY x "<b/>">]><a>&x;</a>"#).unwrap_err();
        assert!(matches!(err, DomError::Doctype { .. }));
    }
}
