//! Serializes a [`Document`] back to XML text with `quick_xml::Writer`.
//!
//! No declaration is written; callers that need one prepend it.

use crate::error::DomError;
use crate::tree::{Document, Element, NodeId, NodeKind};
use quick_xml::Writer;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use std::io::Write;

impl Document {
    /// Writes the element tree rooted at [`Document::root`] as UTF-8.
    pub fn write_to<W: Write>(&self, out: W) -> Result<(), DomError> {
        let mut writer = Writer::new(out);
        self.write_node(&mut writer, self.root())?;
        Ok(())
    }

    /// Serializes the document into an owned string.
    pub fn to_xml(&self) -> Result<String, DomError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8(buf).map_err(|e| e.utf8_error())?)
    }

    /// Walks the tree with an explicit stack so nesting depth is bounded
    /// only by memory.
    fn write_node<W: Write>(&self, writer: &mut Writer<W>, id: NodeId) -> Result<(), DomError> {
        let mut pending = vec![Step::Open(id)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Open(id) => match self.kind(id) {
                    Some(NodeKind::Text(text)) => {
                        let escaped = partial_escape(text.as_str());
                        writer.write_event(XmlEvent::Text(BytesText::from_escaped(escaped)))?;
                    }
                    Some(NodeKind::Element(element)) => {
                        let start = start_tag(element);
                        let children = self.children(id);
                        if children.is_empty() {
                            writer.write_event(XmlEvent::Empty(start))?;
                        } else {
                            writer.write_event(XmlEvent::Start(start))?;
                            pending.push(Step::Close(id));
                            pending.extend(children.iter().rev().map(|&c| Step::Open(c)));
                        }
                    }
                    None => {}
                },
                Step::Close(id) => {
                    if let Some(element) = self.element(id) {
                        writer.write_event(XmlEvent::End(BytesEnd::new(element.name())))?;
                    }
                }
            }
        }
        Ok(())
    }
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Builds the start tag by hand so attribute whitespace survives a re-parse.
fn start_tag(element: &Element) -> BytesStart<'static> {
    let mut content = String::from(element.name());
    for (name, value) in element.attributes() {
        content.push(' ');
        content.push_str(name);
        content.push_str("=\"");
        content.push_str(&escape_attribute(value));
        content.push('"');
    }
    BytesStart::from_content(content, element.name().len())
}

fn escape_attribute(value: &str) -> String {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\t', '\r']) {
        return escaped.into_owned();
    }
    escaped
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
        .replace('\r', "&#13;")
}
