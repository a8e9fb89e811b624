//! Qualifies bare tag names with the target namespace prefix.
//!
//! The check is syntactic: any tag containing `:` counts as qualified and is
//! left alone, whether or not its prefix is declared anywhere.

use crate::config::NamespaceBinding;
use foprep_dom::Document;

/// Returns the qualified form of `tag`, or `None` if it is already qualified.
pub fn qualify_name(tag: &str, prefix: &str) -> Option<String> {
    if tag.contains(':') {
        None
    } else {
        Some(format!("{}:{}", prefix, tag))
    }
}

/// Renames every bare element of `doc`; returns how many were renamed.
pub fn qualify_elements(doc: &mut Document, binding: &NamespaceBinding) -> usize {
    let ids: Vec<_> = doc.elements().collect();
    let mut renamed = 0;
    for id in ids {
        if let Some(element) = doc.element_mut(id)
            && let Some(qualified) = qualify_name(element.name(), &binding.prefix)
        {
            element.set_name(qualified);
            renamed += 1;
        }
    }
    log::trace!("Qualified {} element(s) with '{}'", renamed, binding.prefix);
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_name() {
        assert_eq!(qualify_name("row", "fo").as_deref(), Some("fo:row"));
        assert_eq!(qualify_name("svg:rect", "fo"), None);
        assert_eq!(qualify_name("fo:block", "fo"), None);
    }

    #[test]
    fn test_bare_tags_are_prefixed_and_qualified_tags_kept() {
        let mut doc = Document::parse(
            r#"<root xmlns:svg="urn:svg"><row>text</row><svg:rect/><fo:block/></root>"#,
        )
        .unwrap();
        assert_eq!(qualify_elements(&mut doc, &NamespaceBinding::default()), 2);
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<fo:root xmlns:svg="urn:svg"><fo:row>text</fo:row><svg:rect/><fo:block/></fo:root>"#
        );
    }

    #[test]
    fn test_custom_prefix() {
        let mut doc = Document::parse("<a><b/></a>").unwrap();
        qualify_elements(&mut doc, &NamespaceBinding::new("x", "urn:x"));
        assert_eq!(doc.to_xml().unwrap(), "<x:a><x:b/></x:a>");
    }

    #[test]
    fn test_rewriting_twice_changes_nothing() {
        let mut doc = Document::parse("<a><b/></a>").unwrap();
        let binding = NamespaceBinding::default();
        qualify_elements(&mut doc, &binding);
        assert_eq!(qualify_elements(&mut doc, &binding), 0);
    }
}
