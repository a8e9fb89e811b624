//! Removes `class` attributes once their styles have been inlined.

use foprep_dom::Document;

/// Strips `class` from every element; returns how many carried one.
pub fn strip_classes(doc: &mut Document) -> usize {
    let ids: Vec<_> = doc.elements().collect();
    let mut removed = 0;
    for id in ids {
        if let Some(element) = doc.element_mut(id)
            && element.remove_attribute("class").is_some()
        {
            removed += 1;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_every_class_attribute() {
        let mut doc =
            Document::parse(r#"<a class="x"><b class=""/><c id="c"><d class="y z"/></c></a>"#)
                .unwrap();
        assert_eq!(strip_classes(&mut doc), 3);
        assert!(
            doc.elements()
                .all(|id| !doc.element(id).unwrap().has_attribute("class"))
        );
        assert_eq!(doc.to_xml().unwrap(), r#"<a><b/><c id="c"><d/></c></a>"#);
    }

    #[test]
    fn test_no_classes_is_a_no_op() {
        let mut doc = Document::parse("<a><b/></a>").unwrap();
        assert_eq!(strip_classes(&mut doc), 0);
        assert_eq!(doc.to_xml().unwrap(), "<a><b/></a>");
    }

    #[test]
    fn test_prefixed_class_attributes_are_kept() {
        let mut doc = Document::parse(r#"<a x:class="k"/>"#).unwrap();
        assert_eq!(strip_classes(&mut doc), 0);
    }
}
