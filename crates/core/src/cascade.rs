//! Inlines cascaded declarations onto the elements each rule matches.
//!
//! The cascade is order-only: rules run in the order the resolver produced
//! them and a later rule's value for a property overwrites an earlier one on
//! the same element. Selector specificity plays no part.

use crate::error::TransformError;
use crate::resolver::Rule;
use foprep_dom::Document;
use foprep_dom::name::is_ncname;
use foprep_selector::translate;

/// Applies `rules` to `doc` in order.
///
/// Each rule's query runs against the tree as left by the rules before it.
/// On error the document may be partially styled and must be discarded.
pub fn apply_rules(doc: &mut Document, rules: &[Rule]) -> Result<(), TransformError> {
    for rule in rules {
        apply_rule(doc, rule)?;
    }
    Ok(())
}

fn apply_rule(doc: &mut Document, rule: &Rule) -> Result<(), TransformError> {
    let path = translate(&rule.selector).map_err(|source| TransformError::SelectorTranslation {
        location: rule.origin.clone(),
        selector: rule.selector.clone(),
        source,
    })?;

    if let Some((name, _)) = rule
        .declarations
        .iter()
        .find(|(name, _)| !is_ncname(name))
    {
        return Err(TransformError::StyleDeclaration {
            location: rule.origin.clone(),
            message: format!(
                "property '{}' of '{}' is not a valid attribute name",
                name, rule.selector
            ),
        });
    }

    let matches = path.select(doc);
    log::trace!(
        "Rule '{}' -> {} matched {} element(s)",
        rule.selector,
        path,
        matches.len()
    );

    for id in matches {
        if let Some(element) = doc.element_mut(id) {
            for (name, value) in rule.declarations.iter() {
                element.set_attribute(name, value);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foprep_css::Declarations;

    fn rule(selector: &str, declarations: &[(&str, &str)]) -> Rule {
        Rule {
            selector: selector.to_string(),
            declarations: declarations.iter().copied().collect(),
            origin: "test.css".to_string(),
        }
    }

    fn attr(doc: &Document, tag: &str, name: &str) -> Option<String> {
        doc.elements()
            .filter_map(|id| doc.element(id))
            .find(|e| e.name() == tag)
            .and_then(|e| e.attribute(name).map(str::to_string))
    }

    #[test]
    fn test_later_rule_wins_per_property() {
        let mut doc = Document::parse(r#"<div class="a"/>"#).unwrap();
        apply_rules(
            &mut doc,
            &[rule(".a", &[("color", "red")]), rule(".a", &[("color", "blue")])],
        )
        .unwrap();
        assert_eq!(attr(&doc, "div", "color").as_deref(), Some("blue"));
    }

    #[test]
    fn test_specificity_is_ignored() {
        let mut doc = Document::parse(r#"<r><p id="x" class="a"/></r>"#).unwrap();
        apply_rules(
            &mut doc,
            &[rule("r > p#x.a", &[("color", "red")]), rule("p", &[("color", "blue")])],
        )
        .unwrap();
        assert_eq!(attr(&doc, "p", "color").as_deref(), Some("blue"));
    }

    #[test]
    fn test_disjoint_properties_union() {
        let mut doc = Document::parse(r#"<t><row class="a" id="r1"/></t>"#).unwrap();
        apply_rules(
            &mut doc,
            &[
                rule(".a", &[("color", "red")]),
                rule("#r1", &[("font-size", "10pt")]),
            ],
        )
        .unwrap();
        assert_eq!(attr(&doc, "row", "color").as_deref(), Some("red"));
        assert_eq!(attr(&doc, "row", "font-size").as_deref(), Some("10pt"));
    }

    #[test]
    fn test_later_rules_see_earlier_mutations() {
        let mut doc = Document::parse("<t><cell/><cell/></t>").unwrap();
        apply_rules(
            &mut doc,
            &[
                rule("cell:first-child", &[("border", "1pt")]),
                rule("[border]", &[("padding", "2pt")]),
            ],
        )
        .unwrap();
        let padded = doc
            .elements()
            .filter(|&id| doc.element(id).is_some_and(|e| e.has_attribute("padding")))
            .count();
        assert_eq!(padded, 1);
    }

    #[test]
    fn test_extreme_nth_offsets_match_nothing() {
        let mut doc = Document::parse("<tr><td/></tr>").unwrap();
        apply_rules(
            &mut doc,
            &[
                rule("td:nth-child(-2147483648)", &[("x", "1")]),
                rule("td:nth-last-of-type(-n+2147483647)", &[("y", "2")]),
            ],
        )
        .unwrap();
        assert_eq!(attr(&doc, "td", "x"), None);
        assert_eq!(attr(&doc, "td", "y").as_deref(), Some("2"));
    }

    #[test]
    fn test_declarations_overwrite_existing_attributes() {
        let mut doc = Document::parse(r#"<block color="black" lang="en"/>"#).unwrap();
        apply_rules(&mut doc, &[rule("block", &[("color", "white")])]).unwrap();
        assert_eq!(attr(&doc, "block", "color").as_deref(), Some("white"));
        assert_eq!(attr(&doc, "block", "lang").as_deref(), Some("en"));
    }

    #[test]
    fn test_untranslatable_selector_aborts() {
        let mut doc = Document::parse("<p/>").unwrap();
        let err = apply_rules(&mut doc, &[rule("p::before", &[("color", "red")])]).unwrap_err();
        match err {
            TransformError::SelectorTranslation {
                location, selector, ..
            } => {
                assert_eq!(location, "test.css");
                assert_eq!(selector, "p::before");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = apply_rules(&mut doc, &[rule("p >", &[("color", "red")])]).unwrap_err();
        assert_eq!(err.stage(), "selector-translation");
    }

    #[test]
    fn test_invalid_property_name_aborts_even_without_matches() {
        let mut doc = Document::parse("<p/>").unwrap();
        let err = apply_rules(&mut doc, &[rule("table", &[("-fo-x", "1")])]).unwrap_err();
        assert!(matches!(err, TransformError::StyleDeclaration { .. }));
    }

    #[test]
    fn test_empty_declarations_are_harmless() {
        let mut doc = Document::parse("<p/>").unwrap();
        let empty = Rule {
            selector: "p".into(),
            declarations: Declarations::new(),
            origin: "test.css".into(),
        };
        apply_rules(&mut doc, &[empty]).unwrap();
        assert_eq!(doc.element(doc.root()).unwrap().attribute_count(), 0);
    }
}
