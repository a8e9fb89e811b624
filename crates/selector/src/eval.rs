//! Evaluation of element paths against a [`Document`].
//!
//! Evaluation always starts from the root element and only ever yields
//! element nodes. Results come back in document order without duplicates.

use crate::path::{Axis, ElementPath, LocationPath, Predicate, Step};
use foprep_dom::{Document, NodeId};
use std::collections::HashSet;

impl ElementPath {
    /// Returns every element of `doc` matched by any alternative.
    pub fn select(&self, doc: &Document) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for path in &self.alternatives {
            for id in path.select(doc) {
                add_node(id, &mut seen, &mut results);
            }
        }
        results.sort_unstable();
        results
    }
}

impl LocationPath {
    pub fn select(&self, doc: &Document) -> Vec<NodeId> {
        let mut context = vec![doc.root()];
        for step in &self.steps {
            if context.is_empty() {
                break;
            }
            context = step.apply(doc, &context);
        }
        context
    }
}

impl Step {
    fn apply(&self, doc: &Document, context: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for &node in context {
            match self.axis {
                Axis::DescendantOrSelf => {
                    collect_descendant_or_self_nodes(doc, node, &mut seen, &mut candidates)
                }
                Axis::Descendant => collect_descendant_nodes(doc, node, &mut seen, &mut candidates),
                Axis::Child => collect_child_nodes(doc, node, &mut seen, &mut candidates),
                Axis::FollowingSibling => {
                    collect_following_sibling_nodes(doc, node, &mut seen, &mut candidates)
                }
                Axis::NextSibling => {
                    collect_next_sibling_node(doc, node, &mut seen, &mut candidates)
                }
            }
        }
        let mut matched: Vec<NodeId> = candidates
            .into_iter()
            .filter(|&id| self.accepts(doc, id))
            .collect();
        matched.sort_unstable();
        matched
    }

    fn accepts(&self, doc: &Document, id: NodeId) -> bool {
        let Some(element) = doc.element(id) else {
            return false;
        };
        self.test.matches(element.name()) && self.predicates.iter().all(|p| p.eval(doc, id))
    }
}

impl Predicate {
    pub fn eval(&self, doc: &Document, id: NodeId) -> bool {
        let Some(element) = doc.element(id) else {
            return false;
        };
        match self {
            Predicate::HasAttribute(name) => element.has_attribute(name),
            Predicate::AttributeEquals { name, value } => {
                element.attribute(name) == Some(value.as_str())
            }
            Predicate::AttributeIncludes { name, value } => element
                .attribute(name)
                .is_some_and(|v| v.split(is_xml_space).any(|word| word == value)),
            Predicate::AttributeDashMatch { name, value } => {
                element.attribute(name).is_some_and(|v| {
                    v == value
                        || v.strip_prefix(value.as_str())
                            .is_some_and(|rest| rest.starts_with('-'))
                })
            }
            Predicate::AttributeStartsWith { name, value } => element
                .attribute(name)
                .is_some_and(|v| v.starts_with(value.as_str())),
            Predicate::AttributeEndsWith { name, value } => element
                .attribute(name)
                .is_some_and(|v| v.ends_with(value.as_str())),
            Predicate::AttributeContains { name, value } => element
                .attribute(name)
                .is_some_and(|v| v.contains(value.as_str())),
            Predicate::Position {
                a,
                b,
                from_end,
                of_type,
            } => {
                let position = sibling_position(doc, id, *from_end, of_type.as_deref());
                crate::ast::Nth::new(*a, *b).matches(position)
            }
            Predicate::IsRoot => doc.parent(id).is_none(),
            Predicate::IsEmpty => doc.children(id).is_empty(),
            Predicate::TextContains(text) => doc.string_value(id).contains(text.as_str()),
            Predicate::Not { test, predicates } => {
                !(test.matches(element.name()) && predicates.iter().all(|p| p.eval(doc, id)))
            }
            Predicate::Never => false,
        }
    }
}

fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// One-based position of `id` among its element siblings (itself included),
/// optionally counting only siblings named `of_type`.
fn sibling_position(doc: &Document, id: NodeId, from_end: bool, of_type: Option<&str>) -> i32 {
    let Some(parent) = doc.parent(id) else {
        return 1;
    };
    let same_kind = |s: &NodeId| match of_type {
        Some(name) => doc.element(*s).is_some_and(|e| e.name() == name),
        None => true,
    };
    let siblings: Vec<NodeId> = doc.element_children(parent).filter(same_kind).collect();
    let index = siblings.iter().position(|&s| s == id).unwrap_or(0);
    let position = if from_end {
        siblings.len() - index
    } else {
        index + 1
    };
    i32::try_from(position).unwrap_or(i32::MAX)
}

// --- Axes ---

fn add_node(node: NodeId, seen: &mut HashSet<NodeId>, results: &mut Vec<NodeId>) {
    if seen.insert(node) {
        results.push(node);
    }
}

fn collect_child_nodes(
    doc: &Document,
    node: NodeId,
    seen: &mut HashSet<NodeId>,
    results: &mut Vec<NodeId>,
) {
    for child in doc.element_children(node) {
        add_node(child, seen, results);
    }
}

fn collect_descendant_nodes(
    doc: &Document,
    node: NodeId,
    seen: &mut HashSet<NodeId>,
    results: &mut Vec<NodeId>,
) {
    for descendant in doc.descendants(node) {
        if doc.is_element(descendant) {
            add_node(descendant, seen, results);
        }
    }
}

fn collect_descendant_or_self_nodes(
    doc: &Document,
    node: NodeId,
    seen: &mut HashSet<NodeId>,
    results: &mut Vec<NodeId>,
) {
    add_node(node, seen, results);
    collect_descendant_nodes(doc, node, seen, results);
}

fn collect_following_sibling_nodes(
    doc: &Document,
    node: NodeId,
    seen: &mut HashSet<NodeId>,
    results: &mut Vec<NodeId>,
) {
    if let Some(parent) = doc.parent(node) {
        for sibling in doc.element_children(parent).skip_while(|&s| s != node).skip(1) {
            add_node(sibling, seen, results);
        }
    }
}

fn collect_next_sibling_node(
    doc: &Document,
    node: NodeId,
    seen: &mut HashSet<NodeId>,
    results: &mut Vec<NodeId>,
) {
    if let Some(parent) = doc.parent(node) {
        if let Some(next) = doc.element_children(parent).skip_while(|&s| s != node).nth(1) {
            add_node(next, seen, results);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::translate::translate;
    use foprep_dom::{Document, NodeId};

    const SAMPLE: &str = r#"<doc>
  <h1 id="title" class="big  red">Report</h1>
  <p lang="en-GB">intro</p>
  <table>
    <tr class="hl"><td>1</td><td colspan="2">2</td></tr>
    <tr><td>3</td><td/></tr>
    <tr class="hl"><th>x</th><td>Total</td></tr>
  </table>
  <fo:block xmlns:fo="urn:fo">kept</fo:block>
</doc>"#;

    fn names(doc: &Document, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| {
                let name = doc.element(id).unwrap().name();
                let text = doc.string_value(id);
                if doc.element_children(id).next().is_none() && !text.is_empty() {
                    format!("{}:{}", name, text)
                } else {
                    name.to_string()
                }
            })
            .collect()
    }

    fn select(selector: &str) -> Vec<String> {
        let doc = Document::parse(SAMPLE).unwrap();
        let ids = translate(selector).unwrap().select(&doc);
        names(&doc, &ids)
    }

    #[test]
    fn test_descendant_or_self_includes_root() {
        assert_eq!(select("doc"), vec!["doc"]);
        assert_eq!(select(":root"), vec!["doc"]);
    }

    #[test]
    fn test_class_and_id() {
        assert_eq!(select(".red"), vec!["h1:Report"]);
        assert_eq!(select("#title.big"), vec!["h1:Report"]);
        assert_eq!(select("tr.hl").len(), 2);
        assert!(select(".re").is_empty());
    }

    #[test]
    fn test_combinators() {
        assert_eq!(select("tr.hl > td"), vec!["td:1", "td:2", "td:Total"]);
        assert_eq!(select("table td").len(), 5);
        assert_eq!(select("h1 + p"), vec!["p:intro"]);
        assert_eq!(select("h1 + table").len(), 0);
        assert_eq!(select("h1 ~ table"), vec!["table"]);
        assert_eq!(select("th + td"), vec!["td:Total"]);
    }

    #[test]
    fn test_attribute_operators() {
        assert_eq!(select("[colspan]"), vec!["td:2"]);
        assert_eq!(select("[lang|=en]"), vec!["p:intro"]);
        assert_eq!(select("[lang^=en-]"), vec!["p:intro"]);
        assert_eq!(select("[lang$=GB]"), vec!["p:intro"]);
        assert_eq!(select("[lang*=n-G]"), vec!["p:intro"]);
        assert_eq!(select("[class~=red]"), vec!["h1:Report"]);
        assert!(select("[lang=en]").is_empty());
    }

    #[test]
    fn test_structural_pseudo_classes() {
        assert_eq!(select("td:first-child"), vec!["td:1", "td:3"]);
        assert_eq!(select("td:last-child"), vec!["td:2", "td", "td:Total"]);
        assert_eq!(select("td:empty"), vec!["td"]);
        assert_eq!(select("tr:nth-child(2)").len(), 1);
        assert_eq!(select("tr:nth-last-child(odd)").len(), 2);
        assert_eq!(select("td:first-of-type"), vec!["td:1", "td:3", "td:Total"]);
        assert_eq!(select("th:only-of-type"), vec!["th:x"]);
        assert_eq!(select("td:only-child").len(), 0);
    }

    #[test]
    fn test_not_and_contains() {
        assert_eq!(select("tr:not(.hl) td"), vec!["td:3", "td"]);
        assert_eq!(select("td:contains('Tot')"), vec!["td:Total"]);
    }

    #[test]
    fn test_prefixed_names_match_verbatim() {
        assert_eq!(select("fo|block"), vec!["fo:block:kept"]);
        assert_eq!(select("fo|*"), vec!["fo:block:kept"]);
        assert!(select("block").is_empty());
    }

    #[test]
    fn test_group_results_are_in_document_order_without_duplicates() {
        assert_eq!(
            select("th, tr.hl > td:first-child, th"),
            vec!["td:1", "th:x"]
        );
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(select("TD").is_empty());
        assert!(select(".HL").is_empty());
    }
}
