//! The arena tree: documents, nodes and elements.

use indexmap::IndexMap;

/// Index of a node inside its [`Document`] arena.
///
/// Ids are only meaningful for the document that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element: a raw (possibly prefixed) tag name and its attributes.
///
/// Attributes keep their source order; new attributes are appended and
/// overwriting an existing one keeps its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Sets an attribute, returning the value it replaced.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.attributes.insert(name.into(), value.into())
    }

    /// Removes an attribute without disturbing the order of the others.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed XML document with exactly one root element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Creates a document holding a single, empty root element.
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element(root),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    /// Appends a node as the last child of `parent` and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Appends text to `parent`, merging it into a trailing text child.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        let last = self.nodes[parent.0].children.last().copied();
        if let Some(last) = last {
            if let NodeKind::Text(existing) = &mut self.nodes[last.0].kind {
                existing.push_str(text);
                return;
            }
        }
        self.append(parent, NodeKind::Text(text.to_string()));
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes (elements and text).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id)? {
            NodeKind::Element(e) => Some(e),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(e) => Some(e),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child nodes that are elements, in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    /// Element siblings of `id` (excluding `id` itself), in document order.
    pub fn element_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.parent(id)
            .into_iter()
            .flat_map(move |p| self.element_children(p))
            .filter(move |&s| s != id)
    }

    /// All nodes below `id` in pre-order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Every element of the document in document order, root first.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|&id| self.is_element(id))
    }

    /// Concatenation of all descendant text, as XPath's `string()`.
    pub fn string_value(&self, id: NodeId) -> String {
        match self.kind(id) {
            Some(NodeKind::Text(t)) => t.clone(),
            Some(NodeKind::Element(_)) => self
                .descendants(id)
                .filter_map(|d| self.text(d))
                .collect(),
            None => String::new(),
        }
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'d> {
    doc: &'d Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new(Element::new("table"));
        let root = doc.root();
        let tr = doc.append(root, NodeKind::Element(Element::new("tr")));
        let td = doc.append(tr, NodeKind::Element(Element::new("td")));
        doc.append_text(td, "1");
        doc.append_text(td, "2");
        (doc, root, tr, td)
    }

    #[test]
    fn test_append_text_merges_adjacent_runs() {
        let (doc, _, _, td) = sample();
        assert_eq!(doc.children(td).len(), 1);
        assert_eq!(doc.string_value(td), "12");
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let (doc, root, tr, td) = sample();
        let order: Vec<NodeId> = doc.descendants(root).collect();
        assert_eq!(order[0], tr);
        assert_eq!(order[1], td);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_elements_skip_text() {
        let (doc, root, tr, td) = sample();
        assert_eq!(doc.elements().collect::<Vec<_>>(), vec![root, tr, td]);
    }

    #[test]
    fn test_attribute_overwrite_keeps_position() {
        let mut el = Element::new("td");
        el.set_attribute("a", "1");
        el.set_attribute("b", "2");
        assert_eq!(el.set_attribute("a", "3"), Some("1".to_string()));
        let attrs: Vec<_> = el.attributes().collect();
        assert_eq!(attrs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_remove_attribute_preserves_order() {
        let mut el = Element::new("td");
        el.set_attribute("a", "1");
        el.set_attribute("class", "x");
        el.set_attribute("b", "2");
        assert_eq!(el.remove_attribute("class").as_deref(), Some("x"));
        assert_eq!(el.remove_attribute("class"), None);
        let names: Vec<_> = el.attributes().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_element_siblings_exclude_self() {
        let mut doc = Document::new(Element::new("r"));
        let root = doc.root();
        let a = doc.append(root, NodeKind::Element(Element::new("a")));
        doc.append_text(root, " ");
        let b = doc.append(root, NodeKind::Element(Element::new("b")));
        assert_eq!(doc.element_siblings(a).collect::<Vec<_>>(), vec![b]);
        assert_eq!(doc.element_siblings(root).count(), 0);
    }
}
