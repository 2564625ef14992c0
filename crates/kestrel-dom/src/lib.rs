//! Node tree for the Kestrel render core.
//!
//! The tree is an arena: every node lives in one `Vec` and refers to its
//! parent, children and siblings through [`NodeId`] indices. Child lists are
//! the only ownership edges; the parent link is a plain index resolved
//! through the arena, so no reference cycles can form.
//!
//! [DOM Living Standard § 4 Nodes](https://dom.spec.whatwg.org/#nodes)

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use serde::Serialize;

/// Map of attribute names to raw values for an element.
///
/// Ordered so that debug dumps and serialized output are stable.
pub type AttributesMap = BTreeMap<String, String>;

/// Index of a node inside a [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "An object that participates in a tree has a parent, which is either
/// null or an object, and has children, which is an ordered set of objects."
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is.
    pub node_type: NodeType,
    /// Non-owning link to the parent; `None` for the document and for
    /// allocated-but-detached nodes.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// The node immediately following this one in its parent's children.
    pub next_sibling: Option<NodeId>,
    /// The node immediately preceding this one in its parent's children.
    pub prev_sibling: Option<NodeId>,
}

/// Closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// The document node at [`NodeId::ROOT`].
    Document,
    /// An element with a lowercased tag name and attributes.
    Element(ElementData),
    /// A run of character data.
    Text(String),
    /// A comment; kept in the tree but never rendered.
    Comment(String),
}

/// Element-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercased local name.
    pub tag_name: String,
    /// Attribute name to raw value.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create an element with no attributes.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: AttributesMap::new(),
        }
    }

    /// Create an element with the given attributes.
    #[must_use]
    pub fn with_attrs(tag_name: &str, attrs: AttributesMap) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
        }
    }

    /// The `id` attribute, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").map(String::as_str)
    }

    /// [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes)
    ///
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens."
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.attrs
            .get("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether `class` contains `name` as one of its tokens.
    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.attrs
            .get("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == name))
    }

    /// Look up an attribute by (lowercase) name.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Set an attribute only if the element does not already carry it.
    ///
    /// Returns whether the attribute was added.
    pub fn set_attribute_if_absent(&mut self, name: &str, value: &str) -> bool {
        if self.attrs.contains_key(name) {
            return false;
        }
        let _ = self.attrs.insert(name.to_string(), value.to_string());
        true
    }
}

/// Arena-backed document tree.
///
/// The document node is always at [`NodeId::ROOT`]. Nodes are never freed;
/// a tree is built once per navigation and dropped as a whole.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
                next_sibling: None,
                prev_sibling: None,
            }],
        }
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a node mutably by id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a tree built with [`DomTree::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node and return its id.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// [§ 4.2.3 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Append `child` as the last child of `parent`. Ids that are out of
    /// range, a child that is already attached, or `child == parent` leave
    /// the tree unchanged.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return;
        }
        if self.nodes[child.0].parent.is_some() || child == NodeId::ROOT {
            return;
        }

        let prev_last = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev) = prev_last {
            self.nodes[prev.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev);
        }
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node, in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Element children of a node, in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.as_element(c).is_some())
    }

    /// Next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Ancestors from the parent up to and including the document node.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Siblings before `id`, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
            forward: false,
        }
    }

    /// Siblings after `id`, nearest first.
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.next_sibling(id),
            forward: true,
        }
    }

    /// Pre-order walk of `id` and everything below it.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: if self.get(id).is_some() { vec![id] } else { Vec::new() },
        }
    }

    /// Element data, if `id` is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Mutable element data, if `id` is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Character data, if `id` is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Tag name, if `id` is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag_name.as_str())
    }

    /// Whether `id` is an element with the given tag name.
    #[must_use]
    pub fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id) == Some(tag)
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }

    /// First `head` child of the document element.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|&id| self.is_element_named(id, "head"))
    }

    /// First `body` child of the document element.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|&id| self.is_element_named(id, "body"))
    }

    /// First element in tree order whose `id` attribute equals `id`.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .find(|&n| self.as_element(n).and_then(ElementData::id) == Some(id))
    }

    /// All elements with the given tag name, in tree order.
    #[must_use]
    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.descendants(NodeId::ROOT)
            .filter(|&n| self.is_element_named(n, &tag))
            .collect()
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Concatenation of all descendant text nodes, in tree order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| self.as_text(n))
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over the siblings of a node in one direction.
pub struct SiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
    forward: bool,
}

impl Iterator for SiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = if self.forward {
            self.tree.next_sibling(id)
        } else {
            self.tree.prev_sibling(id)
        };
        Some(id)
    }
}

/// Pre-order iterator over a subtree, driven by an explicit stack.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Render the subtree at `id` as an indented outline, one node per line.
#[must_use]
pub fn print_tree(tree: &DomTree, id: NodeId, depth: usize) -> String {
    let mut out = String::new();
    write_node(tree, id, depth, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    let indent = "  ".repeat(depth);

    match &node.node_type {
        NodeType::Document => {
            let _ = writeln!(out, "{indent}#document");
        }
        NodeType::Element(data) => {
            let _ = write!(out, "{indent}<{}", data.tag_name);
            for (name, value) in &data.attrs {
                let _ = write!(out, " {name}=\"{value}\"");
            }
            let _ = writeln!(out, ">");
        }
        NodeType::Text(text) => {
            let _ = writeln!(out, "{indent}\"{}\"", text.escape_debug());
        }
        NodeType::Comment(text) => {
            let _ = writeln!(out, "{indent}<!--{text}-->");
        }
    }

    for &child in &node.children {
        write_node(tree, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut DomTree, tag: &str) -> NodeId {
        tree.alloc(NodeType::Element(ElementData::new(tag)))
    }

    #[test]
    fn test_append_links_siblings() {
        let mut tree = DomTree::new();
        let div = element(&mut tree, "div");
        tree.append_child(NodeId::ROOT, div);
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.append_child(div, a);
        tree.append_child(div, b);

        assert_eq!(tree.children(div), &[a, b]);
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.parent(b), Some(div));
    }

    #[test]
    fn test_append_refuses_second_parent() {
        let mut tree = DomTree::new();
        let a = element(&mut tree, "div");
        let b = element(&mut tree, "div");
        let c = element(&mut tree, "span");
        tree.append_child(a, c);
        tree.append_child(b, c);

        assert_eq!(tree.parent(c), Some(a));
        assert!(tree.children(b).is_empty());
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut tree = DomTree::new();
        let html = element(&mut tree, "html");
        let head = element(&mut tree, "head");
        let body = element(&mut tree, "body");
        let p = element(&mut tree, "p");
        tree.append_child(NodeId::ROOT, html);
        tree.append_child(html, head);
        tree.append_child(html, body);
        tree.append_child(body, p);

        let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
        assert_eq!(order, vec![NodeId::ROOT, html, head, body, p]);
    }

    #[test]
    fn test_class_tokens() {
        let mut data = ElementData::new("DIV");
        let _ = data.attrs.insert("class".into(), "  a\tb  a ".into());
        assert_eq!(data.tag_name, "div");
        assert!(data.has_class("a"));
        assert!(data.has_class("b"));
        assert!(!data.has_class(""));
        assert_eq!(data.classes().len(), 2);
    }
}
