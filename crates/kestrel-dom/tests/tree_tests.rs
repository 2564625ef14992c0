//! Tests for tree queries: lookups, text content and sibling walks.

use kestrel_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType, print_tree};

/// Helper to allocate an element, optionally with an id, and attach it.
fn add_element(tree: &mut DomTree, parent: NodeId, tag: &str, id: Option<&str>) -> NodeId {
    let mut attrs = AttributesMap::new();
    if let Some(id_val) = id {
        let _ = attrs.insert("id".to_string(), id_val.to_string());
    }
    let node = tree.alloc(NodeType::Element(ElementData::with_attrs(tag, attrs)));
    tree.append_child(parent, node);
    node
}

fn add_text(tree: &mut DomTree, parent: NodeId, text: &str) -> NodeId {
    let node = tree.alloc(NodeType::Text(text.to_string()));
    tree.append_child(parent, node);
    node
}

/// html > (head, body > (div#a > span > "x", p > "y"))
fn sample_tree() -> DomTree {
    let mut tree = DomTree::new();
    let html = add_element(&mut tree, NodeId::ROOT, "html", None);
    let _head = add_element(&mut tree, html, "head", None);
    let body = add_element(&mut tree, html, "body", None);
    let div = add_element(&mut tree, body, "div", Some("a"));
    let span = add_element(&mut tree, div, "span", None);
    let _ = add_text(&mut tree, span, "x");
    let p = add_element(&mut tree, body, "p", None);
    let _ = add_text(&mut tree, p, "y");
    tree
}

#[test]
fn test_document_element_head_body() {
    let tree = sample_tree();
    let html = tree.document_element().unwrap();
    assert_eq!(tree.tag_name(html), Some("html"));
    assert_eq!(tree.tag_name(tree.head().unwrap()), Some("head"));
    assert_eq!(tree.tag_name(tree.body().unwrap()), Some("body"));
}

#[test]
fn test_get_element_by_id_and_text_content() {
    let tree = sample_tree();
    let div = tree.get_element_by_id("a").unwrap();
    assert_eq!(tree.tag_name(div), Some("div"));
    assert_eq!(tree.text_content(div), "x");
    assert_eq!(tree.text_content(tree.body().unwrap()), "xy");
    assert!(tree.get_element_by_id("missing").is_none());
}

#[test]
fn test_get_elements_by_tag_name_is_case_insensitive() {
    let tree = sample_tree();
    assert_eq!(tree.get_elements_by_tag_name("SPAN").len(), 1);
    assert_eq!(tree.get_elements_by_tag_name("section").len(), 0);
}

#[test]
fn test_sibling_iterators() {
    let mut tree = DomTree::new();
    let ul = add_element(&mut tree, NodeId::ROOT, "ul", None);
    let a = add_element(&mut tree, ul, "li", None);
    let b = add_element(&mut tree, ul, "li", None);
    let c = add_element(&mut tree, ul, "li", None);

    assert_eq!(tree.preceding_siblings(c).collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(tree.following_siblings(a).collect::<Vec<_>>(), vec![b, c]);
    assert_eq!(tree.preceding_siblings(a).count(), 0);
}

#[test]
fn test_ancestors_end_at_document() {
    let tree = sample_tree();
    let span = tree.get_elements_by_tag_name("span")[0];
    let tags: Vec<Option<&str>> = tree.ancestors(span).map(|id| tree.tag_name(id)).collect();
    assert_eq!(tags, vec![Some("div"), Some("body"), Some("html"), None]);
}

#[test]
fn test_print_tree_outline() {
    let tree = sample_tree();
    let dump = print_tree(&tree, NodeId::ROOT, 0);
    assert!(dump.starts_with("#document\n"));
    assert!(dump.contains("      <div id=\"a\">\n"));
    assert!(dump.contains("\"y\""));
}
