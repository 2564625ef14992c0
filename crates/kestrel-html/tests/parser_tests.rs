//! Integration tests for the tree builder.

use kestrel_dom::{DomTree, NodeId, NodeType};
use kestrel_html::{ParsedHtml, parse, print_tree};

/// Helper to get the first element with `tag`, depth-first.
fn find_element(tree: &DomTree, tag: &str) -> Option<NodeId> {
    tree.get_elements_by_tag_name(tag).first().copied()
}

fn element_count(tree: &DomTree, tag: &str) -> usize {
    tree.get_elements_by_tag_name(tag).len()
}

fn body_children(parsed: &ParsedHtml) -> Vec<NodeId> {
    let body = parsed.tree.body().expect("body");
    parsed.tree.children(body).to_vec()
}

#[test]
fn test_document_structure() {
    let parsed = parse("<html><body><div id=a>x</div></body></html>");
    let tree = &parsed.tree;

    assert!(matches!(
        tree.get(NodeId::ROOT).map(|n| &n.node_type),
        Some(NodeType::Document)
    ));
    assert_eq!(element_count(tree, "html"), 1);
    assert_eq!(element_count(tree, "head"), 1);
    assert_eq!(element_count(tree, "body"), 1);

    let div = tree.get_element_by_id("a").expect("div#a");
    assert_eq!(tree.tag_name(div), Some("div"));
    assert_eq!(tree.parent(div), tree.body());
    assert_eq!(tree.text_content(div), "x");
}

#[test]
fn test_skeleton_is_synthesized() {
    let parsed = parse("hello");
    let tree = &parsed.tree;
    let html = tree.document_element().expect("html");
    assert_eq!(tree.children(NodeId::ROOT), &[html]);
    assert_eq!(tree.children(html), &[tree.head().unwrap(), tree.body().unwrap()]);
    assert_eq!(tree.text_content(tree.body().unwrap()), "hello");
}

#[test]
fn test_empty_input_still_has_skeleton() {
    let parsed = parse("");
    assert!(parsed.tree.head().is_some());
    assert!(parsed.tree.body().is_some());
    assert!(body_children(&parsed).is_empty());
}

#[test]
fn test_html_and_body_attributes_merge() {
    let parsed = parse(r#"<html lang="fr"><body class="dark"><p>x</p></body></html>"#);
    let tree = &parsed.tree;
    let body = tree.as_element(tree.body().unwrap()).unwrap();
    assert_eq!(body.get_attribute("class"), Some("dark"));
    assert_eq!(parsed.language(), Some("fr"));
}

#[test]
fn test_head_content_goes_into_head() {
    let parsed = parse(
        "<head><meta charset=utf-8><title>T</title></head><body><p>x</p></body>",
    );
    let tree = &parsed.tree;
    let head = tree.head().unwrap();
    let head_tags: Vec<_> = tree
        .element_children(head)
        .filter_map(|id| tree.tag_name(id))
        .collect();
    assert_eq!(head_tags, vec!["meta", "title"]);
    assert_eq!(parsed.charset(), Some("utf-8"));
    assert_eq!(parsed.title.as_deref(), Some("T"));
}

#[test]
fn test_void_elements_are_not_pushed() {
    let parsed = parse("<p>a<br>b<img src=x.png>c</p>");
    let tree = &parsed.tree;
    let p = find_element(tree, "p").unwrap();
    assert_eq!(tree.children(p).len(), 5);
    assert!(tree.children(find_element(tree, "br").unwrap()).is_empty());
    assert_eq!(tree.text_content(p), "abc");
}

#[test]
fn test_self_closing_tag_is_not_pushed() {
    let parsed = parse("<div/><span>x</span>");
    let children = body_children(&parsed);
    assert_eq!(children.len(), 2);
    assert_eq!(parsed.tree.tag_name(children[1]), Some("span"));
}

#[test]
fn test_end_tag_pops_through_match() {
    let parsed = parse("<div><p><b>x</div><span>y</span>");
    let tree = &parsed.tree;
    let span = find_element(tree, "span").unwrap();
    assert_eq!(tree.parent(span), tree.body());
}

#[test]
fn test_unmatched_end_tag_is_ignored_and_recorded() {
    let parsed = parse("<div>a</span>b</div>");
    let tree = &parsed.tree;
    let div = find_element(tree, "div").unwrap();
    assert_eq!(tree.text_content(div), "ab");
    assert_eq!(tree.children(div).len(), 1);
    assert_eq!(parsed.issues.len(), 1);
    assert!(parsed.issues[0].message.contains("</span>"));
}

#[test]
fn test_trailing_content_after_body_lands_in_body() {
    let parsed = parse("<body><p>a</p></body></html><p>b</p>");
    assert_eq!(element_count(&parsed.tree, "p"), 2);
    for p in parsed.tree.get_elements_by_tag_name("p") {
        assert_eq!(parsed.tree.parent(p), parsed.tree.body());
    }
}

#[test]
fn test_text_entities_are_decoded() {
    let parsed = parse("<p>Tom &amp; Jerry &#8212; &copy;</p>");
    let p = find_element(&parsed.tree, "p").unwrap();
    assert_eq!(parsed.tree.text_content(p), "Tom & Jerry \u{2014} \u{00A9}");
}

#[test]
fn test_adjacent_text_is_merged() {
    let parsed = parse("<p>a &lt; b</p>");
    let p = find_element(&parsed.tree, "p").unwrap();
    assert_eq!(parsed.tree.children(p).len(), 1);
    assert_eq!(parsed.tree.as_text(parsed.tree.children(p)[0]), Some("a < b"));
}

#[test]
fn test_leading_whitespace_is_dropped() {
    let parsed = parse("<div> <span>x</span> <span>y</span> </div>");
    let tree = &parsed.tree;
    let div = find_element(tree, "div").unwrap();
    let kinds: Vec<bool> = tree
        .children(div)
        .iter()
        .map(|&c| tree.as_text(c).is_some())
        .collect();
    assert_eq!(kinds, vec![false, true, false, true]);
}

#[test]
fn test_pre_keeps_whitespace_and_expands_tabs() {
    let parsed = parse("<pre>\tline</pre>");
    let pre = find_element(&parsed.tree, "pre").unwrap();
    assert_eq!(parsed.tree.text_content(pre), "    line");
}

#[test]
fn test_comments_become_nodes() {
    let parsed = parse("<div><!--c--></div>");
    let div = find_element(&parsed.tree, "div").unwrap();
    let child = parsed.tree.children(div)[0];
    assert!(matches!(
        parsed.tree.get(child).map(|n| &n.node_type),
        Some(NodeType::Comment(c)) if c == "c"
    ));
}

#[test]
fn test_style_text_is_collected_in_order() {
    let parsed = parse(
        "<style>p { color: red; }</style><p>x</p><style>div > p { margin: 0 }</style>",
    );
    assert_eq!(parsed.style_text, "p { color: red; }\ndiv > p { margin: 0 }");
    let style = find_element(&parsed.tree, "style").unwrap();
    assert!(parsed.tree.children(style).is_empty());
}

#[test]
fn test_style_contents_are_not_markup() {
    let parsed = parse("<style>a::after { content: '<b>'; }</style><i>x</i>");
    assert_eq!(element_count(&parsed.tree, "b"), 0);
    assert_eq!(element_count(&parsed.tree, "i"), 1);
}

#[test]
fn test_scripts_are_recorded_not_decoded() {
    let parsed = parse(
        r#"<script>
  if (a &amp;&amp; b < c) {}
</script><script src="app.js" async defer>ignored</script><script type="module"></script>"#,
    );
    assert_eq!(parsed.scripts.len(), 3);
    assert_eq!(parsed.scripts[0].content, "if (a &amp;&amp; b < c) {}");
    assert_eq!(parsed.scripts[0].script_type, "text/javascript");
    assert_eq!(parsed.scripts[1].src.as_deref(), Some("app.js"));
    assert!(parsed.scripts[1].content.is_empty());
    assert!(parsed.scripts[1].is_async && parsed.scripts[1].is_defer);
    assert_eq!(parsed.scripts[2].script_type, "module");
}

#[test]
fn test_first_title_wins_and_is_decoded() {
    let parsed = parse("<title>  A &amp; B </title><title>second</title>");
    assert_eq!(parsed.title.as_deref(), Some("A & B"));
}

#[test]
fn test_metadata_keys() {
    let parsed = parse(
        r#"<meta name="Description" content="d">
<meta http-equiv="Refresh" content="5">
<meta property="og:title" content="t">
<meta name="empty">"#,
    );
    assert_eq!(parsed.metadata.get("description").map(String::as_str), Some("d"));
    assert_eq!(parsed.metadata.get("http-equiv-refresh").map(String::as_str), Some("5"));
    assert_eq!(parsed.metadata.get("og:title").map(String::as_str), Some("t"));
    assert_eq!(parsed.metadata.len(), 3);
}

#[test]
fn test_stylesheet_links_in_declaration_order() {
    let parsed = parse(
        r#"<link rel="stylesheet" href="a.css">
<link rel="icon" href="fav.ico">
<link rel="Alternate StyleSheet" href="b.css">
<link rel="stylesheet" href="">
<link rel=stylesheet href=c.css />"#,
    );
    assert_eq!(parsed.stylesheet_links, vec!["a.css", "b.css", "c.css"]);
}

#[test]
fn test_semantic_enrichment() {
    let parsed = parse(
        r#"<a href="/x">x</a><ul><li>i</li></ul><ol role="tablist"></ol><pre class="language-rust">fn</pre>"#,
    );
    let tree = &parsed.tree;
    let attr = |tag: &str, name: &str| {
        let id = find_element(tree, tag).unwrap();
        tree.as_element(id)
            .unwrap()
            .get_attribute(name)
            .map(str::to_string)
    };
    assert_eq!(attr("a", "role").as_deref(), Some("link"));
    assert_eq!(attr("ul", "role").as_deref(), Some("list"));
    assert_eq!(attr("li", "role").as_deref(), Some("listitem"));
    assert_eq!(attr("ol", "role").as_deref(), Some("tablist"));
    assert_eq!(attr("pre", "whitespace").as_deref(), Some("pre"));
    assert_eq!(attr("pre", "data-highlight").as_deref(), Some("rust"));
}

#[test]
fn test_print_tree_outline() {
    let parsed = parse("<p class=x>hi</p>");
    let dump = print_tree(&parsed.tree, NodeId::ROOT, 0);
    assert!(dump.starts_with("#document\n  <html>\n    <head>\n    <body>\n"));
    assert!(dump.contains("      <p class=\"x\">\n        \"hi\"\n"));
}
