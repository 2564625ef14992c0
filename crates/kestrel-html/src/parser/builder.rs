use std::collections::BTreeMap;

use kestrel_common::warning::warn_once;
use kestrel_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

use super::tags::{is_raw_text, is_void};
use crate::entities::decode_entities;
use crate::tokenizer::{Attribute, HTMLTokenizer, Token};

/// A `<script>` element seen while parsing. Scripts are recorded, never run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptInfo {
    /// The `type` attribute, defaulting to `text/javascript`.
    pub script_type: String,
    /// The `src` attribute for external scripts.
    pub src: Option<String>,
    /// Trimmed inline source. Empty for external scripts.
    pub content: String,
    /// Whether `async` was present.
    pub is_async: bool,
    /// Whether `defer` was present.
    pub is_defer: bool,
}

/// A recovered markup error.
///
/// Malformed input never fails the parse; each recovery is recorded here
/// and reported once through [`warn_once`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What was wrong.
    pub message: String,
    /// Character offset into the input just after the offending token.
    pub position: usize,
}

/// Everything the tree builder produces for one document.
#[derive(Debug, Clone)]
pub struct ParsedHtml {
    /// The document tree.
    pub tree: DomTree,
    /// Decoded, trimmed text of the first `<title>`.
    pub title: Option<String>,
    /// `<meta>` values keyed by `charset`, `name`, `http-equiv-<x>` or `property`.
    pub metadata: BTreeMap<String, String>,
    /// Contents of every `<style>` element joined with `\n`, in document order.
    pub style_text: String,
    /// `href`s of `<link rel=stylesheet>` elements in declaration order.
    pub stylesheet_links: Vec<String>,
    /// Scripts in document order.
    pub scripts: Vec<ScriptInfo>,
    /// Recovered errors.
    pub issues: Vec<ParseIssue>,
}

impl ParsedHtml {
    /// The `lang` attribute of the root element.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        let html = self.tree.document_element()?;
        self.tree
            .as_element(html)?
            .get_attribute("lang")
            .filter(|lang| !lang.is_empty())
    }

    /// The declared character set, from `<meta charset>`.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.metadata.get("charset").map(String::as_str)
    }
}

/// Forgiving tree builder.
///
/// The document always gets an `html` element holding a `head` and a
/// `body`, whether or not the markup spells them out. Content is inserted
/// into the element on top of the open stack; an end tag pops back to the
/// nearest open element with the same name, and one that matches nothing is
/// ignored.
pub struct HTMLParser {
    tokenizer: HTMLTokenizer,
    tree: DomTree,
    html: NodeId,
    head: NodeId,
    body: NodeId,
    /// Stack of open elements. `html` is always at the bottom.
    stack: Vec<NodeId>,
    title: Option<String>,
    metadata: BTreeMap<String, String>,
    style_chunks: Vec<String>,
    stylesheet_links: Vec<String>,
    scripts: Vec<ScriptInfo>,
    issues: Vec<ParseIssue>,
}

impl HTMLParser {
    /// Create a parser over `input` with the `html`/`head`/`body` skeleton
    /// already in place.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.alloc(NodeType::Element(ElementData::new("html")));
        let head = tree.alloc(NodeType::Element(ElementData::new("head")));
        let body = tree.alloc(NodeType::Element(ElementData::new("body")));
        tree.append_child(NodeId::ROOT, html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tokenizer: HTMLTokenizer::new(input),
            tree,
            html,
            head,
            body,
            stack: vec![html, body],
            title: None,
            metadata: BTreeMap::new(),
            style_chunks: Vec::new(),
            stylesheet_links: Vec::new(),
            scripts: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Consume the whole input and return the finished document.
    #[must_use]
    pub fn run(mut self) -> ParsedHtml {
        loop {
            match self.tokenizer.next_token() {
                Token::EndOfInput => break,
                Token::Doctype(_) => {}
                Token::Comment(data) => {
                    let id = self.tree.alloc(NodeType::Comment(data));
                    self.tree.append_child(self.current(), id);
                }
                Token::Text(text) => self.insert_text(&text),
                Token::StartTag { name, attributes } => {
                    self.handle_start_tag(&name, attributes, false);
                }
                Token::SelfClosingTag { name, attributes } => {
                    self.handle_start_tag(&name, attributes, true);
                }
                Token::EndTag { name } => self.handle_end_tag(&name),
            }
        }

        ParsedHtml {
            tree: self.tree,
            title: self.title,
            metadata: self.metadata,
            style_text: self.style_chunks.join("\n"),
            stylesheet_links: self.stylesheet_links,
            scripts: self.scripts,
            issues: self.issues,
        }
    }

    /// The insertion parent: the top of the open stack.
    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.body)
    }

    fn reset_to_body(&mut self) {
        self.stack.clear();
        self.stack.push(self.html);
        self.stack.push(self.body);
    }

    /// Copy attributes onto one of the skeleton elements without
    /// overwriting what is already there.
    fn merge_attributes(&mut self, target: NodeId, attributes: &[Attribute]) {
        if let Some(data) = self.tree.as_element_mut(target) {
            for attr in attributes {
                let _ = data.set_attribute_if_absent(&attr.name, &attr.value);
            }
        }
    }

    fn handle_start_tag(&mut self, name: &str, attributes: Vec<Attribute>, self_closing: bool) {
        match name {
            "html" => {
                self.merge_attributes(self.html, &attributes);
                return;
            }
            "head" => {
                self.merge_attributes(self.head, &attributes);
                self.stack.clear();
                self.stack.push(self.html);
                self.stack.push(self.head);
                return;
            }
            "body" => {
                self.merge_attributes(self.body, &attributes);
                self.reset_to_body();
                return;
            }
            _ => {}
        }

        let attrs: AttributesMap = attributes
            .into_iter()
            .map(|attr| (attr.name, attr.value))
            .collect();
        let mut data = ElementData::with_attrs(name, attrs);
        enrich(&mut data);

        match name {
            "meta" => self.record_meta(&data),
            "link" => self.record_link(&data),
            _ => {}
        }

        let raw_text = if self_closing || !is_raw_text(name) {
            None
        } else {
            Some(self.tokenizer.consume_raw_text(name))
        };

        match name {
            "style" => {
                if let Some(text) = &raw_text {
                    self.style_chunks.push(text.clone());
                }
            }
            "script" => self.record_script(&data, raw_text.as_deref().unwrap_or_default()),
            "title" => {
                if self.title.is_none()
                    && let Some(text) = &raw_text
                {
                    self.title = Some(decode_entities(text).trim().to_string());
                }
            }
            _ => {}
        }

        let id = self.tree.alloc(NodeType::Element(data));
        self.tree.append_child(self.current(), id);

        if !self_closing && !is_void(name) && !is_raw_text(name) {
            self.stack.push(id);
        }
    }

    fn handle_end_tag(&mut self, name: &str) {
        if matches!(name, "head" | "body" | "html") {
            self.reset_to_body();
            return;
        }

        let open = self
            .stack
            .iter()
            .rposition(|&id| self.tree.is_element_named(id, name))
            .filter(|&index| index >= 1);

        match open {
            Some(index) => self.stack.truncate(index),
            None => {
                let message = format!("end tag </{name}> has no open element");
                warn_once("HTML", &message);
                self.issues.push(ParseIssue {
                    message,
                    position: self.tokenizer.position(),
                });
            }
        }
    }

    fn insert_text(&mut self, raw: &str) {
        let parent = self.current();
        let in_pre = self
            .stack
            .iter()
            .any(|&id| self.tree.is_element_named(id, "pre"));

        let mut text = decode_entities(raw).into_owned();
        if in_pre {
            text = text.replace('\t', "    ");
        }

        if !in_pre && text.chars().all(char::is_whitespace) {
            let after_element = self
                .tree
                .children(parent)
                .last()
                .is_some_and(|&last| self.tree.as_element(last).is_some());
            if parent == self.head || !after_element {
                return;
            }
        }

        if let Some(&last) = self.tree.children(parent).last()
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(existing) = &mut node.node_type
        {
            existing.push_str(&text);
            return;
        }

        let id = self.tree.alloc(NodeType::Text(text));
        self.tree.append_child(parent, id);
    }

    fn record_meta(&mut self, data: &ElementData) {
        if let Some(charset) = data.get_attribute("charset") {
            let _ = self
                .metadata
                .insert("charset".to_string(), charset.trim().to_string());
        }

        let Some(content) = data.get_attribute("content") else {
            return;
        };
        let key = if let Some(name) = data.get_attribute("name") {
            name.to_ascii_lowercase()
        } else if let Some(equiv) = data.get_attribute("http-equiv") {
            format!("http-equiv-{}", equiv.to_ascii_lowercase())
        } else if let Some(property) = data.get_attribute("property") {
            property.to_string()
        } else {
            return;
        };
        let _ = self.metadata.insert(key, content.to_string());
    }

    fn record_link(&mut self, data: &ElementData) {
        let is_stylesheet = data.get_attribute("rel").is_some_and(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        });
        if let Some(href) = data.get_attribute("href").map(str::trim)
            && is_stylesheet
            && !href.is_empty()
        {
            self.stylesheet_links.push(href.to_string());
        }
    }

    fn record_script(&mut self, data: &ElementData, raw: &str) {
        let src = data
            .get_attribute("src")
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(str::to_string);
        let content = if src.is_some() {
            String::new()
        } else {
            raw.trim().to_string()
        };

        self.scripts.push(ScriptInfo {
            script_type: data
                .get_attribute("type")
                .filter(|t| !t.is_empty())
                .unwrap_or("text/javascript")
                .to_string(),
            src,
            content,
            is_async: data.get_attribute("async").is_some(),
            is_defer: data.get_attribute("defer").is_some(),
        });
    }
}

/// Additive semantic attributes. Never overwrites what the author wrote.
fn enrich(data: &mut ElementData) {
    let tag = data.tag_name.clone();
    match tag.as_str() {
        "a" if data.attrs.contains_key("href") => {
            let _ = data.set_attribute_if_absent("role", "link");
        }
        "ul" | "ol" => {
            let _ = data.set_attribute_if_absent("role", "list");
        }
        "li" => {
            let _ = data.set_attribute_if_absent("role", "listitem");
        }
        "pre" | "code" => {
            let _ = data.set_attribute_if_absent("whitespace", "pre");
            let language = data.get_attribute("class").and_then(|list| {
                list.split_ascii_whitespace()
                    .find_map(|class| class.strip_prefix("language-"))
                    .filter(|lang| !lang.is_empty())
                    .map(str::to_string)
            });
            if let Some(language) = language {
                let _ = data.set_attribute_if_absent("data-highlight", &language);
            }
        }
        _ => {}
    }
}

/// Parse `input` into a document.
#[must_use]
pub fn parse(input: &str) -> ParsedHtml {
    HTMLParser::new(input).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrich_is_additive() {
        let mut data = ElementData::new("ul");
        let _ = data.attrs.insert("role".to_string(), "menu".to_string());
        enrich(&mut data);
        assert_eq!(data.get_attribute("role"), Some("menu"));
    }

    #[test]
    fn test_enrich_takes_first_language_class() {
        let mut data = ElementData::new("code");
        let _ = data
            .attrs
            .insert("class".to_string(), "x language-rust language-go".to_string());
        enrich(&mut data);
        assert_eq!(data.get_attribute("data-highlight"), Some("rust"));
        assert_eq!(data.get_attribute("whitespace"), Some("pre"));
    }

    #[test]
    fn test_anchor_without_href_is_not_a_link() {
        let mut data = ElementData::new("a");
        enrich(&mut data);
        assert_eq!(data.get_attribute("role"), None);
    }
}
