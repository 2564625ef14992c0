//! Stylesheet parsing.
//!
//! [CSS Syntax Module Level 3](https://www.w3.org/TR/css-syntax-3/)
//!
//! The parser works on text rather than a token stream: comments are
//! stripped, at-rules are peeled off, and the rest is cut into
//! `selectors { declarations }` blocks by brace-balanced scanning that
//! ignores braces inside quoted strings. Nothing here fails; a malformed
//! rule or declaration is dropped with a warning and parsing continues.

mod declarations;
mod media;
mod scan;
mod stylesheet;

pub use declarations::parse_declarations;
pub use media::evaluate_media_query;
pub use stylesheet::parse_stylesheet;

use std::fmt::Write as _;

use kestrel_dom::{DomTree, NodeId};
use serde::Serialize;

use crate::selector::{ParsedSelector, SelectorCache};
use crate::values::{StyleValue, ValueKind};

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// `property: value [!important]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    /// Lowercased property name.
    pub property: String,
    /// The classified value.
    pub value: StyleValue,
    /// Whether the declaration ended in `!important`.
    pub important: bool,
}

impl Declaration {
    /// Build a declaration from raw text.
    #[must_use]
    pub fn new(property: &str, value: &str, important: bool) -> Self {
        Self {
            property: property.trim().to_ascii_lowercase(),
            value: StyleValue::parse(value),
            important,
        }
    }
}

/// A style rule: a selector list and its declarations.
///
/// Each selector keeps its parse result and specificity so the cascade does
/// not reparse per node.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeRule {
    /// Selector texts as written, trimmed.
    pub selectors: Vec<String>,
    /// Parse result per selector; `None` for a selector this engine does not
    /// understand.
    #[serde(skip)]
    pub parsed: Vec<Option<ParsedSelector>>,
    /// Specificity per selector; 0 for invalid ones.
    pub specificities: Vec<u32>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

impl CascadeRule {
    /// Build a rule, parsing each selector through `cache`.
    #[must_use]
    pub fn new(
        selectors: Vec<String>,
        declarations: Vec<Declaration>,
        cache: &mut SelectorCache,
    ) -> Self {
        let parsed: Vec<Option<ParsedSelector>> =
            selectors.iter().map(|s| cache.get(s).cloned()).collect();
        let specificities = parsed
            .iter()
            .map(|p| p.as_ref().map_or(0, ParsedSelector::specificity))
            .collect();
        Self {
            selectors,
            parsed,
            specificities,
            declarations,
        }
    }

    /// The highest specificity among this rule's selectors that match
    /// `node`, or `None` if none match.
    #[must_use]
    pub fn matching_specificity(&self, tree: &DomTree, node: NodeId) -> Option<u32> {
        self.parsed
            .iter()
            .zip(&self.specificities)
            .filter(|(parsed, _)| parsed.as_ref().is_some_and(|p| p.matches(tree, node)))
            .map(|(_, &specificity)| specificity)
            .max()
    }
}

/// `@media <query> { rules }`
#[derive(Debug, Clone, Serialize)]
pub struct MediaRule {
    /// The query text, trimmed.
    pub query: String,
    /// Rules inside the block.
    pub rules: Vec<CascadeRule>,
}

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stylesheet {
    /// The first `@charset`, quotes removed.
    pub charset: Option<String>,
    /// `@import` targets in order.
    pub imports: Vec<String>,
    /// Top-level style rules in source order.
    pub rules: Vec<CascadeRule>,
    /// `@media` blocks in source order.
    pub media_rules: Vec<MediaRule>,
}

impl Stylesheet {
    /// Append `other` after this sheet's content. A charset already set is
    /// kept.
    pub fn append(&mut self, other: Self) {
        if self.charset.is_none() {
            self.charset = other.charset;
        }
        self.imports.extend(other.imports);
        self.rules.extend(other.rules);
        self.media_rules.extend(other.media_rules);
    }

    /// Whether the sheet has no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.media_rules.iter().all(|m| m.rules.is_empty())
    }

    /// Rules that apply at `viewport_width`: top-level rules in order, then
    /// the rules of each matching `@media` block.
    pub fn applicable_rules(&self, viewport_width: f32) -> impl Iterator<Item = &CascadeRule> {
        self.rules.iter().chain(
            self.media_rules
                .iter()
                .filter(move |m| evaluate_media_query(&m.query, viewport_width))
                .flat_map(|m| m.rules.iter()),
        )
    }

    /// Debug outline of the sheet.
    #[must_use]
    pub fn print_tree(&self) -> String {
        let mut out = String::from("Stylesheet\n");
        if let Some(charset) = &self.charset {
            let _ = writeln!(out, "  @charset \"{charset}\"");
        }
        for import in &self.imports {
            let _ = writeln!(out, "  @import \"{import}\"");
        }
        for (i, rule) in self.rules.iter().enumerate() {
            write_rule(&mut out, i + 1, rule, "  ");
        }
        for media in &self.media_rules {
            let _ = writeln!(out, "  @media {} ({} rules)", media.query, media.rules.len());
            for (i, rule) in media.rules.iter().enumerate() {
                write_rule(&mut out, i + 1, rule, "    ");
            }
        }
        out
    }
}

fn write_rule(out: &mut String, index: usize, rule: &CascadeRule, indent: &str) {
    let selectors: Vec<String> = rule
        .selectors
        .iter()
        .zip(&rule.specificities)
        .map(|(s, n)| format!("{s} [{n}]"))
        .collect();
    let _ = writeln!(out, "{indent}Rule {index}: {}", selectors.join(", "));
    for decl in &rule.declarations {
        let _ = writeln!(
            out,
            "{indent}  {}: {}{} ({})",
            decl.property,
            decl.value.raw,
            if decl.important { " !important" } else { "" },
            kind_name(&decl.value.kind),
        );
    }
}

const fn kind_name(kind: &ValueKind) -> &'static str {
    match kind {
        ValueKind::Keyword(_) => "keyword",
        ValueKind::Number(_) => "number",
        ValueKind::Length(..) => "length",
        ValueKind::Percentage(_) => "percentage",
        ValueKind::Color(_) => "color",
        ValueKind::Url(_) => "url",
        ValueKind::Str(_) => "string",
        ValueKind::Function { .. } => "function",
        ValueKind::KeywordList(_) => "keyword list",
    }
}
