//! Selector matching and specificity.
//!
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//!
//! Selectors are parsed once into a [`ParsedSelector`] and matched right to
//! left against nodes of a [`DomTree`]. Specificity is a single integer,
//! `100 × ids + 10 × (classes + attributes + pseudo-classes) + types`.

mod cache;
mod parse;

pub use cache::{SelectorCache, specificity};
pub use parse::parse_selector;

use kestrel_dom::{DomTree, ElementData, NodeId, NodeType};

/// Weight of one ID selector.
pub const ID_WEIGHT: u32 = 100;
/// Weight of one class, attribute or pseudo-class selector.
pub const CLASS_WEIGHT: u32 = 10;
/// Weight of one type selector or pseudo-element.
pub const TYPE_WEIGHT: u32 = 1;

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
///
/// A single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Example: `div`
    Type(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Example: `.nav-item`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Example: `#main`
    Id(String),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),

    /// A structural pseudo-class that can match in a static document.
    PseudoClass(PseudoClass),

    /// Any other pseudo-class (`:hover`, `:nth-child(2)`, ...). Never
    /// matches, but still weighs as a pseudo-class.
    UnsupportedPseudoClass(String),

    /// [§ 11 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
    ///
    /// `::before` and friends generate no boxes here, so they never match.
    PseudoElement(String),
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// "The :root pseudo-class represents an element that is the root of the
    /// document."
    Root,
    /// "first among its inclusive siblings"
    FirstChild,
    /// "last among its inclusive siblings"
    LastChild,
    /// "the first sibling of its type"
    FirstOfType,
    /// "the last sibling of its type"
    LastOfType,
    /// "an element that has no siblings"
    OnlyChild,
    /// No element siblings with the same tag name.
    OnlyOfType,
    /// No element children and no non-whitespace text.
    Empty,
    /// An `a` or `area` with an `href`. Every link counts as unvisited.
    Link,
}

impl PseudoClass {
    /// Look up a supported pseudo-class by lowercased name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "root" => Self::Root,
            "first-child" => Self::FirstChild,
            "last-child" => Self::LastChild,
            "first-of-type" => Self::FirstOfType,
            "last-of-type" => Self::LastOfType,
            "only-child" => Self::OnlyChild,
            "only-of-type" => Self::OnlyOfType,
            "empty" => Self::Empty,
            "link" => Self::Link,
            _ => return None,
        })
    }
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[att]`
    Exists(String),
    /// `[att=val]`: "whose value is exactly 'val'"
    Equals(String, String),
    /// `[att~=val]`: "a whitespace-separated list of words, one of which is
    /// exactly 'val'"
    Includes(String, String),
    /// `[att|=val]`: "either being exactly 'val' or beginning with 'val'
    /// immediately followed by '-'"
    DashMatch(String, String),
    /// `[att^=val]`: "begins with the prefix 'val'"
    PrefixMatch(String, String),
    /// `[att$=val]`: "ends with the suffix 'val'"
    SuffixMatch(String, String),
    /// `[att*=val]`: "contains at least one instance of the substring 'val'"
    SubstringMatch(String, String),
}

impl AttributeSelector {
    fn matches(&self, element: &ElementData) -> bool {
        let value = |name: &str| element.get_attribute(name);
        match self {
            Self::Exists(name) => value(name).is_some(),
            Self::Equals(name, val) => value(name) == Some(val.as_str()),
            Self::Includes(name, val) => {
                value(name).is_some_and(|v| v.split_ascii_whitespace().any(|w| w == val))
            }
            Self::DashMatch(name, val) => value(name).is_some_and(|v| {
                v == val || v.strip_prefix(val.as_str()).is_some_and(|r| r.starts_with('-'))
            }),
            Self::PrefixMatch(name, val) => {
                !val.is_empty() && value(name).is_some_and(|v| v.starts_with(val.as_str()))
            }
            Self::SuffixMatch(name, val) => {
                !val.is_empty() && value(name).is_some_and(|v| v.ends_with(val.as_str()))
            }
            Self::SubstringMatch(name, val) => {
                !val.is_empty() && value(name).is_some_and(|v| v.contains(val.as_str()))
            }
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Conditions that must all hold.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: "an arbitrary descendant of some ancestor element A".
    Descendant,
    /// `>`: "a direct child of element A".
    Child,
    /// `+`: "immediately follows element A".
    NextSibling,
    /// `~`: "follows element A (not necessarily immediately)".
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// `A > B C` is stored as subject `C` with combinators
/// `[(Descendant, B), (Child, A)]`: right to left, the order matching walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound; the element the selector selects.
    pub subject: CompoundSelector,
    /// `(combinator, compound)` pairs going left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        std::iter::once(&self.subject).chain(self.combinators.iter().map(|(_, c)| c))
    }
}

/// A parsed selector ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// The selector structure.
    pub complex: ComplexSelector,
    specificity: u32,
}

impl ParsedSelector {
    /// Wrap a complex selector, computing its specificity.
    #[must_use]
    pub fn new(complex: ComplexSelector) -> Self {
        let specificity = complex
            .compounds()
            .flat_map(|c| &c.simple_selectors)
            .map(SimpleSelector::weight)
            .sum();
        Self {
            complex,
            specificity,
        }
    }

    /// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
    #[must_use]
    pub const fn specificity(&self) -> u32 {
        self.specificity
    }

    /// Whether this selector has no combinators.
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        self.complex.combinators.is_empty()
    }

    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Match against `node`: the subject first, then each combinator step
    /// outward. Descendant and subsequent-sibling steps try every candidate,
    /// so `a b c` still matches when the nearest `b` has no `a` above it but
    /// a farther one does.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        compound_matches(&self.complex.subject, tree, node) && self.matches_from(tree, node, 0)
    }

    fn matches_from(&self, tree: &DomTree, node: NodeId, step: usize) -> bool {
        let Some((combinator, compound)) = self.complex.combinators.get(step) else {
            return true;
        };
        let next = |candidate: NodeId| {
            compound_matches(compound, tree, candidate)
                && self.matches_from(tree, candidate, step + 1)
        };
        match combinator {
            Combinator::Descendant => tree.ancestors(node).any(next),
            Combinator::Child => tree.parent(node).is_some_and(next),
            Combinator::NextSibling => previous_element_sibling(tree, node).is_some_and(next),
            Combinator::SubsequentSibling => tree
                .preceding_siblings(node)
                .filter(|&s| tree.as_element(s).is_some())
                .any(next),
        }
    }
}

impl SimpleSelector {
    /// Contribution to specificity.
    #[must_use]
    pub const fn weight(&self) -> u32 {
        match self {
            Self::Id(_) => ID_WEIGHT,
            Self::Class(_)
            | Self::Attribute(_)
            | Self::PseudoClass(_)
            | Self::UnsupportedPseudoClass(_) => CLASS_WEIGHT,
            Self::Type(_) | Self::PseudoElement(_) => TYPE_WEIGHT,
            Self::Universal => 0,
        }
    }

    fn matches(&self, tree: &DomTree, node: NodeId, element: &ElementData) -> bool {
        match self {
            Self::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            Self::Universal => true,
            Self::Class(class) => element.has_class(class),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Attribute(attr) => attr.matches(element),
            Self::PseudoClass(pc) => pseudo_class_matches(*pc, tree, node, element),
            Self::UnsupportedPseudoClass(_) | Self::PseudoElement(_) => false,
        }
    }
}

fn compound_matches(compound: &CompoundSelector, tree: &DomTree, node: NodeId) -> bool {
    let Some(element) = tree.as_element(node) else {
        return false;
    };
    compound
        .simple_selectors
        .iter()
        .all(|simple| simple.matches(tree, node, element))
}

/// Element siblings of `node` (including itself), in order.
fn element_siblings(tree: &DomTree, node: NodeId) -> Vec<NodeId> {
    tree.parent(node)
        .map(|parent| tree.element_children(parent).collect())
        .unwrap_or_default()
}

fn same_type_siblings(tree: &DomTree, node: NodeId, tag: &str) -> Vec<NodeId> {
    element_siblings(tree, node)
        .into_iter()
        .filter(|&s| tree.tag_name(s).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
        .collect()
}

fn pseudo_class_matches(
    pc: PseudoClass,
    tree: &DomTree,
    node: NodeId,
    element: &ElementData,
) -> bool {
    match pc {
        PseudoClass::Root => tree.document_element() == Some(node),
        PseudoClass::FirstChild => element_siblings(tree, node).first() == Some(&node),
        PseudoClass::LastChild => element_siblings(tree, node).last() == Some(&node),
        PseudoClass::OnlyChild => element_siblings(tree, node) == [node],
        PseudoClass::FirstOfType => {
            same_type_siblings(tree, node, &element.tag_name).first() == Some(&node)
        }
        PseudoClass::LastOfType => {
            same_type_siblings(tree, node, &element.tag_name).last() == Some(&node)
        }
        PseudoClass::OnlyOfType => same_type_siblings(tree, node, &element.tag_name) == [node],
        // [§ 4.5 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
        PseudoClass::Empty => tree.children(node).iter().all(|&c| {
            match tree.get(c).map(|n| &n.node_type) {
                Some(NodeType::Text(t)) => t.trim().is_empty(),
                Some(NodeType::Comment(_)) => true,
                _ => false,
            }
        }),
        PseudoClass::Link => {
            matches!(element.tag_name.as_str(), "a" | "area")
                && element.get_attribute("href").is_some()
        }
    }
}

/// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
/// Text and comment nodes between the two elements are skipped.
fn previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node)
        .find(|&s| tree.as_element(s).is_some())
}
