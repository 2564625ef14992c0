use strum_macros::Display;

/// A `name="value"` pair on a start tag.
///
/// Names are lowercased by the tokenizer; values are kept as written apart
/// from character reference decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Attribute value; empty for bare attributes like `disabled`.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// One unit of tokenizer output.
///
/// `Display` prints the variant name, which is what the CLI token listing
/// shows next to the `Debug` form.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Token {
    /// Character data between tags. A run made only of whitespace is
    /// reported as a single space.
    Text(String),
    /// `<name attr=value>`
    StartTag {
        /// Lowercased tag name.
        name: String,
        /// Attributes in source order, first occurrence of each name only.
        attributes: Vec<Attribute>,
    },
    /// `</name>`
    EndTag {
        /// Lowercased tag name.
        name: String,
    },
    /// `<name attr=value/>`
    SelfClosingTag {
        /// Lowercased tag name.
        name: String,
        /// Attributes in source order, first occurrence of each name only.
        attributes: Vec<Attribute>,
    },
    /// `<!--data-->`
    Comment(String),
    /// `<!DOCTYPE ...>`, holding everything between `<!` and `>` verbatim.
    Doctype(String),
    /// Returned for every call once the input is exhausted.
    EndOfInput,
}

impl Token {
    /// The tag name for start, end and self-closing tags.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. }
            | Self::EndTag { name }
            | Self::SelfClosingTag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Look up an attribute on a start or self-closing tag.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::StartTag { attributes, .. } | Self::SelfClosingTag { attributes, .. } => {
                attributes
                    .iter()
                    .find(|a| a.name == name)
                    .map(|a| a.value.as_str())
            }
            _ => None,
        }
    }
}
