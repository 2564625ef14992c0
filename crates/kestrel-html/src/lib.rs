//! Markup tokenizer and tree builder for the Kestrel render core.
//!
//! # Scope
//!
//! - **Tokenizer**: a single forgiving scan producing start, end and
//!   self-closing tags, text, comments and DOCTYPEs. Raw text elements
//!   (`script`, `style`, `title`) are consumed on request of the parser.
//! - **Character references**: common named references plus decimal and
//!   hex numeric forms.
//! - **Tree builder**: a synthetic `html`/`head`/`body` skeleton, a stack of
//!   open elements with void-element handling, and additive semantic
//!   attributes (`role`, `whitespace`, `data-highlight`).
//!
//! # Not Implemented
//!
//! - The WHATWG insertion modes and the adoption agency algorithm
//! - Foreign content (SVG, MathML)
//! - Script execution

/// Character reference decoding.
pub mod entities;
/// Tree construction.
pub mod parser;
/// Markup tokenizer.
pub mod tokenizer;

pub use entities::decode_entities;
pub use kestrel_dom::print_tree;
pub use parser::{HTMLParser, ParseIssue, ParsedHtml, ScriptInfo, parse};
pub use tokenizer::{Attribute, HTMLTokenizer, Token, tokenize};
