//! Markup tokenizer.
//!
//! A single forward scan over the input with one character of lookahead.
//! There is no error state: anything the scanner cannot make sense of
//! degrades to text or is skipped.

/// Token types produced by the tokenizer.
pub mod token;
/// The scanner itself.
pub mod scanner;

pub use token::{Attribute, Token};
pub use scanner::{HTMLTokenizer, tokenize};
