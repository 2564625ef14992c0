//! Tree construction.
//!
//! Turns the token stream into a [`kestrel_dom::DomTree`] and collects the
//! side channels the rest of the pipeline needs: inline style text,
//! stylesheet links, scripts, title and metadata.

mod builder;
/// Void and raw text element tables.
pub mod tags;

pub use builder::{HTMLParser, ParseIssue, ParsedHtml, ScriptInfo, parse};
