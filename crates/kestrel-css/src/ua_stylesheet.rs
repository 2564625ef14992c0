//! User-Agent defaults.
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! Two layers: [`base_defaults`], the initial value every element starts
//! from, and [`ua_stylesheet`], tag-specific rules matched like any other
//! sheet but below every author rule.

use std::sync::OnceLock;

use crate::parser::{Stylesheet, parse_stylesheet};
use crate::style::ComputedStyle;
use crate::values::StyleValue;

/// Initial values for every element.
const BASE_DEFAULTS: &[(&str, &str)] = &[
    ("background-color", "transparent"),
    ("color", "#000000"),
    ("cursor", "auto"),
    ("display", "block"),
    ("font-family", "sans-serif"),
    ("font-size", "16px"),
    ("font-style", "normal"),
    ("font-weight", "normal"),
    ("letter-spacing", "normal"),
    ("line-height", "normal"),
    ("list-style-position", "outside"),
    ("list-style-type", "disc"),
    ("margin-bottom", "0"),
    ("margin-left", "0"),
    ("margin-right", "0"),
    ("margin-top", "0"),
    ("padding-bottom", "0"),
    ("padding-left", "0"),
    ("padding-right", "0"),
    ("padding-top", "0"),
    ("text-align", "left"),
    ("text-decoration", "none"),
    ("text-transform", "none"),
    ("visibility", "visible"),
    ("white-space", "normal"),
    ("word-spacing", "normal"),
];

/// [WHATWG HTML § 15.3](https://html.spec.whatwg.org/multipage/rendering.html#the-css-user-agent-style-sheet-and-presentational-hints)
const UA_CSS: &str = r"
/* [§ 15.3.1 Hidden elements] */
area, base, datalist, head, link, meta, noscript, param,
script, style, template, title {
    display: none;
}

/* [§ 15.3.3 Flow content] */
address, article, aside, blockquote, body, center, dd, details,
dialog, div, dl, dt, fieldset, figcaption, figure, footer, form,
h1, h2, h3, h4, h5, h6, header, hr, html, legend, main, menu, nav,
ol, p, pre, section, summary, ul {
    display: block;
}

a, abbr, b, bdi, bdo, br, cite, code, dfn, em, i, img, kbd, label,
mark, q, s, samp, small, span, strong, sub, sup, time, u, var {
    display: inline;
}

li {
    display: list-item;
}

/* [§ 15.3.4 The page] */
body {
    margin: 8px;
}

/* [§ 15.3.6 Sections and headings] */
h1 { font-size: 2em; font-weight: bold; margin: 0.67em 0; }
h2 { font-size: 1.5em; font-weight: bold; margin: 0.83em 0; }
h3 { font-size: 1.17em; font-weight: bold; margin: 1em 0; }
h4 { font-size: 1em; font-weight: bold; margin: 1.33em 0; }
h5 { font-size: 0.83em; font-weight: bold; margin: 1.67em 0; }
h6 { font-size: 0.67em; font-weight: bold; margin: 2.33em 0; }

/* [§ 15.3.5 Grouping content] */
p, blockquote, figure, dl {
    margin: 1em 0;
}

blockquote, figure {
    margin-left: 40px;
    margin-right: 40px;
}

pre {
    white-space: pre;
    font-family: monospace;
    margin: 1em 0;
}

code, kbd, samp {
    font-family: monospace;
}

/* [§ 15.3.7 Lists] */
ul, ol, menu {
    margin: 1em 0;
    padding-left: 40px;
}

ol {
    list-style-type: decimal;
}

/* [§ 15.3.8 Text-level semantics] */
a:link {
    color: #0000EE;
    text-decoration: underline;
    cursor: pointer;
}

u, ins {
    text-decoration: underline;
}

b, strong, th {
    font-weight: bold;
}

em, i, cite, dfn, var {
    font-style: italic;
}

small {
    font-size: smaller;
}

big {
    font-size: larger;
}

button {
    padding: 1px 6px;
    background-color: #f0f0f0;
    cursor: pointer;
}
";

/// The initial style every element starts from, built once.
pub fn base_defaults() -> &'static ComputedStyle {
    static DEFAULTS: OnceLock<ComputedStyle> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        let mut style = ComputedStyle::default();
        for (property, value) in BASE_DEFAULTS {
            style.set(property, StyleValue::parse(value));
        }
        style
    })
}

/// The parsed tag-default sheet, parsed once.
///
/// [CSS Cascading § 6.1](https://www.w3.org/TR/css-cascade-4/#cascade-origin)
///
/// "Each style rule has a cascade origin... User-Agent origin rules have
/// the lowest priority."
pub fn ua_stylesheet() -> &'static Stylesheet {
    static STYLESHEET: OnceLock<Stylesheet> = OnceLock::new();
    STYLESHEET.get_or_init(|| parse_stylesheet(UA_CSS))
}
