//! Selector text to [`ParsedSelector`].
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)

use std::iter::Peekable;
use std::str::Chars;

use super::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, ParsedSelector, PseudoClass,
    SimpleSelector,
};

/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit()
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(char::is_ascii_whitespace).is_some() {}
}

fn take_ident(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut ident = String::new();
    while let Some(c) = chars.next_if(|&c| is_ident_char(c)) {
        ident.push(c);
    }
    (!ident.is_empty()).then_some(ident)
}

/// Collects compounds left to right and the combinators between them.
#[derive(Default)]
struct ChainBuilder {
    compounds: Vec<CompoundSelector>,
    between: Vec<Combinator>,
    current: Vec<SimpleSelector>,
    pending: Option<Combinator>,
}

impl ChainBuilder {
    /// Add a simple selector, opening a new compound after a combinator.
    fn push(&mut self, simple: SimpleSelector) {
        if self.current.is_empty()
            && !self.compounds.is_empty()
            && let Some(combinator) = self.pending.take()
        {
            self.between.push(combinator);
        }
        self.current.push(simple);
    }

    fn close_compound(&mut self) {
        if !self.current.is_empty() {
            self.compounds.push(CompoundSelector {
                simple_selectors: std::mem::take(&mut self.current),
            });
        }
    }

    /// Whitespace ends a compound and tentatively means "descendant".
    fn whitespace(&mut self) {
        if !self.current.is_empty() {
            self.close_compound();
            self.pending = Some(Combinator::Descendant);
        }
    }

    /// An explicit combinator needs a compound on its left and must not
    /// follow another explicit combinator.
    fn combinator(&mut self, combinator: Combinator) -> Option<()> {
        self.close_compound();
        if self.compounds.is_empty() {
            return None;
        }
        match self.pending {
            None | Some(Combinator::Descendant) => {
                self.pending = Some(combinator);
                Some(())
            }
            Some(_) => None,
        }
    }

    fn finish(mut self) -> Option<ComplexSelector> {
        self.close_compound();
        if matches!(self.pending, Some(c) if c != Combinator::Descendant) {
            return None;
        }
        let subject = self.compounds.pop()?;
        let combinators = self
            .between
            .into_iter()
            .rev()
            .zip(self.compounds.into_iter().rev())
            .collect();
        Some(ComplexSelector {
            subject,
            combinators,
        })
    }
}

/// [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Parse the inside of `[...]`; the opening bracket is already consumed.
fn parse_attribute(chars: &mut Peekable<Chars<'_>>) -> Option<AttributeSelector> {
    skip_whitespace(chars);
    let name = take_ident(chars)?.to_ascii_lowercase();
    skip_whitespace(chars);

    let operator = match chars.next()? {
        ']' => return Some(AttributeSelector::Exists(name)),
        '=' => '=',
        op @ ('~' | '|' | '^' | '$' | '*') => {
            if chars.next()? != '=' {
                return None;
            }
            op
        }
        _ => return None,
    };

    skip_whitespace(chars);
    let value = match chars.peek()? {
        &quote @ ('"' | '\'') => {
            let _ = chars.next();
            let mut value = String::new();
            loop {
                match chars.next()? {
                    c if c == quote => break value,
                    c => value.push(c),
                }
            }
        }
        _ => {
            let mut value = String::new();
            while let Some(c) = chars.next_if(|&c| is_ident_char(c) || c == '.') {
                value.push(c);
            }
            if value.is_empty() {
                return None;
            }
            value
        }
    };
    skip_whitespace(chars);
    if chars.next()? != ']' {
        return None;
    }

    Some(match operator {
        '~' => AttributeSelector::Includes(name, value),
        '|' => AttributeSelector::DashMatch(name, value),
        '^' => AttributeSelector::PrefixMatch(name, value),
        '$' => AttributeSelector::SuffixMatch(name, value),
        '*' => AttributeSelector::SubstringMatch(name, value),
        _ => AttributeSelector::Equals(name, value),
    })
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// Parse after the first `:`. A functional pseudo-class's argument is
/// skipped with balanced parentheses.
fn parse_pseudo(chars: &mut Peekable<Chars<'_>>) -> Option<SimpleSelector> {
    let is_element = chars.next_if_eq(&':').is_some();
    let name = take_ident(chars)?.to_ascii_lowercase();

    let mut functional = false;
    if chars.next_if_eq(&'(').is_some() {
        functional = true;
        let mut depth = 1u32;
        while depth > 0 {
            match chars.next()? {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }
    }

    Some(if is_element {
        SimpleSelector::PseudoElement(name)
    } else if functional {
        SimpleSelector::UnsupportedPseudoClass(name)
    } else {
        PseudoClass::from_name(&name).map_or_else(
            || SimpleSelector::UnsupportedPseudoClass(name),
            SimpleSelector::PseudoClass,
        )
    })
}

/// Parse one selector (no top-level commas).
///
/// Returns `None` for text that is not a selector this engine understands:
/// empty input, leading, trailing or doubled combinators, unbalanced
/// brackets, stray punctuation. An invalid selector simply matches nothing.
#[must_use]
pub fn parse_selector(raw: &str) -> Option<ParsedSelector> {
    let mut chars = raw.trim().chars().peekable();
    let mut chain = ChainBuilder::default();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_ascii_whitespace() => chain.whitespace(),
            '>' => chain.combinator(Combinator::Child)?,
            '+' => chain.combinator(Combinator::NextSibling)?,
            '~' => chain.combinator(Combinator::SubsequentSibling)?,
            '*' => chain.push(SimpleSelector::Universal),
            '.' => chain.push(SimpleSelector::Class(take_ident(&mut chars)?)),
            '#' => chain.push(SimpleSelector::Id(take_ident(&mut chars)?)),
            '[' => chain.push(SimpleSelector::Attribute(parse_attribute(&mut chars)?)),
            ':' => chain.push(parse_pseudo(&mut chars)?),
            c if is_ident_start_char(c) => {
                let mut name = String::from(c);
                if let Some(rest) = take_ident(&mut chars) {
                    name.push_str(&rest);
                }
                chain.push(SimpleSelector::Type(name.to_ascii_lowercase()));
            }
            _ => return None,
        }
    }

    chain.finish().map(ParsedSelector::new)
}
