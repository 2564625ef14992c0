use crate::entities::decode_entities;

use super::token::{Attribute, Token};

/// Forward-only markup scanner.
///
/// `<` begins a tag, `</` an end tag and `<!` a comment or DOCTYPE.
/// Everything else is text. The scanner never fails: a `<` that does not
/// start a tag becomes literal text, and unknown `<!`/`<?` constructs are
/// skipped through the next `>`.
pub struct HTMLTokenizer {
    input: Vec<char>,
    pos: usize,
}

impl HTMLTokenizer {
    /// Create a tokenizer over `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Whether any input remains to be scanned.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pos < self.input.len()
    }

    /// Current offset into the input, in characters.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn starts_with_ignore_case(&self, at: usize, needle: &str) -> bool {
        let mut i = at;
        for expected in needle.chars() {
            match self.input.get(i) {
                Some(c) if c.eq_ignore_ascii_case(&expected) => i += 1,
                _ => return false,
            }
        }
        true
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Advance past the next `>`, or to the end of input if there is none.
    fn skip_past_gt(&mut self) {
        while let Some(c) = self.current() {
            self.pos += 1;
            if c == '>' {
                return;
            }
        }
    }

    /// Produce the next token. Once the input is exhausted every call
    /// returns [`Token::EndOfInput`].
    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(c) = self.current() else {
                return Token::EndOfInput;
            };

            if c != '<' {
                return self.consume_text();
            }

            if let Some(token) = self.consume_markup() {
                return token;
            }
        }
    }

    /// Text up to the next `<`. A whitespace-only run collapses to one space.
    fn consume_text(&mut self) -> Token {
        let start = self.pos;
        while self.current().is_some_and(|c| c != '<') {
            self.pos += 1;
        }
        let text: String = self.input[start..self.pos].iter().collect();
        if text.chars().all(char::is_whitespace) {
            Token::Text(" ".to_string())
        } else {
            Token::Text(text)
        }
    }

    /// Called with `pos` on a `<`. Returns `None` when the construct was
    /// skipped and scanning should continue.
    fn consume_markup(&mut self) -> Option<Token> {
        match self.peek(1) {
            Some('!') => self.consume_declaration(),
            Some('?') => {
                self.skip_past_gt();
                None
            }
            Some('/') => self.consume_end_tag(),
            Some(c) if c.is_ascii_alphabetic() => Some(self.consume_start_tag()),
            _ => {
                self.pos += 1;
                Some(Token::Text("<".to_string()))
            }
        }
    }

    /// `<!--comment-->`, `<!DOCTYPE ...>`, or a bogus `<!...>` that is skipped.
    fn consume_declaration(&mut self) -> Option<Token> {
        let body = self.pos + 2;

        if self.starts_with_ignore_case(body, "--") {
            let content_start = body + 2;
            let mut i = content_start;
            while i < self.input.len() {
                if self.starts_with_ignore_case(i, "-->") {
                    let data: String = self.input[content_start..i].iter().collect();
                    self.pos = i + 3;
                    return Some(Token::Comment(data));
                }
                i += 1;
            }
            let data: String = self.input[content_start..].iter().collect();
            self.pos = self.input.len();
            return Some(Token::Comment(data));
        }

        if body >= self.input.len() {
            self.pos = self.input.len();
            return Some(Token::Text("<!".to_string()));
        }

        if self.starts_with_ignore_case(body, "doctype") {
            self.pos = body;
            let start = self.pos;
            while self.current().is_some_and(|c| c != '>') {
                self.pos += 1;
            }
            let text: String = self.input[start..self.pos].iter().collect();
            self.skip_past_gt();
            return Some(Token::Doctype(text));
        }

        self.skip_past_gt();
        None
    }

    fn consume_tag_name(&mut self) -> String {
        let start = self.pos;
        while self
            .current()
            .is_some_and(|c| !c.is_whitespace() && c != '>' && c != '/')
        {
            self.pos += 1;
        }
        self.input[start..self.pos]
            .iter()
            .collect::<String>()
            .to_ascii_lowercase()
    }

    fn consume_end_tag(&mut self) -> Option<Token> {
        self.pos += 2;
        let name = self.consume_tag_name();
        if name.is_empty() {
            // `</>` is dropped; `</ ...` or `</` at the end is text.
            if self.current() == Some('>') {
                self.pos += 1;
                return None;
            }
            return Some(Token::Text("</".to_string()));
        }
        self.skip_past_gt();
        Some(Token::EndTag { name })
    }

    fn consume_start_tag(&mut self) -> Token {
        self.pos += 1;
        let name = self.consume_tag_name();
        let mut attributes: Vec<Attribute> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.current() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some('/') => {
                    self.pos += 1;
                    if self.current() == Some('>') {
                        self.pos += 1;
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => {
                    let fresh = self
                        .consume_attribute()
                        .filter(|attr| !attributes.iter().any(|a| a.name == attr.name));
                    attributes.extend(fresh);
                }
            }
        }

        if self_closing {
            Token::SelfClosingTag { name, attributes }
        } else {
            Token::StartTag { name, attributes }
        }
    }

    /// `name`, `name=value`, `name="value"` or `name='value'`.
    fn consume_attribute(&mut self) -> Option<Attribute> {
        let start = self.pos;
        while self
            .current()
            .is_some_and(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
        {
            self.pos += 1;
        }
        if self.pos == start {
            // A stray `=` with no name in front of it.
            self.pos += 1;
            return None;
        }
        let name = self.input[start..self.pos]
            .iter()
            .collect::<String>()
            .to_ascii_lowercase();

        self.skip_whitespace();
        if self.current() != Some('=') {
            return Some(Attribute::new(name, String::new()));
        }
        self.pos += 1;
        self.skip_whitespace();

        let raw = match self.current() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let value_start = self.pos;
                while self.current().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                let value: String = self.input[value_start..self.pos].iter().collect();
                if self.has_more() {
                    self.pos += 1;
                }
                value
            }
            _ => {
                let value_start = self.pos;
                while let Some(c) = self.current() {
                    let ends_tag = c == '/' && self.peek(1) == Some('>');
                    if c.is_whitespace() || c == '>' || ends_tag {
                        break;
                    }
                    self.pos += 1;
                }
                self.input[value_start..self.pos].iter().collect()
            }
        };

        Some(Attribute::new(name, decode_entities(&raw).into_owned()))
    }

    /// Consume raw text up to the matching `</tag` (case-insensitive) and
    /// the end tag itself. Used for `style`, `script` and `title`, whose
    /// contents are never tokenized as markup. Without a closing tag the
    /// rest of the input is returned.
    pub fn consume_raw_text(&mut self, tag: &str) -> String {
        let start = self.pos;
        let mut i = self.pos;
        let closing = format!("</{tag}");
        let after = closing.chars().count();

        while i < self.input.len() {
            if self.starts_with_ignore_case(i, &closing) {
                let boundary = self.input.get(i + after).copied();
                if boundary.is_none_or(|c| c.is_whitespace() || c == '>' || c == '/') {
                    let text: String = self.input[start..i].iter().collect();
                    self.pos = i + after;
                    self.skip_past_gt();
                    return text;
                }
            }
            i += 1;
        }

        self.pos = self.input.len();
        self.input[start..].iter().collect()
    }
}

/// Tokenize `input` completely. The last token is always
/// [`Token::EndOfInput`].
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let done = token == Token::EndOfInput;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_input_is_persistent() {
        let mut tokenizer = HTMLTokenizer::new("x");
        assert_eq!(tokenizer.next_token(), Token::Text("x".into()));
        assert!(!tokenizer.has_more());
        assert_eq!(tokenizer.next_token(), Token::EndOfInput);
        assert_eq!(tokenizer.next_token(), Token::EndOfInput);
    }

    #[test]
    fn test_raw_text_ignores_markup() {
        let mut tokenizer = HTMLTokenizer::new("<script>if (a<b) x = '</p>';</SCRIPT >after");
        let start = tokenizer.next_token();
        assert_eq!(start.tag_name(), Some("script"));
        assert_eq!(tokenizer.consume_raw_text("script"), "if (a<b) x = '</p>';");
        assert_eq!(tokenizer.next_token(), Token::Text("after".into()));
    }

    #[test]
    fn test_raw_text_requires_tag_boundary() {
        let mut tokenizer = HTMLTokenizer::new("a</styles>b</style>");
        assert_eq!(tokenizer.consume_raw_text("style"), "a</styles>b");
        assert_eq!(tokenizer.next_token(), Token::EndOfInput);
    }
}
