//! Integration tests for the markup tokenizer.

use kestrel_html::{Attribute, HTMLTokenizer, Token, tokenize};

fn start(name: &str, attributes: &[(&str, &str)]) -> Token {
    Token::StartTag {
        name: name.to_string(),
        attributes: attributes
            .iter()
            .map(|(n, v)| Attribute::new((*n).to_string(), (*v).to_string()))
            .collect(),
    }
}

fn end(name: &str) -> Token {
    Token::EndTag {
        name: name.to_string(),
    }
}

fn text(data: &str) -> Token {
    Token::Text(data.to_string())
}

#[test]
fn test_simple_paragraph() {
    assert_eq!(
        tokenize("<p>Hi</p>"),
        vec![start("p", &[]), text("Hi"), end("p"), Token::EndOfInput]
    );
}

#[test]
fn test_empty_input() {
    assert_eq!(tokenize(""), vec![Token::EndOfInput]);
    assert!(!HTMLTokenizer::new("").has_more());
}

#[test]
fn test_tag_names_are_lowercased() {
    assert_eq!(
        tokenize("<DIV></Div>"),
        vec![start("div", &[]), end("div"), Token::EndOfInput]
    );
}

#[test]
fn test_attribute_forms() {
    let tokens = tokenize(r#"<input type="text" name='q' value=plain disabled>"#);
    assert_eq!(
        tokens[0],
        start(
            "input",
            &[("type", "text"), ("name", "q"), ("value", "plain"), ("disabled", "")]
        )
    );
}

#[test]
fn test_attribute_names_lowercased_and_first_wins() {
    let tokens = tokenize(r#"<a HREF="/one" href="/two">"#);
    assert_eq!(tokens[0], start("a", &[("href", "/one")]));
}

#[test]
fn test_attribute_values_decode_entities() {
    let tokens = tokenize(r#"<a title="Fish &amp; Chips">"#);
    assert_eq!(tokens[0].attribute("title"), Some("Fish & Chips"));
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize(r#"<img src=a.png/>"#);
    assert_eq!(
        tokens[0],
        Token::SelfClosingTag {
            name: "img".to_string(),
            attributes: vec![Attribute::new("src".to_string(), "a.png".to_string())],
        }
    );
}

#[test]
fn test_unquoted_value_keeps_inner_slash() {
    let tokens = tokenize("<a href=/docs/index.html>");
    assert_eq!(tokens[0].attribute("href"), Some("/docs/index.html"));
}

#[test]
fn test_comment() {
    assert_eq!(
        tokenize("a<!-- note -->b"),
        vec![
            text("a"),
            Token::Comment(" note ".to_string()),
            text("b"),
            Token::EndOfInput
        ]
    );
}

#[test]
fn test_unterminated_comment_runs_to_end() {
    assert_eq!(
        tokenize("<!-- open"),
        vec![Token::Comment(" open".to_string()), Token::EndOfInput]
    );
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html><p>");
    assert_eq!(tokens[0], Token::Doctype("DOCTYPE html".to_string()));
    assert_eq!(tokens[1], start("p", &[]));
}

#[test]
fn test_whitespace_run_collapses_to_single_space() {
    assert_eq!(
        tokenize("<b></b>\n   \t<i></i>")[2],
        text(" ")
    );
}

#[test]
fn test_stray_less_than_is_text() {
    assert_eq!(
        tokenize("a < b"),
        vec![text("a "), text("<"), text(" b"), Token::EndOfInput]
    );
}

#[test]
fn test_processing_instruction_is_skipped() {
    assert_eq!(
        tokenize("<?xml version=\"1.0\"?><p>"),
        vec![start("p", &[]), Token::EndOfInput]
    );
}

#[test]
fn test_empty_end_tag_is_dropped() {
    assert_eq!(tokenize("</>x"), vec![text("x"), Token::EndOfInput]);
}

#[test]
fn test_unclosed_start_tag_at_end_of_input() {
    assert_eq!(
        tokenize("<div class=a"),
        vec![start("div", &[("class", "a")]), Token::EndOfInput]
    );
}

#[test]
fn test_token_display_is_variant_name() {
    assert_eq!(start("p", &[]).to_string(), "StartTag");
    assert_eq!(Token::EndOfInput.to_string(), "EndOfInput");
}

#[test]
fn test_position_advances() {
    let mut tokenizer = HTMLTokenizer::new("<p>x");
    assert_eq!(tokenizer.position(), 0);
    let _ = tokenizer.next_token();
    assert_eq!(tokenizer.position(), 3);
    assert!(tokenizer.has_more());
}
