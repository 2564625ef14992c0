//! Integration tests for stylesheet parsing.

use kestrel_css::values::Unit;
use kestrel_css::{
    Color, Declaration, Stylesheet, ValueKind, evaluate_media_query, parse_declarations,
    parse_stylesheet,
};

fn first_decl(sheet: &Stylesheet) -> &Declaration {
    &sheet.rules[0].declarations[0]
}

#[test]
fn test_simple_rule() {
    let sheet = parse_stylesheet("p { color: red; margin-top: 4px }");
    assert_eq!(sheet.rules.len(), 1);
    let rule = &sheet.rules[0];
    assert_eq!(rule.selectors, vec!["p"]);
    assert_eq!(rule.specificities, vec![1]);
    assert_eq!(rule.declarations.len(), 2);
    assert_eq!(
        rule.declarations[1].value.kind,
        ValueKind::Length(4.0, Unit::Px)
    );
}

#[test]
fn test_selector_list_keeps_specificity_per_selector() {
    let sheet = parse_stylesheet("h1, .title, #main { font-weight: bold }");
    let rule = &sheet.rules[0];
    assert_eq!(rule.selectors, vec!["h1", ".title", "#main"]);
    assert_eq!(rule.specificities, vec![1, 10, 100]);
}

#[test]
fn test_comments_are_stripped() {
    let sheet = parse_stylesheet("/* a { color: red } */ p { /* x */ color: blue }");
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(sheet.rules[0].selectors, vec!["p"]);
    assert_eq!(first_decl(&sheet).value.raw, "blue");
}

#[test]
fn test_unterminated_comment_runs_to_end() {
    let sheet = parse_stylesheet("p { color: red } /* div { color: blue }");
    assert_eq!(sheet.rules.len(), 1);
}

#[test]
fn test_charset_and_imports() {
    let sheet = parse_stylesheet(
        "@charset \"utf-8\";\n@import url(\"base.css\");\n@import 'print.css' print;\np { color: red }",
    );
    assert_eq!(sheet.charset.as_deref(), Some("utf-8"));
    assert_eq!(sheet.imports, vec!["base.css", "print.css"]);
    assert_eq!(sheet.rules.len(), 1);
}

#[test]
fn test_non_ascii_at_rule_preludes() {
    let sheet = parse_stylesheet(
        "@charset \"ünï\";\n@import \"éé\";\n@import ü.css;\n@import url(ñ.css);\np { color: red }",
    );
    assert_eq!(sheet.charset.as_deref(), Some("ünï"));
    assert_eq!(sheet.imports, vec!["éé", "ü.css", "ñ.css"]);
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(first_decl(&sheet).value.raw, "red");
}

#[test]
fn test_media_block_extracted() {
    let sheet = parse_stylesheet(
        "p { color: black }\n@media screen and (max-width: 600px) { p { color: red } .x { margin: 0 } }",
    );
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(sheet.media_rules.len(), 1);
    assert_eq!(sheet.media_rules[0].query, "screen and (max-width: 600px)");
    assert_eq!(sheet.media_rules[0].rules.len(), 2);
}

#[test]
fn test_applicable_rules_filters_media() {
    let sheet = parse_stylesheet(
        "a { color: black } @media (min-width: 1000px) { b { color: red } } @media print { i { color: blue } }",
    );
    assert_eq!(sheet.applicable_rules(800.0).count(), 1);
    let wide: Vec<&str> = sheet
        .applicable_rules(1200.0)
        .map(|r| r.selectors[0].as_str())
        .collect();
    assert_eq!(wide, vec!["a", "b"]);
}

#[test]
fn test_quoted_braces_do_not_end_block() {
    let sheet = parse_stylesheet("p { content: \"}\"; color: red } div { color: blue }");
    assert_eq!(sheet.rules.len(), 2);
    assert_eq!(sheet.rules[0].declarations.len(), 2);
    assert_eq!(
        sheet.rules[0].declarations[0].value.kind,
        ValueKind::Str("}".to_string())
    );
}

#[test]
fn test_escaped_quote_in_string() {
    let sheet = parse_stylesheet(r#"p { content: "a\"}"; color: red } div { color: blue }"#);
    assert_eq!(sheet.rules.len(), 2);
    assert_eq!(sheet.rules[1].selectors, vec!["div"]);
}

#[test]
fn test_unknown_at_rules_are_skipped() {
    let sheet = parse_stylesheet(
        "@font-face { font-family: x; src: url(x.woff) } @namespace svg url(x); p { color: red }",
    );
    assert_eq!(sheet.rules.len(), 1);
    assert!(sheet.media_rules.is_empty());
}

#[test]
fn test_malformed_rules_are_dropped() {
    let sheet =
        parse_stylesheet("} p color: red; div { color: blue } , { color: green } span { x }");
    let selectors: Vec<&str> = sheet.rules.iter().map(|r| r.selectors[0].as_str()).collect();
    assert_eq!(selectors, vec!["div", "span"]);
    assert!(sheet.rules[1].declarations.is_empty());
}

#[test]
fn test_invalid_selector_is_kept_but_never_parsed() {
    let sheet = parse_stylesheet("p >> q { color: red }");
    assert_eq!(sheet.rules.len(), 1);
    assert!(sheet.rules[0].parsed[0].is_none());
    assert_eq!(sheet.rules[0].specificities, vec![0]);
}

#[test]
fn test_important_declarations() {
    let decls = parse_declarations("color: red !important; margin: 0 ! IMPORTANT; padding: 1px");
    assert!(decls[0].important);
    assert_eq!(decls[0].value.raw, "red");
    assert!(decls[1].important);
    assert_eq!(decls[1].value.raw, "0");
    assert!(!decls[2].important);
}

#[test]
fn test_bad_declarations_are_dropped() {
    let decls = parse_declarations("color; : red; margin: ; padding: 2px");
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].property, "padding");
}

#[test]
fn test_value_classification_order() {
    let decls = parse_declarations(
        "a: url(img.png); b: 'text'; c: calc(1px, 2px); d: rgb(1, 2, 3); e: #fff; f: 1.5em; g: 50%; h: Arial, sans-serif; i: block",
    );
    let kinds: Vec<&ValueKind> = decls.iter().map(|d| &d.value.kind).collect();
    assert_eq!(kinds[0], &ValueKind::Url("img.png".to_string()));
    assert_eq!(kinds[1], &ValueKind::Str("text".to_string()));
    assert!(matches!(kinds[2], ValueKind::Function { name, .. } if name == "calc"));
    assert_eq!(kinds[3], &ValueKind::Color(Color::rgb(1, 2, 3)));
    assert_eq!(kinds[4], &ValueKind::Color(Color::WHITE));
    assert_eq!(kinds[5], &ValueKind::Length(1.5, Unit::Em));
    assert_eq!(kinds[6], &ValueKind::Percentage(50.0));
    assert_eq!(
        kinds[7],
        &ValueKind::KeywordList(vec!["Arial".to_string(), "sans-serif".to_string()])
    );
    assert_eq!(kinds[8], &ValueKind::Keyword("block".to_string()));
}

#[test]
fn test_media_query_evaluation() {
    assert!(evaluate_media_query("all", 800.0));
    assert!(evaluate_media_query("screen", 800.0));
    assert!(!evaluate_media_query("print", 800.0));
    assert!(evaluate_media_query("(min-width: 600px)", 800.0));
    assert!(!evaluate_media_query("(min-width: 900px)", 800.0));
    assert!(evaluate_media_query("(max-width: 50em)", 800.0));
    assert!(!evaluate_media_query("screen and (max-width: 400px)", 800.0));
    assert!(evaluate_media_query("print, (max-width: 900px)", 800.0));
    assert!(evaluate_media_query("(orientation: landscape)", 800.0));
}

#[test]
fn test_append_keeps_order() {
    let mut sheet = parse_stylesheet("a { color: red }");
    sheet.append(parse_stylesheet("b { color: blue }"));
    let selectors: Vec<&str> = sheet.rules.iter().map(|r| r.selectors[0].as_str()).collect();
    assert_eq!(selectors, vec!["a", "b"]);
}

#[test]
fn test_print_tree() {
    let sheet = parse_stylesheet("p.note { color: red !important }");
    let dump = sheet.print_tree();
    assert!(dump.starts_with("Stylesheet\n"));
    assert!(dump.contains("Rule 1: p.note [11]"));
    assert!(dump.contains("color: red !important"));
}
