//! Integration tests for number and string literals.

use aspy_parser::ast::{ConstantKind, Expr};
use aspy_parser::{Arena, Lexer, Stmt, TokenKind, parse};

fn tokenize(source: &str) -> Vec<TokenKind> {
    let (tokens, errors) = Lexer::new(source).tokenize();
    assert!(errors.is_empty(), "unexpected lexical errors: {errors:?}");
    tokens.into_iter().map(|t| t.kind).collect()
}

/// Value and kind of the constant assigned by a one-line `x = <literal>`.
fn assigned_constant(source: &str) -> (String, ConstantKind) {
    let arena = Arena::new();
    let module = match parse(source, &arena) {
        Ok(module) => module,
        Err(error) => panic!("parse failed: {error}"),
    };
    match &module.body[0] {
        Stmt::Assign(assign) => match &assign.value {
            Expr::Constant(c) => (c.value.to_string(), c.kind),
            other => panic!("expected constant, got {}", other.kind_name()),
        },
        other => panic!("expected assignment, got {}", other.kind_name()),
    }
}

// ===== Numbers =====

#[test]
fn test_decimal_integers() {
    assert_eq!(assigned_constant("x = 42\n"), ("42".to_string(), ConstantKind::Int));
    assert_eq!(
        assigned_constant("x = 1_000\n"),
        ("1_000".to_string(), ConstantKind::Int)
    );
}

#[test]
fn test_prefixed_integers() {
    assert_eq!(assigned_constant("x = 0x7FFF\n").1, ConstantKind::Int);
    assert_eq!(assigned_constant("x = 0b1010\n").1, ConstantKind::Int);
    assert_eq!(assigned_constant("x = 0o17\n").1, ConstantKind::Int);
}

#[test]
fn test_floats_and_scientific_notation() {
    assert_eq!(assigned_constant("x = 3.25\n").1, ConstantKind::Float);
    assert_eq!(assigned_constant("x = 6.022e23\n").1, ConstantKind::Float);
    assert_eq!(assigned_constant("x = 1e-3\n").1, ConstantKind::Float);
}

#[test]
fn test_negative_number_is_unary_minus() {
    let tokens = tokenize("x = -123\n");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Ident,
            TokenKind::Equal,
            TokenKind::Minus,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_keyword_constants() {
    assert_eq!(assigned_constant("x = True\n").1, ConstantKind::True);
    assert_eq!(assigned_constant("x = False\n").1, ConstantKind::False);
    assert_eq!(assigned_constant("x = None\n").1, ConstantKind::None);
}

// ===== Strings =====

#[test]
fn test_simple_strings() {
    assert_eq!(
        assigned_constant("x = 'hello'\n"),
        ("hello".to_string(), ConstantKind::Str)
    );
    assert_eq!(assigned_constant("x = \"it's\"\n").0, "it's");
}

#[test]
fn test_escape_sequences_are_decoded() {
    assert_eq!(assigned_constant(r#"x = "a\tb\n""#).0, "a\tb\n");
    assert_eq!(assigned_constant(r#"x = 'don\'t'"#).0, "don't");
    assert_eq!(assigned_constant(r#"x = "back\\slash""#).0, "back\\slash");
}

#[test]
fn test_raw_strings_keep_backslashes() {
    assert_eq!(assigned_constant(r#"x = r"\d+""#).0, r"\d+");
}

#[test]
fn test_adjacent_strings_are_joined() {
    assert_eq!(assigned_constant("x = 'ab' \"cd\"\n").0, "abcd");
}

#[test]
fn test_triple_quoted_string_across_lines() {
    let source = "x = \"\"\"first\nsecond\"\"\"\ny = 1\n";
    let arena = Arena::new();
    let module = parse(source, &arena).unwrap();
    assert_eq!(module.body.len(), 2);
    let Stmt::Assign(assign) = &module.body[0] else {
        panic!("expected assignment");
    };
    let Expr::Constant(value) = &assign.value else {
        panic!("expected constant");
    };
    assert_eq!(value.value, "first second");
}

#[test]
fn test_fstring_is_joined_str() {
    let arena = Arena::new();
    let module = parse("x = f\"v={v}\"\n", &arena).unwrap();
    let Stmt::Assign(assign) = &module.body[0] else {
        panic!("expected assignment");
    };
    let Expr::JoinedStr(joined) = &assign.value else {
        panic!("expected f-string");
    };
    assert_eq!(joined.raw, "f\"v={v}\"");
}

#[test]
fn test_string_spans_cover_all_parts() {
    let source = "x = 'a' 'b'\n";
    let arena = Arena::new();
    let module = parse(source, &arena).unwrap();
    let Stmt::Assign(assign) = &module.body[0] else {
        panic!("expected assignment");
    };
    assert_eq!(&source[assign.value.span()], "'a' 'b'");
}
