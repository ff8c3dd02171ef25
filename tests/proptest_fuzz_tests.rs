//! Property-based fuzzing tests for the schema scanner and reader
//!
//! These tests use proptest to generate random inputs and verify that:
//! 1. The scanner never panics on arbitrary text
//! 2. The reader either parses or reports a structural error, never panics
//! 3. Well-formed schemas round-trip through render-and-reparse

use opgen::lexer::{decode_comment, SExprScanner};
use opgen::parser::{parse_document, SExpr, SExprReader};
use proptest::prelude::*;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Random strings that might break the scanner
fn arbitrary_source_string() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\x00-\x7F]{0,500}").unwrap()
}

/// Tokens that look like schema elements
fn schema_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        Just("->".to_string()),
        Just("ops".to_string()),
        Just("Commutative".to_string()),
        Just("Constant".to_string()),
        Just("aux".to_string()),
        Just("i32".to_string()),
        Just("f64".to_string()),
        Just("bool".to_string()),
        // numbers
        (-1000i64..1000i64).prop_map(|n| n.to_string()),
        (0.0f64..100.0f64).prop_map(|f| format!("{:.2}", f)),
        // identifiers
        "[A-Za-z][A-Za-z0-9]{0,10}",
        // comments
        ";[^\n]{0,20}\n".prop_map(|s| s),
        ";;[^\n]{0,20}\n".prop_map(|s| s),
    ]
}

/// Valid-ish s-expression soup
fn sexp_like_string() -> impl Strategy<Value = String> {
    prop::collection::vec(schema_token(), 0..50).prop_map(|tokens| tokens.join(" "))
}

/// A well-formed symbol; float spellings are excluded since the reader
/// would reparse them as numbers
fn symbol() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,12}".prop_filter("parses as a float", |s| {
        !matches!(s.to_ascii_lowercase().as_str(), "inf" | "infinity" | "nan")
    })
}

/// A well-formed s-expression of bounded depth
fn well_formed_sexpr() -> impl Strategy<Value = SExpr> {
    let leaf = prop_oneof![
        symbol().prop_map(SExpr::Sym),
        (-10_000i64..10_000i64).prop_map(SExpr::Int),
    ];
    leaf.prop_recursive(4, 32, 8, |inner| {
        prop::collection::vec(inner, 0..8).prop_map(SExpr::List)
    })
}

// =============================================================================
// SCANNER PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn scanner_never_panics_on_arbitrary_input(source in arbitrary_source_string()) {
        let _ = SExprScanner::new(&source).scan_tokens();
    }

    #[test]
    fn scanner_tokens_never_contain_whitespace(source in sexp_like_string()) {
        for token in SExprScanner::new(&source).scan_tokens() {
            prop_assert!(!token.contains(char::is_whitespace));
            prop_assert!(!token.is_empty());
        }
    }

    #[test]
    fn comment_text_roundtrips(text in "[a-zA-Z0-9 ()+*-]{0,40}") {
        let source = format!(";{}\n", text);
        let tokens = SExprScanner::new(&source).scan_tokens();
        // encoded comment is the atom between "( ;" and ")"
        prop_assert_eq!(&tokens[0], "(");
        prop_assert_eq!(&tokens[1], ";");
        let body: String = if tokens[2] == ")" {
            String::new()
        } else {
            decode_comment(&tokens[2])
        };
        prop_assert_eq!(body, text);
    }
}

// =============================================================================
// READER PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn reader_never_panics_on_arbitrary_input(source in arbitrary_source_string()) {
        let tokens = SExprScanner::new(&source).scan_tokens();
        let _ = SExprReader::new(tokens).read_expr();
    }

    #[test]
    fn document_parse_never_panics(source in sexp_like_string()) {
        let _ = parse_document(&source);
    }

    #[test]
    fn rendered_sexprs_reparse_identically(expr in well_formed_sexpr()) {
        let rendered = format!("{}\n", expr);
        let tokens = SExprScanner::new(&rendered).scan_tokens();
        let reparsed = SExprReader::new(tokens).read_expr().unwrap();
        prop_assert_eq!(reparsed, expr);
    }

    #[test]
    fn balanced_parens_always_parse(depth in 0usize..100) {
        let source = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        let tokens = SExprScanner::new(&source).scan_tokens();
        prop_assert!(SExprReader::new(tokens).read_expr().is_ok());
    }
}
