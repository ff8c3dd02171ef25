//! Lexical analysis for the operator schema DSL
//!
//! Converts schema source text into a flat token stream, rewriting comments
//! into synthetic list forms so they survive parsing.

mod sexpr_scanner;

pub use sexpr_scanner::{decode_comment, SExprScanner};
