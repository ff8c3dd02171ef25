//! S-expression parsing for the operator schema DSL
//!
//! Builds a generic tree of atoms and lists from the scanner's token
//! stream; the schema loader interprets the tree.

mod sexpr;

pub use sexpr::{parse_document, SExpr, SExprReader};
