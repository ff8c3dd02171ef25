//! Registries cross-validating the schema against external declarations
//!
//! The builtin tables are explicit configuration values (constructed via
//! `builtin()`, or synthetically in tests), never module-level mutable
//! state, so loading and validation stay reentrant.

mod ast_tokens;
mod aux_table;
mod type_codes;

pub use ast_tokens::{load_ast_tokens, AstOpMap, OpPrefixes};
pub use aux_table::AuxTable;
pub use type_codes::{load_type_codes, TypeCodeMap};
