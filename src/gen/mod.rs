//! Table emitters
//!
//! Each emitter is a pure function from the validated model (plus the
//! registries it needs) to one generated text body. Bodies include their
//! own start and end marker lines; splicing them into target files is the
//! patcher's job. Emitters never depend on another emitter's output.

pub mod ast_switch;
pub mod const_map;
pub mod conv_table;
pub mod op_enum;
pub mod op_info;
pub mod op_names;
pub mod statics;

/// Name stamped into "Do not edit" comments in generated bodies
pub const GENERATOR: &str = "opgen";

pub(crate) fn do_not_edit() -> String {
    format!("  // Do not edit. Generated by {}", GENERATOR)
}
