//! Operator name table emitter
//!
//! A parallel array of operator name strings indexed by ordinal, with a
//! defensive `"?"` for the `Op_GENERIC_END` slot, plus the maximum name
//! length as a separate generated constant.

use crate::gen::{do_not_edit, GENERATOR};
use crate::schema::Arch;

/// Start marker line of the name table
pub const START: &str = "const char* const IROpNames[Op_MAX] = {";
/// End marker of the name table
pub const END: &str = "};";

/// Start marker line of the max-length constant region
pub const MAX_LEN_START: &str = "// IROpNamesMaxLen = longest name in IROpNames";
/// End marker of the max-length constant region
pub const MAX_LEN_END: &str = "//!EndGenerated";

/// Generates the `IROpNames` table body
pub fn generate(archs: &[Arch]) -> String {
    let mut lines = vec![START.to_string(), do_not_edit()];
    for arch in archs {
        for op in &arch.ops {
            lines.push(format!("  \"{}\",", op.name));
        }
        if arch.is_generic {
            lines.push("  \"?\", // Op_GENERIC_END".to_string());
        }
    }
    lines.push(END.to_string());
    lines.join("\n")
}

/// Generates the `IROpNamesMaxLen` constant region
pub fn generate_max_len(archs: &[Arch]) -> String {
    let longest = archs
        .iter()
        .flat_map(|a| a.ops.iter())
        .map(|op| op.name.len())
        .max()
        .unwrap_or(0);
    [
        MAX_LEN_START.to_string(),
        format!("//!Generated by {} -- do not edit.", GENERATOR),
        format!("#define IROpNamesMaxLen {}", longest),
        MAX_LEN_END.to_string(),
    ]
    .join("\n")
}
