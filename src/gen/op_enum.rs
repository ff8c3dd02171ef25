//! Operator enumeration emitter
//!
//! Assigns each operator a dense ordinal in declaration order across all
//! architectures. The generic architecture gets an `Op_GENERIC_END` marker
//! ordinal after its last operator, and `Op_MAX` terminates the enum.

use crate::gen::GENERATOR;
use crate::schema::Arch;

/// Start marker line
pub const START: &str = "typedef enum IROp {";
/// End marker line
pub const END: &str = "} IROp;";

/// Generates the `IROp` enumeration body
pub fn generate(archs: &[Arch]) -> String {
    let mut lines = vec![START.to_string()];
    for arch in archs {
        lines.push(format!("  // generated by {} from {}", GENERATOR, arch.source));
        for op in &arch.ops {
            for comment in &op.comments_pre {
                lines.push(format!("  //{}", comment));
            }
            let post = op.comments_post.join(" ");
            let post = if post.is_empty() {
                String::new()
            } else {
                format!("\t//{}", post)
            };
            lines.push(format!("  Op{},{}", op.name, post));
        }
        if arch.is_generic {
            lines.push(String::new());
            lines.push("  Op_GENERIC_END, // ---------------------------------------------".to_string());
        }
    }
    lines.push(String::new());
    lines.push("  Op_MAX".to_string());
    lines.push(END.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arch() -> Arch {
        let mut a = Arch::parse(
            "arch_base.lisp",
            "(ops\n  ; nil op\n  (Nil () -> ())\n  (AddI32 (i32 i32) -> i32) ; addition\n)\n",
        )
        .unwrap();
        a.is_generic = true;
        a
    }

    #[test]
    fn test_ordinals_and_markers() {
        let body = generate(&[arch()]);
        let nil = body.find("  OpNil,").unwrap();
        let add = body.find("  OpAddI32,").unwrap();
        let generic_end = body.find("  Op_GENERIC_END,").unwrap();
        let max = body.find("  Op_MAX").unwrap();
        assert!(nil < add && add < generic_end && generic_end < max);
        assert!(body.starts_with(START));
        assert!(body.ends_with(END));
    }

    #[test]
    fn test_comments_carried_through() {
        let body = generate(&[arch()]);
        assert!(body.contains("  // nil op"));
        assert!(body.contains("OpAddI32,\t// addition"));
    }
}
