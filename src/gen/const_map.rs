//! Constant-operator map emitter
//!
//! One constant-producing operator per type code, indexed by the type-code
//! ordinal. A type code resolves through its alias and then through its
//! irtypes most specific first, taking the first constant op found.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::gen::do_not_edit;
use crate::registry::TypeCodeMap;
use crate::schema::{Arch, Op, OpFlag, Sig};

/// Start marker line
pub const START: &str = "const IROp _IROpConstMap[TypeCode_NUM_END] = {";
/// End marker of the table
pub const END: &str = "};";

/// Collects constant-flagged ops keyed by their output irtype.
///
/// Each constant op must produce exactly one output, and no two constant
/// ops may produce the same irtype.
pub fn constant_ops(archs: &[Arch]) -> Result<BTreeMap<String, &Op>> {
    let mut const_ops: BTreeMap<String, &Op> = BTreeMap::new();
    for arch in archs {
        for op in &arch.ops {
            if !op.has_flag(OpFlag::Constant) {
                continue;
            }
            let irtype = match &op.output {
                Sig::One(irtype) => irtype.clone(),
                other => {
                    return Err(Error::ConstOpOutputArity {
                        op: op.name.clone(),
                        count: other.count(),
                    });
                }
            };
            if let Some(existing) = const_ops.get(&irtype) {
                return Err(Error::DuplicateConstOp {
                    op: op.name.clone(),
                    irtype,
                    existing: existing.name.clone(),
                });
            }
            const_ops.insert(irtype, op);
        }
    }
    Ok(const_ops)
}

/// Generates the `_IROpConstMap` table body
pub fn generate(base: &Arch, map: &TypeCodeMap, type_codes: &[String]) -> Result<String> {
    let const_ops = constant_ops(std::slice::from_ref(base))?;
    let width = map.longest_code();
    let mut lines = vec![START.to_string(), do_not_edit()];
    for type_code in type_codes {
        let canonical = map.resolve_alias(type_code);
        let irtypes = map.irtypes(canonical).unwrap_or(&[]);
        let op = irtypes
            .iter()
            .find_map(|irtype| const_ops.get(irtype))
            .ok_or_else(|| Error::NoConstOp {
                type_code: type_code.clone(),
            })?;
        lines.push(format!(
            "  /* TypeCode_{:<width$} = */ Op{},",
            type_code, op.name
        ));
    }
    lines.push(END.to_string());
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "(ops
  (ConstBool () -> bool Constant (aux bool))
  (ConstI8   () -> s8   Constant (aux i8))
  (ConstU8   () -> u8   Constant (aux i8))
  (ConstI16  () -> s16  Constant (aux i16))
  (ConstU16  () -> u16  Constant (aux i16))
  (ConstI32  () -> s32  Constant (aux i32))
  (ConstU32  () -> u32  Constant (aux i32))
  (ConstI64  () -> s64  Constant (aux i64))
  (ConstU64  () -> u64  Constant (aux i64))
  (ConstF32  () -> f32  Constant (aux f32))
  (ConstF64  () -> f64  Constant (aux f64))
)
";

    fn codes() -> Vec<String> {
        [
            "bool", "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64", "uint64",
            "float32", "float64", "int", "uint",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_one_entry_per_type_code() {
        let arch = Arch::parse("arch_base.lisp", SCHEMA).unwrap();
        let map = TypeCodeMap::builtin();
        let body = generate(&arch, &map, &codes()).unwrap();
        assert!(body.contains("  /* TypeCode_bool    = */ OpConstBool,"));
        assert!(body.contains("  /* TypeCode_int32   = */ OpConstI32,"));
        // aliases resolve to their canonical width
        assert!(body.contains("  /* TypeCode_int     = */ OpConstI32,"));
        assert!(body.contains("  /* TypeCode_uint    = */ OpConstU32,"));
        assert_eq!(body.lines().count(), 2 + codes().len() + 1);
    }

    #[test]
    fn test_missing_const_op_fails() {
        let schema = SCHEMA.replace("  (ConstF64  () -> f64  Constant (aux f64))\n", "");
        let arch = Arch::parse("arch_base.lisp", &schema).unwrap();
        let map = TypeCodeMap::builtin();
        let err = generate(&arch, &map, &codes()).unwrap_err();
        match err {
            Error::NoConstOp { type_code } => assert_eq!(type_code, "float64"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_const_op_fails() {
        let schema = SCHEMA.replace(
            "(ConstF64  () -> f64  Constant (aux f64))",
            "(ConstF64  () -> f64  Constant (aux f64))\n  (ConstF64b () -> f64 Constant)",
        );
        let arch = Arch::parse("arch_base.lisp", &schema).unwrap();
        let err = constant_ops(std::slice::from_ref(&arch)).unwrap_err();
        assert!(matches!(err, Error::DuplicateConstOp { .. }));
    }

    #[test]
    fn test_multi_value_const_op_fails() {
        let arch = Arch::parse("arch_base.lisp", "(ops\n  (ConstNone () -> () Constant)\n)\n")
            .unwrap();
        let err = constant_ops(std::slice::from_ref(&arch)).unwrap_err();
        match err {
            Error::ConstOpOutputArity { op, count } => {
                assert_eq!(op, "ConstNone");
                assert_eq!(count, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
