//! Descriptor table emitter
//!
//! One `IROpDescr` row per operator, indexed by ordinal: the flag bitmask,
//! the result type code, and the auxiliary-storage kind. An irtype shared
//! by several type codes (e.g. `i32`) makes the result type parametric on
//! the first input, emitted as `TypeCode_param1`; so does `mem`, which has
//! no type-code constant of its own.

use crate::error::{Error, Result};
use crate::gen::do_not_edit;
use crate::registry::{AuxTable, TypeCodeMap};
use crate::schema::{Arch, Op, Sig};

/// Start marker line
pub const START: &str = "const IROpDescr _IROpInfoMap[Op_MAX] = {";
/// End marker of the table
pub const END: &str = "};";

fn flags_field(op: &Op) -> String {
    if op.flags.is_empty() {
        return "IROpFlagNone".to_string();
    }
    let mut names: Vec<&str> = op.flags.iter().map(|f| f.name()).collect();
    names.sort_unstable();
    names
        .iter()
        .map(|name| format!("IROpFlag{}", name))
        .collect::<Vec<_>>()
        .join("|")
}

// (value, comment); a non-empty comment is rendered inline as /*comment*/
fn output_type_field(op: &Op, map: &TypeCodeMap) -> Result<(String, String)> {
    let irtype = match &op.output {
        Sig::One(irtype) => irtype,
        Sig::None => return Ok(("TypeCode_nil".to_string(), String::new())),
        // multi-output is rejected at parse, but don't silently mis-emit
        Sig::Two(a, _) => {
            return Err(Error::UnknownIrType {
                op: op.name.clone(),
                irtype: a.clone(),
            });
        }
    };
    let type_codes = map
        .type_codes_for_irtype(irtype)
        .ok_or_else(|| Error::UnknownIrType {
            op: op.name.clone(),
            irtype: irtype.clone(),
        })?;
    // a lone type code only resolves directly if a constant exists for it;
    // `mem` has none and stays parametric
    if type_codes.len() == 1 && map.contains(&type_codes[0]) {
        return Ok((format!("TypeCode_{}", type_codes[0]), String::new()));
    }
    // ambiguous result type: it must mirror one of the inputs
    let matched = match &op.input {
        Sig::None | Sig::One(_) => true,
        Sig::Two(_, _) => op.input.iter().any(|intype| intype == irtype),
    };
    if !matched {
        return Err(Error::NoMatchingInputType {
            op: op.name.clone(),
            output: irtype.clone(),
        });
    }
    Ok(("TypeCode_param1".to_string(), irtype.clone()))
}

fn aux_field(op: &Op, aux: &AuxTable) -> Result<String> {
    let Some(args) = op.aux() else {
        return Ok("IRAuxNone".to_string());
    };
    if args.len() != 1 {
        return Err(Error::InvalidAuxArity {
            op: op.name.clone(),
            got: args.join(" "),
        });
    }
    let kind = aux
        .kind_for_irtype(&args[0])
        .ok_or_else(|| Error::UnknownAuxType {
            op: op.name.clone(),
            irtype: args[0].clone(),
            expected: aux.expected_irtypes(),
        })?;
    Ok(kind.to_string())
}

/// Generates the `_IROpInfoMap` table body
pub fn generate(archs: &[Arch], map: &TypeCodeMap, aux: &AuxTable) -> Result<String> {
    let mut lines = vec![START.to_string(), do_not_edit()];
    for arch in archs {
        for op in &arch.ops {
            let (out_value, out_comment) = output_type_field(op, map)?;
            let out_field = if out_comment.is_empty() {
                out_value
            } else {
                format!("{}/*{}*/", out_value, out_comment)
            };
            let fields = [flags_field(op), out_field, aux_field(op, aux)?];
            lines.push(format!("  {{ /* Op{} */ {} }},", op.name, fields.join(", ")));
        }
        if arch.is_generic {
            // ZERO entry for Op_GENERIC_END
            lines.push("  {0,0,0}, // Op_GENERIC_END".to_string());
        }
    }
    lines.push(END.to_string());
    Ok(lines.join("\n"))
}
