//! AST-token dispatch switch emitter
//!
//! Nested C switch statements resolving (operand type 1, operand type 2,
//! source token) to an IR operator. Operators are matched to tokens by name
//! prefix; the outer switch dispatches on the first operand's type code,
//! the middle one on the second operand (`nil` for unary forms), the inner
//! one on the token.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::gen::GENERATOR;
use crate::registry::{AstOpMap, TypeCodeMap};
use crate::schema::{Arch, Op};

/// Start marker line
pub const START: &str = "  //!BEGIN_AST_TO_IR_OP_SWITCHES";
/// End marker line
pub const END: &str = "  //!END_AST_TO_IR_OP_SWITCHES";

/// Groups prefix-matched (token, op) pairs by the op's input signature.
///
/// Two distinct ops reachable from the same token with the same signature
/// would emit duplicate case labels, so that is rejected here.
fn ops_by_input<'a>(
    base: &'a Arch,
    ast_ops: &'a AstOpMap,
) -> Result<BTreeMap<String, Vec<(&'a str, &'a Op)>>> {
    let mut by_input: BTreeMap<String, Vec<(&'a str, &'a Op)>> = BTreeMap::new();
    for (token, prefixes) in ast_ops.iter() {
        for op in &base.ops {
            let matched = prefixes
                .unary
                .as_deref()
                .is_some_and(|p| op.name.starts_with(p))
                || prefixes
                    .binary
                    .as_deref()
                    .is_some_and(|p| op.name.starts_with(p));
            if !matched {
                continue;
            }
            let sig = op.input_key();
            let entry = by_input.entry(sig.clone()).or_default();
            if let Some((_, first)) = entry.iter().find(|(t, _)| *t == token) {
                return Err(Error::DispatchCollision {
                    token: token.to_string(),
                    sig,
                    first: first.name.clone(),
                    second: op.name.clone(),
                });
            }
            entry.push((token, op));
        }
    }
    Ok(by_input)
}

// A type code with several irtype spellings (e.g. int8 as s8/i8) pulls ops
// from several signature buckets; a token may not resolve to two different
// ops within one merged bucket.
fn merge<'a>(
    acc: &mut Vec<(&'a str, &'a Op)>,
    entries: &[(&'a str, &'a Op)],
    sig: &str,
) -> Result<()> {
    for &(token, op) in entries {
        match acc.iter().find(|(t, _)| *t == token) {
            Some((_, first)) if first.name != op.name => {
                return Err(Error::DispatchCollision {
                    token: token.to_string(),
                    sig: sig.to_string(),
                    first: first.name.clone(),
                    second: op.name.clone(),
                });
            }
            Some(_) => {}
            None => acc.push((token, op)),
        }
    }
    Ok(())
}

fn token_switch(
    lines: &mut Vec<String>,
    rev_aliases: &BTreeMap<&str, Vec<&str>>,
    type_code: &str,
    ops: &[(&str, &Op)],
) {
    for alias in rev_aliases.get(type_code).into_iter().flatten() {
        lines.push(format!("      case TypeCode_{}:", alias));
    }
    lines.push(format!("      case TypeCode_{}: switch (tok) {{", type_code));
    let tok_w = ops.iter().map(|(t, _)| t.len()).max().unwrap_or(0);
    let op_w = ops.iter().map(|(_, o)| o.name.len()).max().unwrap_or(0);
    for (token, op) in ops {
        lines.push(format!(
            "        case {:<tok_w$} : return Op{:<op_w$} ;// {} -> {}",
            token,
            op.name,
            op.input_key(),
            op.output_key()
        ));
    }
    lines.push("        default: return OpNil;".to_string());
    lines.push("      }".to_string());
}

/// Generates the nested dispatch switch body.
///
/// Outer cases follow the declared type-code order; alias codes become
/// fall-through labels onto their canonical case.
pub fn generate(
    base: &Arch,
    map: &TypeCodeMap,
    ast_ops: &AstOpMap,
    type_codes: &[String],
) -> Result<String> {
    let by_input = ops_by_input(base, ast_ops)?;

    let mut rev_aliases: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (alias, target) in map.aliases() {
        rev_aliases
            .entry(target.as_str())
            .or_default()
            .push(alias.as_str());
    }

    let mut lines = vec![
        START.to_string(),
        format!("// Do not edit. Generated by {}", GENERATOR),
        "switch (type1) {".to_string(),
    ];

    for type1 in type_codes {
        if map.is_alias(type1) {
            continue;
        }
        for alias in rev_aliases.get(type1.as_str()).into_iter().flatten() {
            lines.push(format!("  case TypeCode_{}:", alias));
        }
        lines.push(format!("  case TypeCode_{}:", type1));
        lines.push("    switch (type2) {".to_string());

        let irtypes1 = map.irtypes(type1).unwrap_or(&[]);

        // unary forms: the second operand type is nil
        let mut ops1: Vec<(&str, &Op)> = Vec::new();
        for irtype in irtypes1 {
            if let Some(entries) = by_input.get(irtype.as_str()) {
                merge(&mut ops1, entries, type1)?;
            }
        }
        if !ops1.is_empty() {
            token_switch(&mut lines, &rev_aliases, "nil", &ops1);
        }

        for type2 in type_codes {
            if map.is_alias(type2) {
                continue;
            }
            let irtypes2 = map.irtypes(type2).unwrap_or(&[]);
            let mut ops2: Vec<(&str, &Op)> = Vec::new();
            for irtype1 in irtypes1 {
                for irtype2 in irtypes2 {
                    let key = format!("{} {}", irtype1, irtype2);
                    if let Some(entries) = by_input.get(key.as_str()) {
                        merge(&mut ops2, entries, &format!("{} {}", type1, type2))?;
                    }
                }
            }
            if !ops2.is_empty() {
                token_switch(&mut lines, &rev_aliases, type2, &ops2);
            }
        }

        lines.push("      default: return OpNil;".to_string());
        lines.push("    } // switch (type2)".to_string());
    }

    lines.push("  default: return OpNil;".to_string());
    lines.push("} // switch (type1)".to_string());
    lines.push(END.to_string());
    Ok(lines.join("\n  "))
}
