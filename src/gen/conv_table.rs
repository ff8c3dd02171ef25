//! Conversion table emitter
//!
//! A dense 2-D matrix mapping (source type code, destination type code) to
//! the `Conv*` operator performing that conversion, `OpNil` where no
//! conversion exists. The matrix is indexed by type-code ordinal in both
//! dimensions, so rows and cells follow the declared type-code order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::{Error, Result};
use crate::gen::do_not_edit;
use crate::registry::TypeCodeMap;
use crate::schema::{Arch, Op, Sig};

/// Start marker line
pub const START: &str = "const IROp _IROpConvMap[TypeCode_NUM_END][TypeCode_NUM_END] = {";
/// End marker of the table
pub const END: &str = "};";

/// Operator name prefix identifying conversion ops
const CONV_PREFIX: &str = "Conv";

type ConvTable<'a> = BTreeMap<String, BTreeMap<String, &'a Op>>;

/// Builds the (source code, destination code) table from the `Conv*` ops.
///
/// The identity `bool` row is pre-seeded so a schema need not declare a
/// no-op bool conversion. A `Conv*` op whose input or output irtype maps
/// to several type codes (e.g. `i32`) fills every matching cell.
fn conv_table<'a>(base: &'a Arch, map: &TypeCodeMap) -> Result<ConvTable<'a>> {
    let mut table: ConvTable<'a> = BTreeMap::new();
    table.insert("bool".to_string(), BTreeMap::new());

    for op in &base.ops {
        if !op.name.starts_with(CONV_PREFIX) {
            continue;
        }
        let input = match &op.input {
            Sig::One(irtype) => irtype,
            _ => return Err(Error::ConvInputArity { op: op.name.clone() }),
        };
        let output = match &op.output {
            Sig::One(irtype) => irtype,
            _ => return Err(Error::ConvOutputArity { op: op.name.clone() }),
        };

        let from_codes = map
            .type_codes_for_irtype(input)
            .ok_or_else(|| Error::UnknownIrType {
                op: op.name.clone(),
                irtype: input.clone(),
            })?;
        let to_codes = map
            .type_codes_for_irtype(output)
            .ok_or_else(|| Error::UnknownIrType {
                op: op.name.clone(),
                irtype: output.clone(),
            })?;

        for from in from_codes {
            for to in to_codes {
                let row = table.entry(from.clone()).or_default();
                if let Some(first) = row.get(to) {
                    return Err(Error::DuplicateConv {
                        from: from.clone(),
                        to: to.clone(),
                        first: first.name.clone(),
                        second: op.name.clone(),
                    });
                }
                row.insert(to.clone(), op);
            }
        }
    }
    Ok(table)
}

fn check_coverage(table: &ConvTable<'_>, map: &TypeCodeMap, type_codes: &[String]) -> Result<()> {
    let want = map.canonical_count();

    if table.len() < want {
        let missing: Vec<&str> = type_codes
            .iter()
            .map(String::as_str)
            .filter(|c| !map.is_alias(c) && !table.contains_key(*c))
            .collect();
        return Err(Error::MissingConvSources {
            missing: missing.join(" -> *, "),
        });
    }

    let mut dests: BTreeSet<&str> = BTreeSet::new();
    dests.insert("bool");
    for row in table.values() {
        for to in row.keys() {
            dests.insert(to.as_str());
        }
    }
    if dests.len() < want {
        let missing: Vec<&str> = type_codes
            .iter()
            .map(String::as_str)
            .filter(|c| !map.is_alias(c) && !dests.contains(*c))
            .collect();
        return Err(Error::MissingConvDests {
            missing: missing.join(", * -> "),
        });
    }
    Ok(())
}

// uint32 -> int32 and the like only reinterpret the sign bit
fn is_sign_reinterpret(a: &str, b: &str) -> bool {
    (b.starts_with('u') && b[1..] == *a) || (a.starts_with('u') && a[1..] == *b)
}

// (from, to) pairs with no conversion op; identity and sign-reinterpret
// gaps need no op and are not reported
fn uncovered_pairs(table: &ConvTable<'_>, map: &TypeCodeMap, type_codes: &[String]) -> Vec<String> {
    let mut pairs = Vec::new();
    for from in type_codes {
        let from_canonical = map.resolve_alias(from);
        let row = table.get(from_canonical);
        for to in type_codes {
            let to_canonical = map.resolve_alias(to);
            if row.is_some_and(|r| r.contains_key(to_canonical)) {
                continue;
            }
            if from_canonical != to_canonical && !is_sign_reinterpret(from_canonical, to_canonical)
            {
                pairs.push(format!("{} -> {}", from, to));
            }
        }
    }
    pairs
}

/// Generates the `_IROpConvMap` matrix body.
///
/// Fails if any canonical type code is never a conversion source or never
/// a destination; individual uncovered (from, to) pairs only log a warning
/// since plenty of pairs are intentionally unreachable in one step.
pub fn generate(base: &Arch, map: &TypeCodeMap, type_codes: &[String]) -> Result<String> {
    let table = conv_table(base, map)?;
    check_coverage(&table, map, type_codes)?;

    let mut lines = vec![START.to_string(), do_not_edit()];
    for from in type_codes {
        lines.push(format!("  {{ // {} -> ...", from));
        let row = table.get(map.resolve_alias(from));
        for to in type_codes {
            let op_name = row
                .and_then(|r| r.get(map.resolve_alias(to)))
                .map(|op| op.name.as_str())
                .unwrap_or("Nil");
            lines.push(format!("    /* -> {} */ Op{},", to, op_name));
        }
        lines.push("  },".to_string());
    }
    lines.push(END.to_string());

    let uncovered = uncovered_pairs(&table, map, type_codes);
    if !uncovered.is_empty() {
        warn!(
            pairs = uncovered.len(),
            "conversion pairs without a matching op: {}",
            uncovered.join(", ")
        );
    }

    Ok(lines.join("\n"))
}
