use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::SExpr;

/// Boolean operator properties. Encoded as bitflags downstream, so the set
/// is capped at 31 entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpFlag {
    /// Dummy op; no actual I/O
    ZeroWidth,
    /// The value is a constant; payload lives in aux
    Constant,
    /// Commutative on its first 2 arguments (e.g. addition; x+y==y+x)
    Commutative,
    /// Output and first argument must be allocated to the same register
    ResultInArg0,
    /// Outputs must not be allocated to the same registers as inputs
    ResultNotInArgs,
    /// Register allocator can recompute the value instead of spilling
    Rematerializeable,
    /// Clobbers the flags register
    ClobberFlags,
    /// Is a function call
    Call,
    /// Nil check on arg0
    NilCheck,
    /// Faults if arg0 is nil (aux encodes a small offset)
    FaultOnNilArg0,
    /// Faults if arg1 is nil (aux encodes a small offset)
    FaultOnNilArg1,
    /// Requires scratch memory space
    UsesScratch,
    /// Must not be eliminated, e.g. atomic store
    HasSideEffects,
    /// Generic op
    Generic,
    /// Operation may be lossy, e.g. converting i32 to i16
    Lossy,
}

impl OpFlag {
    /// Every flag in bit-position order, with the comment emitted next to
    /// its generated constant.
    pub const ALL: [(OpFlag, &'static str); 15] = [
        (OpFlag::ZeroWidth, "dummy op; no actual I/O."),
        (OpFlag::Constant, "true if the value is a constant. Value in aux"),
        (
            OpFlag::Commutative,
            "commutative on its first 2 arguments (e.g. addition; x+y==y+x)",
        ),
        (
            OpFlag::ResultInArg0,
            "output of v and v.args[0] must be allocated to the same register.",
        ),
        (
            OpFlag::ResultNotInArgs,
            "outputs must not be allocated to the same registers as inputs",
        ),
        (
            OpFlag::Rematerializeable,
            "register allocator can recompute value instead of spilling/restoring.",
        ),
        (OpFlag::ClobberFlags, "this op clobbers flags register"),
        (OpFlag::Call, "is a function call"),
        (OpFlag::NilCheck, "this op is a nil check on arg0"),
        (
            OpFlag::FaultOnNilArg0,
            "this op will fault if arg0 is nil (and aux encodes a small offset)",
        ),
        (
            OpFlag::FaultOnNilArg1,
            "this op will fault if arg1 is nil (and aux encodes a small offset)",
        ),
        (OpFlag::UsesScratch, "this op requires scratch memory space"),
        (
            OpFlag::HasSideEffects,
            "for \"reasons\", not to be eliminated. E.g., atomic store.",
        ),
        (OpFlag::Generic, "generic op"),
        (OpFlag::Lossy, "operation may be lossy. E.g. converting i32 to i16."),
    ];

    /// Flag name as it appears in schemas and generated constants
    pub fn name(self) -> &'static str {
        match self {
            OpFlag::ZeroWidth => "ZeroWidth",
            OpFlag::Constant => "Constant",
            OpFlag::Commutative => "Commutative",
            OpFlag::ResultInArg0 => "ResultInArg0",
            OpFlag::ResultNotInArgs => "ResultNotInArgs",
            OpFlag::Rematerializeable => "Rematerializeable",
            OpFlag::ClobberFlags => "ClobberFlags",
            OpFlag::Call => "Call",
            OpFlag::NilCheck => "NilCheck",
            OpFlag::FaultOnNilArg0 => "FaultOnNilArg0",
            OpFlag::FaultOnNilArg1 => "FaultOnNilArg1",
            OpFlag::UsesScratch => "UsesScratch",
            OpFlag::HasSideEffects => "HasSideEffects",
            OpFlag::Generic => "Generic",
            OpFlag::Lossy => "Lossy",
        }
    }

    /// Bit position assigned in declaration order
    pub fn bit(self) -> u32 {
        Self::ALL
            .iter()
            .position(|(f, _)| *f == self)
            .map(|i| i as u32)
            .unwrap_or(0)
    }

    /// Looks a flag up by its schema symbol
    pub fn from_symbol(symbol: &str) -> Option<OpFlag> {
        Self::ALL.iter().find(|(f, _)| f.name() == symbol).map(|(f, _)| *f)
    }

    /// Sorted flag names for error messages
    pub fn expected_list() -> String {
        let mut names: Vec<&str> = Self::ALL.iter().map(|(f, _)| f.name()).collect();
        names.sort_unstable();
        names.join("\n  ")
    }
}

// the flag set must stay encodable as a 32-bit bitmask
const _: () = assert!(OpFlag::ALL.len() <= 31);

/// Keys accepted in `(key value...)` operator attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttrKey {
    /// Irtype of the auxiliary immediate payload, e.g. `(aux u32)`
    Aux,
}

impl AttrKey {
    /// Key name as written in schemas
    pub fn name(self) -> &'static str {
        match self {
            AttrKey::Aux => "aux",
        }
    }

    /// Looks a key up by its schema symbol
    pub fn from_symbol(symbol: &str) -> Option<AttrKey> {
        match symbol {
            "aux" => Some(AttrKey::Aux),
            _ => None,
        }
    }

    /// Accepted key names for error messages
    pub fn expected_list() -> String {
        "aux".to_string()
    }
}

/// Operand signature: zero, one or two irtype symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sig {
    /// No operands (nullary / no result)
    None,
    /// Single operand
    One(String),
    /// Ordered operand pair
    Two(String, String),
}

impl Sig {
    /// Canonical string key, e.g. `""`, `"i32"`, `"i32 i32"`
    pub fn key(&self) -> String {
        match self {
            Sig::None => String::new(),
            Sig::One(a) => a.clone(),
            Sig::Two(a, b) => format!("{} {}", a, b),
        }
    }

    /// Number of operands
    pub fn count(&self) -> usize {
        match self {
            Sig::None => 0,
            Sig::One(_) => 1,
            Sig::Two(_, _) => 2,
        }
    }

    /// First operand irtype, if any
    pub fn first(&self) -> Option<&str> {
        match self {
            Sig::None => None,
            Sig::One(a) | Sig::Two(a, _) => Some(a),
        }
    }

    /// Iterates the operand irtypes in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let items: Vec<&str> = match self {
            Sig::None => vec![],
            Sig::One(a) => vec![a.as_str()],
            Sig::Two(a, b) => vec![a.as_str(), b.as_str()],
        };
        items.into_iter()
    }
}

/// One IR operation from the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Op {
    /// Unique name within the architecture
    pub name: String,
    /// Input signature
    pub input: Sig,
    /// Output signature (never [`Sig::Two`]; multi-output is rejected)
    pub output: Sig,
    /// Flag set
    pub flags: BTreeSet<OpFlag>,
    /// Keyed attributes; values are irtype symbols
    pub attributes: BTreeMap<AttrKey, Vec<String>>,
    /// Comment lines preceding the op form
    pub comments_pre: Vec<String>,
    /// Comment lines trailing the op form
    pub comments_post: Vec<String>,
}

impl Op {
    /// Parses one operator form: `(Name INPUT -> OUTPUT ATTRIBUTES...)`.
    /// Pre/post comments are attached afterwards by the arch loader.
    pub fn parse(form: &[SExpr]) -> Result<Op> {
        let rendered = || SExpr::List(form.to_vec()).to_string();
        if form.len() < 4 {
            return Err(Error::MalformedOp {
                form: rendered(),
                reason: "not enough elements (expected Name INPUT -> OUTPUT)".to_string(),
            });
        }
        let name = form[0]
            .as_sym()
            .ok_or_else(|| Error::MalformedOp {
                form: rendered(),
                reason: "operation should start with a name".to_string(),
            })?
            .to_string();
        if form[2].as_sym() != Some("->") {
            return Err(Error::MalformedOp {
                form: rendered(),
                reason: "missing '->'".to_string(),
            });
        }

        let input = parse_sig(&form[1], &name, true)?;
        let output = parse_sig(&form[3], &name, false)?;

        let mut flags = BTreeSet::new();
        let mut attributes: BTreeMap<AttrKey, Vec<String>> = BTreeMap::new();
        for attr in &form[4..] {
            match attr {
                SExpr::Sym(symbol) => {
                    let flag = OpFlag::from_symbol(symbol).ok_or_else(|| Error::UnknownFlag {
                        op: name.clone(),
                        flag: symbol.clone(),
                        expected: OpFlag::expected_list(),
                    })?;
                    flags.insert(flag);
                }
                SExpr::List(items) if items.len() >= 2 => {
                    let key_sym = items[0].as_sym().ok_or_else(|| Error::InvalidAttribute {
                        op: name.clone(),
                        form: attr.to_string(),
                    })?;
                    let key = AttrKey::from_symbol(key_sym).ok_or_else(|| Error::UnknownAttrKey {
                        op: name.clone(),
                        key: key_sym.to_string(),
                        expected: AttrKey::expected_list(),
                    })?;
                    let mut values = Vec::new();
                    for value in &items[1..] {
                        let sym = value.as_sym().ok_or_else(|| Error::InvalidAttribute {
                            op: name.clone(),
                            form: attr.to_string(),
                        })?;
                        values.push(sym.to_string());
                    }
                    attributes.insert(key, values);
                }
                _ => {
                    return Err(Error::InvalidAttribute {
                        op: name.clone(),
                        form: attr.to_string(),
                    });
                }
            }
        }

        Ok(Op {
            name,
            input,
            output,
            flags,
            attributes,
            comments_pre: Vec::new(),
            comments_post: Vec::new(),
        })
    }

    /// True if the op carries the given flag
    pub fn has_flag(&self, flag: OpFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// The `aux` attribute's irtype arguments, if present
    pub fn aux(&self) -> Option<&[String]> {
        self.attributes.get(&AttrKey::Aux).map(Vec::as_slice)
    }

    /// Canonical input signature key
    pub fn input_key(&self) -> String {
        self.input.key()
    }

    /// Canonical output signature key
    pub fn output_key(&self) -> String {
        self.output.key()
    }
}

fn parse_sig(expr: &SExpr, op: &str, is_input: bool) -> Result<Sig> {
    let fail = |reason: &str| Error::MalformedOp {
        form: format!("({} ...)", op),
        reason: reason.to_string(),
    };
    let sym_of = |e: &SExpr| -> Result<String> {
        e.as_sym()
            .map(str::to_string)
            .ok_or_else(|| fail("signature elements must be irtype symbols"))
    };
    match expr {
        SExpr::Sym(s) => Ok(Sig::One(s.clone())),
        SExpr::List(items) => match items.len() {
            0 => Ok(Sig::None),
            1 => Ok(Sig::One(sym_of(&items[0])?)),
            2 if is_input => Ok(Sig::Two(sym_of(&items[0])?, sym_of(&items[1])?)),
            _ if is_input => Err(fail("at most 2 inputs are supported")),
            _ => Err(fail("multi-output ops are not supported")),
        },
        _ => Err(fail("signature must be an irtype symbol or a list")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::SExprScanner;
    use crate::parser::SExprReader;

    fn parse_op(source: &str) -> Result<Op> {
        let tokens = SExprScanner::new(&format!("{}\n", source)).scan_tokens();
        let expr = SExprReader::new(tokens).read_expr().unwrap();
        Op::parse(expr.as_list().unwrap())
    }

    #[test]
    fn test_binary_op_with_flags() {
        let op = parse_op("(AddI16 (i16 i16) -> i16 Commutative ResultInArg0)").unwrap();
        assert_eq!(op.name, "AddI16");
        assert_eq!(op.input, Sig::Two("i16".into(), "i16".into()));
        assert_eq!(op.output, Sig::One("i16".into()));
        assert!(op.has_flag(OpFlag::Commutative));
        assert!(op.has_flag(OpFlag::ResultInArg0));
        assert_eq!(op.input_key(), "i16 i16");
    }

    #[test]
    fn test_constant_op_with_aux() {
        let op = parse_op("(ConstI32 () -> i32 Constant (aux i32))").unwrap();
        assert_eq!(op.input, Sig::None);
        assert_eq!(op.aux(), Some(&["i32".to_string()][..]));
    }

    #[test]
    fn test_missing_arrow() {
        let err = parse_op("(AddI32 (i32 i32) i32 Commutative)").unwrap_err();
        assert!(matches!(err, Error::MalformedOp { .. }));
        assert!(err.to_string().contains("->"));
    }

    #[test]
    fn test_too_few_elements() {
        assert!(matches!(
            parse_op("(AddI32 i32)"),
            Err(Error::MalformedOp { .. })
        ));
    }

    #[test]
    fn test_unknown_flag_lists_expected() {
        let err = parse_op("(AddI32 (i32 i32) -> i32 Comutative)").unwrap_err();
        match err {
            Error::UnknownFlag { flag, expected, .. } => {
                assert_eq!(flag, "Comutative");
                assert!(expected.contains("Commutative"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_attribute_key() {
        assert!(matches!(
            parse_op("(ConstI32 () -> i32 (payload i32))"),
            Err(Error::UnknownAttrKey { .. })
        ));
    }

    #[test]
    fn test_multi_output_rejected() {
        assert!(matches!(
            parse_op("(Split i64 -> (i32 i32))"),
            Err(Error::MalformedOp { .. })
        ));
    }

    #[test]
    fn test_flag_bits_are_dense() {
        assert_eq!(OpFlag::ZeroWidth.bit(), 0);
        assert_eq!(OpFlag::Constant.bit(), 1);
        assert_eq!(OpFlag::Lossy.bit(), 14);
    }

    #[test]
    fn test_single_element_input_list_is_unary() {
        let op = parse_op("(NegI32 (i32) -> i32)").unwrap();
        assert_eq!(op.input, Sig::One("i32".into()));
    }
}
