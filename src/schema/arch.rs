use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lexer::decode_comment;
use crate::parser::{parse_document, SExpr};
use crate::schema::Op;

/// One architecture's operator set plus its scalar width attributes.
///
/// Exactly one architecture (the base/generic one) is always present;
/// additional architectures are extension points layered on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arch {
    /// Architecture name
    pub name: String,
    /// Label of the schema source this was loaded from
    pub source: String,
    /// True for the base/generic architecture
    pub is_generic: bool,
    /// Address size in bytes
    pub addr_size: i64,
    /// Register size in bytes
    pub reg_size: i64,
    /// Native integer size in bytes
    pub int_size: i64,
    /// Operators in declaration order
    pub ops: Vec<Op>,
}

impl Arch {
    /// Loads an architecture from schema source text.
    ///
    /// `source_label` names the origin (a path, usually) for generated-by
    /// comments and diagnostics.
    pub fn parse(source_label: &str, text: &str) -> Result<Arch> {
        let mut arch = Arch {
            name: "_".to_string(),
            source: source_label.to_string(),
            is_generic: false,
            addr_size: 0,
            reg_size: 0,
            int_size: 0,
            ops: Vec::new(),
        };

        for form in parse_document(text)? {
            if form.is_comment_form() {
                continue;
            }
            let items = form.as_list().ok_or_else(|| Error::UnknownArchAttr {
                key: form.to_string(),
            })?;
            let key = items
                .first()
                .and_then(SExpr::as_sym)
                .ok_or_else(|| Error::UnknownArchAttr {
                    key: form.to_string(),
                })?;

            match key {
                "ops" => arch.parse_ops(&items[1..])?,
                "name" => arch.name = scalar_sym(key, items)?,
                "addrSize" => arch.addr_size = scalar_int(key, items)?,
                "regSize" => arch.reg_size = scalar_int(key, items)?,
                "intSize" => arch.int_size = scalar_int(key, items)?,
                _ => {
                    return Err(Error::UnknownArchAttr {
                        key: key.to_string(),
                    })
                }
            }
        }

        Ok(arch)
    }

    fn parse_ops(&mut self, forms: &[SExpr]) -> Result<()> {
        let mut comments_pre: Vec<String> = Vec::new();
        let mut comments_post: Vec<String> = Vec::new();
        let mut last_op: Option<usize> = None;

        for form in forms {
            let items = form.as_list().ok_or_else(|| Error::UnexpectedOpsForm {
                form: form.to_string(),
            })?;

            match items.first().and_then(SExpr::as_sym) {
                Some(";") => {
                    comments_pre.push(comment_text(items));
                    continue;
                }
                Some(";;") => {
                    comments_post.push(comment_text(items));
                    continue;
                }
                _ => {}
            }

            // trailing comments seen since the previous op belong to it
            if let Some(idx) = last_op {
                if !comments_post.is_empty() {
                    self.ops[idx].comments_post = std::mem::take(&mut comments_post);
                }
            }

            let mut op = Op::parse(items)?;
            op.comments_pre = std::mem::take(&mut comments_pre);
            self.ops.push(op);
            last_op = Some(self.ops.len() - 1);
        }

        // comments trailing the very last op
        if let Some(idx) = last_op {
            if !comments_post.is_empty() {
                self.ops[idx].comments_post = comments_post;
            }
        }

        Ok(())
    }
}

fn comment_text(items: &[SExpr]) -> String {
    items
        .get(1)
        .and_then(SExpr::as_sym)
        .map(decode_comment)
        .unwrap_or_default()
}

fn scalar_sym(key: &str, items: &[SExpr]) -> Result<String> {
    if items.len() != 2 {
        return Err(malformed(key, items));
    }
    items[1]
        .as_sym()
        .map(str::to_string)
        .ok_or_else(|| malformed(key, items))
}

fn scalar_int(key: &str, items: &[SExpr]) -> Result<i64> {
    if items.len() != 2 {
        return Err(malformed(key, items));
    }
    match items[1] {
        SExpr::Int(n) => Ok(n),
        _ => Err(malformed(key, items)),
    }
}

fn malformed(key: &str, items: &[SExpr]) -> Error {
    Error::MalformedArchAttr {
        key: key.to_string(),
        form: SExpr::List(items.to_vec()).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Sig;

    const SCHEMA: &str = r#"
(name base)
(addrSize 8)
(regSize 8)
(intSize 4)

; standalone header comment, skipped

(ops
  ; integer addition
  (AddI32 (i32 i32) -> i32 Commutative)
  (NegI32 i32 -> i32)  ; negation
  (ConstI32 () -> i32 Constant (aux i32))
  ; last one
  (NoOp () -> () ZeroWidth)  ; placeholder
)
"#;

    #[test]
    fn test_scalar_attributes() {
        let arch = Arch::parse("test.lisp", SCHEMA).unwrap();
        assert_eq!(arch.name, "base");
        assert_eq!(arch.addr_size, 8);
        assert_eq!(arch.reg_size, 8);
        assert_eq!(arch.int_size, 4);
        assert_eq!(arch.ops.len(), 4);
    }

    #[test]
    fn test_pre_comments_attach_to_next_op() {
        let arch = Arch::parse("test.lisp", SCHEMA).unwrap();
        assert_eq!(arch.ops[0].comments_pre, vec![" integer addition"]);
        assert_eq!(arch.ops[3].comments_pre, vec![" last one"]);
    }

    #[test]
    fn test_post_comments_attach_to_previous_op() {
        let arch = Arch::parse("test.lisp", SCHEMA).unwrap();
        assert_eq!(arch.ops[1].comments_post, vec![" negation"]);
        // trailing comment after the final op still lands on it
        assert_eq!(arch.ops[3].comments_post, vec![" placeholder"]);
    }

    #[test]
    fn test_op_shapes() {
        let arch = Arch::parse("test.lisp", SCHEMA).unwrap();
        assert_eq!(arch.ops[1].input, Sig::One("i32".into()));
        assert_eq!(arch.ops[2].input, Sig::None);
        assert_eq!(arch.ops[3].output, Sig::None);
    }

    #[test]
    fn test_unknown_top_level_key() {
        let err = Arch::parse("test.lisp", "(wordSize 8)\n").unwrap_err();
        assert!(matches!(err, Error::UnknownArchAttr { .. }));
    }

    #[test]
    fn test_scalar_attr_arity() {
        assert!(matches!(
            Arch::parse("test.lisp", "(addrSize 8 8)\n"),
            Err(Error::MalformedArchAttr { .. })
        ));
        assert!(matches!(
            Arch::parse("test.lisp", "(addrSize eight)\n"),
            Err(Error::MalformedArchAttr { .. })
        ));
    }

    #[test]
    fn test_non_list_in_ops() {
        assert!(matches!(
            Arch::parse("test.lisp", "(ops AddI32)\n"),
            Err(Error::UnexpectedOpsForm { .. })
        ));
    }
}
