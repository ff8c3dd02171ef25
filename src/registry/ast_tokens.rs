use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

lazy_static! {
    // _( name, "repr" )
    static ref TOKEN_RE: Regex = Regex::new(r#"^\s*_\(\s*(\w+)\s*,\s*"([^"]*)""#).unwrap();
}

/// Start substring marking the token enumeration in the declaration
pub const TOKENS_START: &str = "#define TOKENS(";
/// Sentinel token opening the primary-operator recording window
pub const PRIM_OPS_START: &str = "T_PRIM_OPS_START";
/// Sentinel token closing the primary-operator recording window
pub const PRIM_OPS_END: &str = "T_PRIM_OPS_END";

/// IR operator name prefixes for one source-language token: one prefix for
/// the unary form, one for the binary form (either may be absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpPrefixes {
    /// Prefix matching 1-input ops, e.g. `Neg` for `-`
    pub unary: Option<String>,
    /// Prefix matching 2-input ops, e.g. `Sub` for `-`
    pub binary: Option<String>,
}

/// Mapping from source-language operator tokens to IR operator prefixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstOpMap {
    entries: Vec<(String, OpPrefixes)>,
}

impl AstOpMap {
    /// Builds a map from explicit (token, prefixes) entries
    pub fn new(entries: Vec<(String, OpPrefixes)>) -> Self {
        AstOpMap { entries }
    }

    /// The builtin table, kept 1:1 with the primary-operator window of the
    /// external token declaration.
    pub fn builtin() -> Self {
        let entry = |token: &str, unary: Option<&str>, binary: Option<&str>| {
            (
                token.to_string(),
                OpPrefixes {
                    unary: unary.map(str::to_string),
                    binary: binary.map(str::to_string),
                },
            )
        };
        Self::new(vec![
            entry("TStar", None, Some("Mul")),
            entry("TSlash", None, Some("Div")),
            entry("TShl", None, Some("ShL")),
            entry("TShr", None, Some("ShR")),
            entry("TAnd", None, Some("And")),
            entry("TPercent", None, Some("Rem")),
            entry("TPlus", Some("Pos"), Some("Add")),
            entry("TMinus", Some("Neg"), Some("Sub")),
            entry("TPipe", None, Some("Or")),
            entry("THat", Some("Compl"), Some("XOr")),
            entry("TTilde", Some("BNot"), None),
            entry("TEq", None, Some("Eq")),
            entry("TNEq", None, Some("NEq")),
            entry("TLt", None, Some("Less")),
            entry("TLEq", None, Some("LEq")),
            entry("TGt", None, Some("Greater")),
            entry("TGEq", None, Some("GEq")),
            entry("TPlusPlus", Some("Incr"), None),
            entry("TMinusMinus", Some("Decr"), None),
            entry("TExcalm", Some("Not"), None),
        ])
    }

    /// Iterates (token, prefixes) in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OpPrefixes)> {
        self.entries.iter().map(|(t, p)| (t.as_str(), p))
    }

    /// True if the token is in the map
    pub fn contains(&self, token: &str) -> bool {
        self.entries.iter().any(|(t, _)| t == token)
    }

    /// Number of tokens in the map
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scans a token declaration source for the primary-operator tokens and
/// cross-validates them both ways against the builtin prefix map.
///
/// Only tokens strictly between the [`PRIM_OPS_START`] and
/// [`PRIM_OPS_END`] sentinels are recorded; each is returned with its
/// unescaped textual representation.
pub fn load_ast_tokens(
    map: &AstOpMap,
    path_label: &str,
    text: &str,
) -> Result<Vec<(String, String)>> {
    let mut tokens = Vec::new();
    let mut verified: BTreeSet<&str> = BTreeSet::new();
    let mut started = false;
    let mut in_window = false;
    let mut ended = false;

    for line in text.lines() {
        if !started {
            if line.contains(TOKENS_START) {
                started = true;
            }
            continue;
        }
        let Some(caps) = TOKEN_RE.captures(line) else {
            continue;
        };
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if !in_window {
            if name == PRIM_OPS_START {
                in_window = true;
            }
            continue;
        }
        if name == PRIM_OPS_END {
            ended = true;
            break;
        }
        if !map.contains(name) {
            return Err(Error::UnknownAstToken {
                name: name.to_string(),
            });
        }
        if let Some((key, _)) = map.entries.iter().find(|(t, _)| t == name) {
            verified.insert(key.as_str());
        }
        let repr = caps
            .get(2)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .replace("\\\"", "\"");
        tokens.push((name.to_string(), repr));
    }

    if !started {
        return Err(Error::DeclStartNotFound {
            marker: TOKENS_START.to_string(),
            path: path_label.to_string(),
        });
    }
    if !in_window {
        return Err(Error::DeclStartNotFound {
            marker: PRIM_OPS_START.to_string(),
            path: path_label.to_string(),
        });
    }
    if !ended {
        return Err(Error::DeclEndNotFound {
            name: PRIM_OPS_END.to_string(),
            path: path_label.to_string(),
        });
    }

    if verified.len() != map.len() {
        let missing: Vec<&str> = map
            .entries
            .iter()
            .map(|(t, _)| t.as_str())
            .filter(|t| !verified.contains(t))
            .collect();
        return Err(Error::MissingAstTokens {
            count: missing.len(),
            path: path_label.to_string(),
            missing: missing.join(", "),
        });
    }

    Ok(tokens)
}
