use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

lazy_static! {
    // _( name, ... )
    static ref DECL_RE: Regex = Regex::new(r"^\s*_\(\s*(\w+)").unwrap();
}

/// Start substring marking the type-code enumeration in the declaration
pub const TYPE_CODES_START: &str = "#define TYPE_CODES";
/// Sentinel name terminating the type-code enumeration
pub const TYPE_CODES_END: &str = "NUM_END";

/// Mapping from logical type codes to underlying IR value types.
///
/// Each type code maps to one or more irtypes ordered most specific to most
/// generic; a small alias table folds width-generic codes (`int`, `uint`)
/// onto their canonical width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCodeMap {
    entries: Vec<(String, Vec<String>)>,
    aliases: Vec<(String, String)>,
    reverse: BTreeMap<String, Vec<String>>,
}

impl TypeCodeMap {
    /// Builds a map from explicit entries and aliases, deriving the reverse
    /// irtype lookup (seeded with the identity `mem -> mem` entry).
    pub fn new(entries: Vec<(String, Vec<String>)>, aliases: Vec<(String, String)>) -> Self {
        let mut reverse: BTreeMap<String, Vec<String>> = BTreeMap::new();
        reverse.insert("mem".to_string(), vec!["mem".to_string()]);
        for (code, irtypes) in &entries {
            for irtype in irtypes {
                reverse.entry(irtype.clone()).or_default().push(code.clone());
            }
        }
        TypeCodeMap {
            entries,
            aliases,
            reverse,
        }
    }

    /// The builtin table, kept 1:1 with the external type declaration.
    pub fn builtin() -> Self {
        let entry = |code: &str, irtypes: &[&str]| {
            (
                code.to_string(),
                irtypes.iter().map(|s| s.to_string()).collect(),
            )
        };
        Self::new(
            vec![
                entry("bool", &["bool"]),
                entry("int8", &["s8", "i8"]),
                entry("uint8", &["u8", "i8"]),
                entry("int16", &["s16", "i16"]),
                entry("uint16", &["u16", "i16"]),
                entry("int32", &["s32", "i32"]),
                entry("uint32", &["u32", "i32"]),
                entry("int64", &["s64", "i64"]),
                entry("uint64", &["u64", "i64"]),
                entry("float32", &["f32"]),
                entry("float64", &["f64"]),
            ],
            vec![
                ("int".to_string(), "int32".to_string()),
                ("uint".to_string(), "uint32".to_string()),
            ],
        )
    }

    /// Underlying irtypes for a canonical type code, most specific first
    pub fn irtypes(&self, code: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, v)| v.as_slice())
    }

    /// Type codes an irtype belongs to, in declaration order
    pub fn type_codes_for_irtype(&self, irtype: &str) -> Option<&[String]> {
        self.reverse.get(irtype).map(Vec::as_slice)
    }

    /// Resolves an alias to its canonical code; non-aliases pass through
    pub fn resolve_alias<'a>(&'a self, code: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|(alias, _)| alias == code)
            .map(|(_, target)| target.as_str())
            .unwrap_or(code)
    }

    /// The (alias, canonical) pairs in declaration order
    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    /// True if `code` is an alias
    pub fn is_alias(&self, code: &str) -> bool {
        self.aliases.iter().any(|(alias, _)| alias == code)
    }

    /// True if `code` is a canonical map key
    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|(c, _)| c == code)
    }

    /// Number of canonical (non-alias) codes
    pub fn canonical_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of aliases
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Length of the longest canonical code, for aligned emission
    pub fn longest_code(&self) -> usize {
        self.entries.iter().map(|(c, _)| c.len()).max().unwrap_or(0)
    }

    fn all_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .map(|(c, _)| c.as_str())
            .chain(self.aliases.iter().map(|(a, _)| a.as_str()))
    }
}

/// Scans a type declaration source for the canonical, ordered type-code
/// list and cross-validates it both ways against the builtin map.
///
/// The scan starts after the first line containing [`TYPE_CODES_START`] and
/// collects every `_( name` line until the [`TYPE_CODES_END`] sentinel.
pub fn load_type_codes(map: &TypeCodeMap, path_label: &str, text: &str) -> Result<Vec<String>> {
    let mut type_codes = Vec::new();
    let mut verified: BTreeSet<&str> = BTreeSet::new();
    let mut started = false;
    let mut ended = false;

    for line in text.lines() {
        if !started {
            if line.contains(TYPE_CODES_START) {
                started = true;
            }
            continue;
        }
        let Some(caps) = DECL_RE.captures(line) else {
            continue;
        };
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if name == TYPE_CODES_END {
            ended = true;
            break;
        }
        if !map.contains(name) && !map.is_alias(name) {
            return Err(Error::UnknownTypeCode {
                name: name.to_string(),
            });
        }
        if let Some(key) = map.all_keys().find(|k| *k == name) {
            verified.insert(key);
        }
        type_codes.push(name.to_string());
    }

    if !started {
        return Err(Error::DeclStartNotFound {
            marker: TYPE_CODES_START.to_string(),
            path: path_label.to_string(),
        });
    }
    if !ended {
        return Err(Error::DeclEndNotFound {
            name: TYPE_CODES_END.to_string(),
            path: path_label.to_string(),
        });
    }

    if verified.len() != map.canonical_count() + map.alias_count() {
        let missing: Vec<&str> = map.all_keys().filter(|k| !verified.contains(k)).collect();
        return Err(Error::MissingTypeCodes {
            count: missing.len(),
            path: path_label.to_string(),
            missing: missing.join(", "),
        });
    }

    Ok(type_codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const TYPES_DECL: &str = r#"
// basic value types
#define TYPE_CODES(_) \
  _( bool      , 'b', 0 ) \
  _( int8      , '1', 0 ) \
  _( uint8     , '2', 0 ) \
  _( int16     , '3', 0 ) \
  _( uint16    , '4', 0 ) \
  _( int32     , '5', 0 ) \
  _( uint32    , '6', 0 ) \
  _( int64     , '7', 0 ) \
  _( uint64    , '8', 0 ) \
  _( float32   , 'f', 0 ) \
  _( float64   , 'F', 0 ) \
  _( int       , 'i', 0 ) \
  _( uint      , 'u', 0 ) \
  _( NUM_END, 0, 0 ) \
  _( str       , 's', 0 )
"#;

    #[test]
    fn test_load_builtin_declaration() {
        let map = TypeCodeMap::builtin();
        let codes = load_type_codes(&map, "types.h", TYPES_DECL).unwrap();
        assert_eq!(codes.len(), 13);
        assert_eq!(codes[0], "bool");
        assert_eq!(codes[12], "uint");
        // entries after NUM_END are out of scope
        assert!(!codes.contains(&"str".to_string()));
    }

    #[test]
    fn test_extra_declared_code_fails() {
        let map = TypeCodeMap::builtin();
        let decl = TYPES_DECL.replace("_( int  ", "_( int128 , 'X', 0 ) \\\n  _( int  ");
        let err = load_type_codes(&map, "types.h", &decl).unwrap_err();
        match err {
            Error::UnknownTypeCode { name } => assert_eq!(name, "int128"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_declared_code_fails() {
        let map = TypeCodeMap::builtin();
        let decl = TYPES_DECL.replace("  _( float64   , 'F', 0 ) \\\n", "");
        let err = load_type_codes(&map, "types.h", &decl).unwrap_err();
        match err {
            Error::MissingTypeCodes { missing, count, .. } => {
                assert_eq!(count, 1);
                assert!(missing.contains("float64"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_start_marker() {
        let map = TypeCodeMap::builtin();
        assert!(matches!(
            load_type_codes(&map, "types.h", "_( bool, 'b', 0 )\n"),
            Err(Error::DeclStartNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_end_sentinel() {
        let map = TypeCodeMap::builtin();
        let decl = TYPES_DECL.split("  _( NUM_END").next().unwrap();
        assert!(matches!(
            load_type_codes(&map, "types.h", decl),
            Err(Error::DeclEndNotFound { .. })
        ));
    }

    #[test]
    fn test_alias_resolution_and_reverse_lookup() {
        let map = TypeCodeMap::builtin();
        assert_eq!(map.resolve_alias("int"), "int32");
        assert_eq!(map.resolve_alias("bool"), "bool");
        assert_eq!(
            map.type_codes_for_irtype("i32"),
            Some(&["int32".to_string(), "uint32".to_string()][..])
        );
        assert_eq!(map.type_codes_for_irtype("f32"), Some(&["float32".to_string()][..]));
        assert_eq!(map.type_codes_for_irtype("mem"), Some(&["mem".to_string()][..]));
    }
}
