use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // one comment per line: everything after the first run of semicolons
    static ref COMMENT_RE: Regex = Regex::new(r"(?m)^([^;\n]*);+([^\n]*)\n").unwrap();
    static ref PAREN_RE: Regex = Regex::new(r"([()])").unwrap();
}

/// Scanner for the s-expression operator schema syntax.
///
/// Comments are not discarded: each one is rewritten into a synthetic
/// two-element list tagged `;` (comment on its own line) or `;;` (comment
/// trailing a form), so the parser sees them as ordinary forms and the
/// schema loader can attach them to operators.
pub struct SExprScanner<'a> {
    /// Schema source text
    source: &'a str,
}

impl<'a> SExprScanner<'a> {
    /// Creates a new scanner from schema source text
    pub fn new(source: &'a str) -> Self {
        SExprScanner { source }
    }

    /// Scans the source into a flat token stream.
    ///
    /// Parentheses become individual tokens; everything else splits on
    /// whitespace. Comment text is escaped (see [`encode_comment`]) so each
    /// comment tokenizes as a single atom. This is pure text processing and
    /// cannot fail; structural errors surface when the token stream is read.
    pub fn scan_tokens(&self) -> Vec<String> {
        let rewritten = COMMENT_RE.replace_all(self.source, |caps: &Captures| {
            // text before the semicolon decides whether the comment trails a
            // form (`;;`) or stands on its own line (`;`)
            let tag = if caps[1].trim().is_empty() { ";" } else { ";;" };
            format!("{}({} {})\n", &caps[1], tag, encode_comment(&caps[2]))
        });
        let padded = PAREN_RE.replace_all(&rewritten, " $1 ");
        padded.split_whitespace().map(str::to_string).collect()
    }
}

/// Escapes comment text so it survives tokenization as a single atom:
/// spaces and parentheses are mapped into control characters.
fn encode_comment(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => '\x01',
            '(' => '\x02',
            ')' => '\x03',
            c => c,
        })
        .collect()
}

/// Reverses [`encode_comment`], restoring spaces and parentheses.
pub fn decode_comment(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\x01' => ' ',
            '\x02' => '(',
            '\x03' => ')',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<String> {
        SExprScanner::new(source).scan_tokens()
    }

    #[test]
    fn test_plain_tokens() {
        let tokens = scan("(AddI32 (i32 i32) -> i32 Commutative)\n");
        assert_eq!(
            tokens,
            vec!["(", "AddI32", "(", "i32", "i32", ")", "->", "i32", "Commutative", ")"]
        );
    }

    #[test]
    fn test_own_line_comment_becomes_semi_form() {
        let tokens = scan("; integer ops\n(ops)\n");
        assert_eq!(tokens[0], "(");
        assert_eq!(tokens[1], ";");
        assert_eq!(decode_comment(&tokens[2]), " integer ops");
        assert_eq!(tokens[3], ")");
    }

    #[test]
    fn test_trailing_comment_becomes_double_semi_form() {
        let tokens = scan("(NoOp () -> ()) ; placeholder\n");
        let semi = tokens.iter().position(|t| t == ";;").unwrap();
        assert_eq!(decode_comment(&tokens[semi + 1]), " placeholder");
    }

    #[test]
    fn test_comment_with_parens_stays_one_atom() {
        let tokens = scan("; see also (aux u32) below\n");
        assert_eq!(tokens.len(), 4); // ( ; atom )
        assert_eq!(decode_comment(&tokens[2]), " see also (aux u32) below");
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let text = "x+y == y+x (commutative)";
        assert_eq!(decode_comment(&encode_comment(text)), text);
        assert!(!encode_comment(text).contains('('));
        assert!(!encode_comment(text).contains(' '));
    }
}
