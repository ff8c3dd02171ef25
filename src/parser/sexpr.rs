use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lexer::SExprScanner;

/// A generic s-expression: an atom (symbol, integer or float) or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SExpr {
    /// Symbol atom
    Sym(String),
    /// Integer atom
    Int(i64),
    /// Float atom
    Float(f64),
    /// Nested list
    List(Vec<SExpr>),
}

impl SExpr {
    /// Returns the symbol text if this is a symbol atom
    pub fn as_sym(&self) -> Option<&str> {
        match self {
            SExpr::Sym(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the child forms if this is a list
    pub fn as_list(&self) -> Option<&[SExpr]> {
        match self {
            SExpr::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for atoms (anything that is not a list)
    pub fn is_atom(&self) -> bool {
        !matches!(self, SExpr::List(_))
    }

    /// True for the synthetic comment forms `(; ...)` and `(;; ...)`
    /// produced by the scanner's comment rewriting
    pub fn is_comment_form(&self) -> bool {
        matches!(
            self.as_list().and_then(|l| l.first()).and_then(SExpr::as_sym),
            Some(";") | Some(";;")
        )
    }
}

impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExpr::Sym(s) => write!(f, "{}", s),
            SExpr::Int(n) => write!(f, "{}", n),
            SExpr::Float(x) => write!(f, "{}", x),
            SExpr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Reads s-expressions from a scanned token stream
pub struct SExprReader {
    tokens: Vec<String>,
    current: usize,
}

impl SExprReader {
    /// Creates a reader over a token stream
    pub fn new(tokens: Vec<String>) -> Self {
        SExprReader { tokens, current: 0 }
    }

    /// Reads one expression from the stream
    pub fn read_expr(&mut self) -> Result<SExpr> {
        let token = self.next_token()?;
        match token.as_str() {
            "(" => {
                let mut items = Vec::new();
                loop {
                    match self.peek() {
                        None => return Err(Error::UnexpectedEof),
                        Some(")") => {
                            self.current += 1;
                            return Ok(SExpr::List(items));
                        }
                        Some(_) => items.push(self.read_expr()?),
                    }
                }
            }
            ")" => Err(Error::UnexpectedCloseParen),
            _ => Ok(atom(&token)),
        }
    }

    fn next_token(&mut self) -> Result<String> {
        let token = self.tokens.get(self.current).cloned().ok_or(Error::UnexpectedEof)?;
        self.current += 1;
        Ok(token)
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.current).map(String::as_str)
    }
}

/// Classifies a leaf token: integer, else float, else symbol.
fn atom(token: &str) -> SExpr {
    if let Ok(n) = token.parse::<i64>() {
        SExpr::Int(n)
    } else if let Ok(x) = token.parse::<f64>() {
        SExpr::Float(x)
    } else {
        SExpr::Sym(token.to_string())
    }
}

/// Parses a whole schema source as an implicit top-level list of forms.
pub fn parse_document(source: &str) -> Result<Vec<SExpr>> {
    let wrapped = format!("(\n{}\n)", source);
    let tokens = SExprScanner::new(&wrapped).scan_tokens();
    let mut reader = SExprReader::new(tokens);
    match reader.read_expr()? {
        SExpr::List(forms) => Ok(forms),
        // the wrapping parentheses guarantee a list
        other => Err(Error::MalformedOp {
            form: other.to_string(),
            reason: "expected a top-level list".to_string(),
        }),
    }
}
