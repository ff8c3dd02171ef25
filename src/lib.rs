//! # opgen - Operator-Table Compiler
//!
//! A specification compiler for the IR operator set of a C compiler
//! back-end. It reads an s-expression schema describing the operators of
//! the generic architecture, cross-validates it against the type-code and
//! token declarations of the surrounding C codebase, and patches a set of
//! generated tables in place between sentinel marker lines.
//!
//! ## Features
//!
//! - **S-expression schema** - Operators declared as `(Name INPUT -> OUTPUT FLAGS...)`
//! - **Both-ways validation** - Every declared type code and operator token must be
//!   known to the compiler, and vice versa; drift fails the run before any write
//! - **Idempotent patching** - Regenerating into an up-to-date target changes
//!   nothing but the file's mtime, so make-style builds stay quiet
//! - **Comment round-tripping** - Schema comments survive into the generated C
//!
//! ## Quick Start
//!
//! Parse a schema and inspect the operators:
//!
//! ```rust
//! use opgen::{Arch, OpFlag, Sig};
//!
//! # fn main() -> opgen::Result<()> {
//! let schema = "
//! (ops
//!   ; integer addition
//!   (AddI32 (i32 i32) -> i32 Commutative)
//!   (ConstI32 () -> i32 Constant (aux i32))
//! )
//! ";
//!
//! let arch = Arch::parse("arch_base.lisp", schema)?;
//! assert_eq!(arch.ops.len(), 2);
//! assert_eq!(arch.ops[0].name, "AddI32");
//! assert_eq!(arch.ops[0].input, Sig::Two("i32".into(), "i32".into()));
//! assert!(arch.ops[1].has_flag(OpFlag::Constant));
//! # Ok(())
//! # }
//! ```
//!
//! Generate one of the tables:
//!
//! ```rust
//! use opgen::gen;
//! use opgen::Arch;
//!
//! # fn main() -> opgen::Result<()> {
//! let mut arch = Arch::parse("arch_base.lisp", "(ops\n  (Nil () -> ())\n)\n")?;
//! arch.is_generic = true;
//!
//! let body = gen::op_enum::generate(std::slice::from_ref(&arch));
//! assert!(body.contains("  OpNil,"));
//! assert!(body.contains("  Op_GENERIC_END,"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The crate follows a classic compiler layout:
//!
//! ```text
//! Schema → Scanner → Tokens → Reader → S-Expressions → Arch/Op Model
//!                                                          │
//!    Declarations (types.h, parse.h) → Registries ─────────┤
//!                                                          ▼
//!                                            Emitters → Patcher → C sources
//! ```
//!
//! ### Main Components
//!
//! - [`SExprScanner`] - Tokenizes schema text, rewriting `;` comments into forms
//! - [`SExprReader`] - Reads tokens into [`SExpr`] trees
//! - [`Arch`] / [`Op`] - The validated operator model
//! - [`TypeCodeMap`] / [`AstOpMap`] / [`AuxTable`] - Builtin registries
//!   cross-checked against the external declarations
//! - [`gen`] - One pure emitter per generated table
//! - [`patch_file`] - Idempotent marker-delimited splicing
//! - [`pipeline`] - Wires the above into a single run
//!
//! ## Error Handling
//!
//! Every failure is fatal and names the offending schema construct:
//!
//! ```rust
//! use opgen::{Arch, Error};
//!
//! let err = Arch::parse("bad.lisp", "(ops\n  (AddI32 (i32 i32) -> i32 Comutative)\n)\n")
//!     .unwrap_err();
//! assert!(matches!(err, Error::UnknownFlag { .. }));
//! assert!(err.to_string().contains("Commutative")); // suggests the flag list
//! ```

pub mod error;
pub mod gen;
pub mod lexer;
pub mod parser;
pub mod patch;
pub mod pipeline;
pub mod registry;
pub mod schema;

/// Version of the operator-table compiler
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types
pub use error::{Error, Result};
pub use lexer::SExprScanner;
pub use parser::{SExpr, SExprReader};
pub use patch::{patch_file, patch_region, PatchOutcome, Region};
pub use pipeline::{Config, Model};
pub use registry::{AstOpMap, AuxTable, TypeCodeMap};
pub use schema::{Arch, AttrKey, Op, OpFlag, Sig};
