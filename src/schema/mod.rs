//! Typed schema model for one architecture's operator set
//!
//! The loader turns the parsed s-expression tree into [`Arch`] and [`Op`]
//! records, rejecting unknown flags, attribute keys and arities at parse
//! time via closed enums.

mod arch;
mod op;

pub use arch::Arch;
pub use op::{AttrKey, Op, OpFlag, Sig};
