//! Error types for the operator-table compiler
//!
//! Every failure is fatal at the point of detection: the pipeline never
//! retries or degrades, it reports the offending name(s) to the schema
//! author and aborts.

use thiserror::Error;

/// Operator-table compiler errors
#[derive(Error, Debug)]
pub enum Error {
    // S-expression reading
    /// Token stream ended in the middle of a list
    #[error("Unexpected end of input while reading s-expression")]
    UnexpectedEof,

    /// A close parenthesis with no matching open parenthesis
    #[error("Unexpected ')' while reading s-expression")]
    UnexpectedCloseParen,

    // Schema loading
    /// Operator form that does not match `(Name INPUT -> OUTPUT ATTRS...)`
    #[error("Malformed op {form}: {reason}")]
    MalformedOp {
        /// The offending form, rendered back as an s-expression
        form: String,
        /// What is wrong with it
        reason: String,
    },

    /// Flag symbol not in the builtin flag set
    #[error("Unknown flag {flag:?} in op {op}. Expected one of:\n  {expected}")]
    UnknownFlag {
        /// Operator being parsed
        op: String,
        /// The unrecognized flag symbol
        flag: String,
        /// Newline-joined list of accepted flags
        expected: String,
    },

    /// Keyed attribute with an unrecognized key
    #[error("Unknown attribute key {key:?} in op {op}. Expected one of:\n  {expected}")]
    UnknownAttrKey {
        /// Operator being parsed
        op: String,
        /// The unrecognized key
        key: String,
        /// Newline-joined list of accepted keys
        expected: String,
    },

    /// Attribute form that is neither a bare flag nor a `(key value...)` pair
    #[error("Invalid attribute {form} in op {op}")]
    InvalidAttribute {
        /// Operator being parsed
        op: String,
        /// The offending attribute form
        form: String,
    },

    /// Non-list element inside an `ops` list
    #[error("Unexpected {form} in ops list")]
    UnexpectedOpsForm {
        /// The offending form
        form: String,
    },

    /// Architecture attribute form without exactly one value
    #[error("Unexpected value for arch attribute {key:?}: {form}")]
    MalformedArchAttr {
        /// Attribute key
        key: String,
        /// The offending form
        form: String,
    },

    /// Top-level key that is neither `ops` nor a known scalar attribute
    #[error("Unknown arch attribute {key:?}")]
    UnknownArchAttr {
        /// The offending key
        key: String,
    },

    // Declaration scanning
    /// Start marker never seen while scanning a declaration source
    #[error("Unable to find start marker {marker:?} in {path}")]
    DeclStartNotFound {
        /// The literal marker searched for
        marker: String,
        /// Declaration source being scanned
        path: String,
    },

    /// End sentinel name never seen while scanning a declaration source
    #[error("Unable to find end sentinel {name:?} in {path}")]
    DeclEndNotFound {
        /// The sentinel name searched for
        name: String,
        /// Declaration source being scanned
        path: String,
    },

    /// Declared type code absent from the builtin type-code map
    #[error("Type code {name:?} missing in the builtin type-code map")]
    UnknownTypeCode {
        /// The offending code
        name: String,
    },

    /// Builtin type codes never discovered in the declaration
    #[error("{count} type code(s) in the builtin map missing in {path}: {missing}")]
    MissingTypeCodes {
        /// Number of missing codes
        count: usize,
        /// Declaration source scanned
        path: String,
        /// Comma-joined missing codes
        missing: String,
    },

    /// Declared operator token absent from the builtin token map
    #[error("AST operator token {name:?} missing in the builtin token map")]
    UnknownAstToken {
        /// The offending token
        name: String,
    },

    /// Builtin tokens never discovered in the declaration window
    #[error("{count} token(s) in the builtin map missing in {path}: {missing}")]
    MissingAstTokens {
        /// Number of missing tokens
        count: usize,
        /// Declaration source scanned
        path: String,
        /// Comma-joined missing tokens
        missing: String,
    },

    /// An irtype in the schema with no corresponding type code
    #[error("Unknown irtype {irtype:?} in op {op}")]
    UnknownIrType {
        /// Operator referencing the irtype
        op: String,
        /// The offending irtype
        irtype: String,
    },

    // Table construction
    /// Constant-flagged op whose output is not exactly one irtype
    #[error("Constant op {op} produces {count} outputs; expected exactly one")]
    ConstOpOutputArity {
        /// The offending op
        op: String,
        /// Its actual output count
        count: usize,
    },

    /// Two constant ops producing the same output irtype
    #[error("Duplicate constant op {op} for irtype {irtype:?} (already provided by {existing})")]
    DuplicateConstOp {
        /// The later op
        op: String,
        /// Output irtype both ops claim
        irtype: String,
        /// The op that claimed it first
        existing: String,
    },

    /// Type code with no constant op after most-specific-first resolution
    #[error("No constant op for type code {type_code}")]
    NoConstOp {
        /// The uncovered type code
        type_code: String,
    },

    /// Conversion op without exactly one input irtype
    #[error("Conversion op {op} is expected to have exactly one input")]
    ConvInputArity {
        /// The offending op
        op: String,
    },

    /// Conversion op without exactly one output irtype
    #[error("Conversion op {op} is expected to have exactly one output")]
    ConvOutputArity {
        /// The offending op
        op: String,
    },

    /// Two conversion ops claiming the same (from, to) type-code pair
    #[error("Duplicate conflicting conversion ops for {from} -> {to}: {first} and {second}")]
    DuplicateConv {
        /// Source type code
        from: String,
        /// Destination type code
        to: String,
        /// First op mapped to the pair
        first: String,
        /// Second op mapped to the pair
        second: String,
    },

    /// Canonical type codes that never appear as conversion sources
    #[error("Not all source types covered by conversion ops; missing: {missing} -> *")]
    MissingConvSources {
        /// Comma-joined uncovered codes
        missing: String,
    },

    /// Canonical type codes that never appear as conversion destinations
    #[error("Not all destination types covered by conversion ops; missing: * -> {missing}")]
    MissingConvDests {
        /// Comma-joined uncovered codes
        missing: String,
    },

    /// Two ops resolving from the same (token, input signature) pair
    #[error("Ops {first} and {second} both dispatch from token {token} with input ({sig})")]
    DispatchCollision {
        /// The AST operator token
        token: String,
        /// Input signature both ops match
        sig: String,
        /// First matching op
        first: String,
        /// Second matching op
        second: String,
    },

    /// Parametric output type with no input operand of the same irtype
    #[error("Variable output type {output:?} of Op{op} without matching input")]
    NoMatchingInputType {
        /// The offending op
        op: String,
        /// Its output irtype
        output: String,
    },

    /// `aux` attribute without exactly one irtype argument
    #[error("Invalid aux arguments in op {op} (expected exactly 1 irtype; got {got})")]
    InvalidAuxArity {
        /// The offending op
        op: String,
        /// The actual argument list, rendered
        got: String,
    },

    /// `aux` attribute naming an irtype with no auxiliary-storage kind
    #[error("Invalid aux type {irtype:?} in op {op} (expected one of: {expected})")]
    UnknownAuxType {
        /// The offending op
        op: String,
        /// The unrecognized irtype
        irtype: String,
        /// Comma-joined accepted irtypes
        expected: String,
    },

    // Target patching
    /// Sentinel marker absent from a patch target
    #[error("Can't find {marker:?} in {path}")]
    MarkerNotFound {
        /// The literal marker searched for
        marker: String,
        /// Target file
        path: String,
    },

    /// Generated body no longer contains its own markers
    #[error(
        "Can't find {marker:?} in replacement body for {path}. Writing would break replacement \
         on the next run; rename the marker in the target first, then in the emitter"
    )]
    MarkerLostInBody {
        /// The missing marker
        marker: String,
        /// Target file
        path: String,
    },

    /// File read/write failure
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wraps an I/O error with the path it occurred on
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for opgen operations
pub type Result<T> = std::result::Result<T, Error>;
