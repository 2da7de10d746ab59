use std::path::PathBuf;
use thiserror::Error;




/**
 * Error to represent invalid snapshot input, series constraint violations,
 * failed lookups, and halo fill problems.
 */
#[derive(Debug, Error)]
pub enum Error {
    #[error("code `{0}` is not supported; supported codes: flash")]
    UnsupportedCode(String),

    #[error("file form `{form}` is not supported for code `{code}`; supported forms: plt, chk")]
    UnsupportedForm { code: String, form: String },

    #[error("unsupported grid type in setup call `{0}`")]
    UnsupportedGrid(String),

    #[error("missing required entry `{name}` in {context}")]
    MissingField { context: String, name: String },

    #[error("{kind} record did not initialize a key")]
    MissingKey { kind: &'static str },

    #[error("{kind} record did not initialize its attribute names")]
    MissingAttributes { kind: &'static str },

    #[error("dataset `{name}` has shape {found:?}, expected {expected:?}")]
    DatasetShape { name: String, found: Vec<usize>, expected: Vec<usize> },

    #[error("invalid block tree: {0}")]
    InvalidTree(String),

    #[error("stretched grid requires a companion grid file")]
    MissingGridFile,

    #[error("nonunique key provided; {key} @ index {position}")]
    DuplicateKey { key: f64, position: usize },

    #[error("nonunique keys provided: {0:?}")]
    DuplicateKeys(Vec<f64>),

    #[error("key {0} not found")]
    KeyNotFound(f64),

    #[error("no key at or after {0}")]
    NoKeyAtOrAfter(f64),

    #[error("no key at or before {0}")]
    NoKeyAtOrBefore(f64),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("operation on an empty series")]
    Empty,

    #[error("invalid key {0}")]
    InvalidKey(f64),

    #[error("slice step cannot be zero")]
    ZeroStep,

    #[error("record has no attribute `{0}`")]
    UnknownAttribute(String),

    #[error("attribute `{0}` is not numeric")]
    NotNumeric(String),

    #[error("attribute `{name}` has shape {found:?} in one record and {expected:?} in another")]
    ShapeMismatch { name: String, found: Vec<usize>, expected: Vec<usize> },

    #[error("unsupported boundary condition `{condition}` for field `{field}` on {face} face")]
    UnsupportedBoundary { field: String, face: &'static str, condition: String },

    #[error("no boundary condition declared for {face} face (`{parameter}`)")]
    MissingBoundary { face: &'static str, parameter: String },

    #[error("array has {found} blocks but the adjacency graph has {expected}")]
    GraphMismatch { found: usize, expected: usize },

    #[error("no snapshot files provided")]
    NoFiles,

    #[error("failed to decode snapshot {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("failed to encode snapshot {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}




pub type Result<T> = std::result::Result<T, Error>;
