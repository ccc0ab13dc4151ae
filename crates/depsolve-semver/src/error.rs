use thiserror::Error;

/// Errors produced while parsing or constructing version/requirement values.
///
/// Every variant carries the offending source text so a caller can surface a
/// useful diagnostic without re-deriving it from the parse state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid version string: {0:?}")]
    InvalidVersion(String),

    #[error("invalid requirement string: {0:?}")]
    InvalidRequirement(String),

    #[error("invalid package string: {0:?}")]
    InvalidPackageString(String),

    #[error("unknown requirement operator {op:?} in {text:?}")]
    UnknownOperator { op: String, text: String },

    #[error("unknown package string section {section:?} in {text:?}")]
    UnknownSection { section: String, text: String },
}

pub type Result<T> = std::result::Result<T, Error>;
