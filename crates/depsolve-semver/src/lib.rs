//! Semantic version parsing, ordering, and requirement interval algebra.
//!
//! This crate implements components A–C of the dependency resolver: the
//! [`Version`] type and its ordering, the [`Requirement`] interval algebra
//! built on top of it, and the string grammars both are parsed from.

mod constraint;
mod error;
mod parser;
mod requirement;
mod version;

pub use constraint::Constraint;
pub use error::{Error, Result};
pub use parser::{parse_package_string, ParsedPackageString};
pub use requirement::Requirement;
pub use version::Version;
