use crate::version::Version;

/// An atomic constraint on a single version, as produced by the requirement
/// parser before the [`crate::requirement::Requirement`] constructor folds
/// a list of these into a single interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// No constraint at all — a bare distribution name.
    Any,
    Equal(Version),
    Geq(Version),
    Leq(Version),
}
