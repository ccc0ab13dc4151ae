use std::cmp::{max, min};
use std::fmt;

use crate::constraint::Constraint;
use crate::parser;
use crate::version::Version;
use crate::Result;

/// A `(name, interval)` predicate over package versions, with an optional
/// pinned equality.
///
/// Built exclusively through [`Requirement::new`] (or [`Requirement::parse`]
/// for the string form) — the constructor is the only place bounds are
/// computed, per the invariant that a `Requirement`'s interval is normalized
/// once at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    name: String,
    min_bound: Version,
    max_bound: Version,
    pinned: Option<Version>,
    unsatisfiable: bool,
}

impl Requirement {
    /// Fold a list of atomic constraints for a single distribution name into
    /// a normalized interval requirement.
    pub fn new(name: impl Into<String>, constraints: &[Constraint]) -> Requirement {
        let name = name.into();

        let equals: Vec<&Version> = constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::Equal(v) => Some(v),
                _ => None,
            })
            .collect();
        let geqs: Vec<&Version> = constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::Geq(v) => Some(v),
                _ => None,
            })
            .collect();
        let leqs: Vec<&Version> = constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::Leq(v) => Some(v),
                _ => None,
            })
            .collect();

        let mut unsatisfiable = false;
        let pinned = if equals.is_empty() {
            None
        } else {
            let first = equals[0];
            if equals.iter().any(|v| *v != first) {
                unsatisfiable = true;
            }
            Some(first.clone())
        };

        let (min_bound, max_bound) = if let Some(p) = &pinned {
            (p.clone(), p.clone())
        } else {
            let min_bound = geqs
                .into_iter()
                .cloned()
                .fold(Version::Min, |acc, v| max(acc, v));
            let max_bound = leqs
                .into_iter()
                .cloned()
                .fold(Version::Max, |acc, v| min(acc, v));
            (min_bound, max_bound)
        };

        if min_bound > max_bound {
            unsatisfiable = true;
        }

        Requirement {
            name,
            min_bound,
            max_bound,
            pinned,
            unsatisfiable,
        }
    }

    /// An unconstrained requirement on `name` — matches any version.
    pub fn any(name: impl Into<String>) -> Requirement {
        Requirement::new(name, &[Constraint::Any])
    }

    /// A requirement pinned to exactly `version`.
    pub fn exact(name: impl Into<String>, version: Version) -> Requirement {
        Requirement::new(name, &[Constraint::Equal(version)])
    }

    /// Parse a requirement-list string into one [`Requirement`] per distinct
    /// distribution name. See [`crate::parser`] for the grammar.
    pub fn parse(s: &str) -> Result<Vec<Requirement>> {
        parser::parse_requirements(s)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_bound(&self) -> &Version {
        &self.min_bound
    }

    pub fn max_bound(&self) -> &Version {
        &self.max_bound
    }

    pub fn pinned(&self) -> Option<&Version> {
        self.pinned.as_ref()
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.unsatisfiable
    }

    /// Does `self` overlap `other`: same name, both satisfiable, and a
    /// non-empty intersection of admissible versions.
    ///
    /// Symmetric by construction (every branch is defined in terms of a
    /// commutative comparison), and used both for a dependency matching a
    /// candidate's own `(name, version)` and for provides-based matching.
    pub fn matches(&self, other: &Requirement) -> bool {
        if self.name != other.name {
            return false;
        }
        if self.unsatisfiable || other.unsatisfiable {
            return false;
        }

        match (&self.pinned, &other.pinned) {
            (Some(v), Some(w)) => v == w,
            (Some(v), None) => other.min_bound <= *v && *v <= other.max_bound,
            (None, Some(w)) => self.min_bound <= *w && *w <= self.max_bound,
            (None, None) => {
                max(&self.min_bound, &other.min_bound) <= min(&self.max_bound, &other.max_bound)
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unsatisfiable {
            return write!(f, "{} (unsatisfiable)", self.name);
        }
        if let Some(v) = &self.pinned {
            return write!(f, "{} == {}", self.name, v);
        }
        match (self.min_bound.is_min(), self.max_bound.is_max()) {
            (true, true) => write!(f, "{}", self.name),
            (false, true) => write!(f, "{} >= {}", self.name, self.min_bound),
            (true, false) => write!(f, "{} <= {}", self.name, self.max_bound),
            (false, false) => write!(
                f,
                "{} >= {}, {} <= {}",
                self.name, self.min_bound, self.name, self.max_bound
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ver(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn unconstrained_spans_the_whole_version_space() {
        let r = Requirement::any("numpy");
        assert!(r.min_bound().is_min());
        assert!(r.max_bound().is_max());
        assert!(!r.is_unsatisfiable());
    }

    #[test]
    fn two_distinct_equals_are_unsatisfiable() {
        let r = Requirement::new(
            "numpy",
            &[
                Constraint::Equal(ver("1.3.0")),
                Constraint::Equal(ver("1.4.0")),
            ],
        );
        assert!(r.is_unsatisfiable());
        assert!(!r.matches(&Requirement::any("numpy")));
    }

    #[test]
    fn crossed_bounds_are_unsatisfiable() {
        let r = Requirement::new(
            "numpy",
            &[Constraint::Geq(ver("2.0.0")), Constraint::Leq(ver("1.0.0"))],
        );
        assert!(r.is_unsatisfiable());
    }

    #[test]
    fn pinned_matches_pinned_only_if_equal() {
        let a = Requirement::exact("numpy", ver("1.3.0"));
        let b = Requirement::exact("numpy", ver("1.3.0"));
        let c = Requirement::exact("numpy", ver("1.4.0"));
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn pinned_matches_overlapping_range() {
        let pinned = Requirement::exact("numpy", ver("1.3.0"));
        let range = Requirement::new(
            "numpy",
            &[Constraint::Geq(ver("1.0.0")), Constraint::Leq(ver("2.0.0"))],
        );
        assert!(pinned.matches(&range));
        assert!(range.matches(&pinned));
    }

    #[test]
    fn ranges_match_iff_intersection_nonempty() {
        let a = Requirement::new("numpy", &[Constraint::Geq(ver("1.0.0"))]);
        let b = Requirement::new("numpy", &[Constraint::Leq(ver("0.9.0"))]);
        assert!(!a.matches(&b));

        let c = Requirement::new("numpy", &[Constraint::Leq(ver("1.5.0"))]);
        assert!(a.matches(&c));
    }

    #[test]
    fn different_names_never_match() {
        let a = Requirement::any("numpy");
        let b = Requirement::any("scipy");
        assert!(!a.matches(&b));
    }

    #[test]
    fn unsatisfiable_never_matches() {
        let bad = Requirement::new(
            "numpy",
            &[
                Constraint::Equal(ver("1.0.0")),
                Constraint::Equal(ver("2.0.0")),
            ],
        );
        let any = Requirement::any("numpy");
        assert!(!bad.matches(&any));
        assert!(!any.matches(&bad));
    }

    #[test]
    fn display_round_trips_range_requirement() {
        let r = Requirement::new(
            "numpy",
            &[Constraint::Geq(ver("1.3.0")), Constraint::Leq(ver("2.0.0"))],
        );
        assert_eq!(r.to_string(), "numpy >= 1.3.0, numpy <= 2.0.0");
    }
}
