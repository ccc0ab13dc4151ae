use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};

/// A single dot-separated part of a pre-release or build tag.
///
/// Numeric parts compare as integers; everything else compares
/// lexicographically. Per the standard semver rule, a numeric part always
/// sorts below an alphanumeric one when the two are compared directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Part {
    Numeric(u64),
    Alpha(String),
}

impl Part {
    fn parse(s: &str) -> Part {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<u64>() {
                return Part::Numeric(n);
            }
        }
        Part::Alpha(s.to_string())
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Numeric(n) => write!(f, "{n}"),
            Part::Alpha(s) => write!(f, "{s}"),
        }
    }
}

impl Ord for Part {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Part::Numeric(a), Part::Numeric(b)) => a.cmp(b),
            (Part::Alpha(a), Part::Alpha(b)) => a.cmp(b),
            (Part::Numeric(_), Part::Alpha(_)) => Ordering::Less,
            (Part::Alpha(_), Part::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Part {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_tags(a: &[Part], b: &[Part]) -> Ordering {
    a.cmp(b)
}

fn parse_tag(s: &str) -> Vec<Part> {
    s.split('.').map(Part::parse).collect()
}

fn format_tag(parts: &[Part]) -> String {
    parts
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// A concrete, fully-resolved semantic version.
///
/// `Version::parse`/`Version::parse_loose` are the only ways to build one;
/// bounds like [`Version::min`]/[`Version::max`] live on the outer
/// [`VersionBound`] sentinel type rather than here, since a real version can
/// never itself be the minimum or maximum of the universe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Real {
    major: u64,
    minor: u64,
    patch: u64,
    pre_release: Option<Vec<Part>>,
    build: Option<Vec<Part>>,
}

impl Real {
    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }
}

impl Ord for Real {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                // absence of pre_release sorts above presence
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_tags(a, b),
            })
            .then_with(|| match (&self.build, &other.build) {
                (None, None) => Ordering::Equal,
                // absence of build sorts below presence
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => compare_tags(a, b),
            })
    }
}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{}", format_tag(pre))?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{}", format_tag(build))?;
        }
        Ok(())
    }
}

fn valid_tag_part(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn parse_numeric_component(s: &str) -> Option<u64> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// Parse the core `MAJOR.MINOR.PATCH` plus optional `-PRE` and `+BUILD`
/// suffixes out of `s`. `loose` allows a missing `MINOR`/`PATCH` (defaulted
/// to `0`); strict parsing requires all three.
fn parse_core(s: &str, loose: bool) -> Result<Real> {
    let original = s;

    let (rest, build) = match s.split_once('+') {
        Some((head, tag)) => {
            let parts = parse_and_validate_tag(tag, original)?;
            (head, Some(parts))
        }
        None => (s, None),
    };

    let (rest, pre_release) = match rest.split_once('-') {
        Some((head, tag)) => {
            let parts = parse_and_validate_tag(tag, original)?;
            (head, Some(parts))
        }
        None => (rest, None),
    };

    let mut components = rest.split('.');
    let major = components
        .next()
        .and_then(parse_numeric_component)
        .ok_or_else(|| Error::InvalidVersion(original.to_string()))?;

    let minor = match components.next() {
        Some(c) => parse_numeric_component(c).ok_or_else(|| Error::InvalidVersion(original.to_string()))?,
        None if loose => 0,
        None => return Err(Error::InvalidVersion(original.to_string())),
    };

    let patch = match components.next() {
        Some(c) => parse_numeric_component(c).ok_or_else(|| Error::InvalidVersion(original.to_string()))?,
        None if loose => 0,
        None => return Err(Error::InvalidVersion(original.to_string())),
    };

    if components.next().is_some() {
        return Err(Error::InvalidVersion(original.to_string()));
    }

    Ok(Real {
        major,
        minor,
        patch,
        pre_release,
        build,
    })
}

fn parse_and_validate_tag(tag: &str, original: &str) -> Result<Vec<Part>> {
    if tag.split('.').any(|part| !valid_tag_part(part)) {
        return Err(Error::InvalidVersion(original.to_string()));
    }
    Ok(parse_tag(tag))
}

/// A [`Real`] version, or one of the two universal sentinels that bound the
/// version space on either side.
///
/// `MinVersion`/`MaxVersion` never arise from parsing; they are produced by
/// [`crate::requirement::Requirement`] construction when a bound is left
/// unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    Min,
    Max,
    Real(Real),
}

impl Version {
    /// Parse a strict `MAJOR.MINOR.PATCH[-PRE][+BUILD]` string.
    pub fn parse(s: &str) -> Result<Version> {
        parse_core(s, false).map(Version::Real)
    }

    /// Parse a version string allowing a missing minor/patch component,
    /// which is filled in with `0`.
    pub fn parse_loose(s: &str) -> Result<Version> {
        parse_core(s, true).map(Version::Real)
    }

    pub fn is_min(&self) -> bool {
        matches!(self, Version::Min)
    }

    pub fn is_max(&self) -> bool {
        matches!(self, Version::Max)
    }

    pub fn as_real(&self) -> Option<&Real> {
        match self {
            Version::Real(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Min => write!(f, "-inf"),
            Version::Max => write!(f, "+inf"),
            Version::Real(r) => write!(f, "{r}"),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Version::Min, Version::Min) => Ordering::Equal,
            (Version::Max, Version::Max) => Ordering::Equal,
            (Version::Min, _) => Ordering::Less,
            (_, Version::Min) => Ordering::Greater,
            (Version::Max, _) => Ordering::Greater,
            (_, Version::Max) => Ordering::Less,
            (Version::Real(a), Version::Real(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
