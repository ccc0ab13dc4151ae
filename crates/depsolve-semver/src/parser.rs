use lazy_static::lazy_static;
use regex::Regex;

use crate::constraint::Constraint;
use crate::error::Error;
use crate::requirement::Requirement;
use crate::version::Version;
use crate::Result;

lazy_static! {
    static ref BLOCK_RE: Regex =
        Regex::new(r"^([A-Za-z_]\w*)\s*(?:(==|>=|<=)\s*(\d[\w.\-+]*))?$").unwrap();
    static ref LOOSE_BLOCK_RE: Regex =
        Regex::new(r"^([A-Za-z_]\w*)\s*(\S+)\s*(\d[\w.\-+]*)$").unwrap();
    static ref PACKAGE_HEADER_RE: Regex =
        Regex::new(r"^([A-Za-z_][\w.\-]*)-(\d[\w.\-+]*)$").unwrap();
    static ref SECTION_RE: Regex = Regex::new(r"^(\w+)\s*\((.*)\)$").unwrap();
}

/// Parse a comma-separated requirement-list string into one [`Requirement`]
/// per distinct distribution name, in order of first appearance. See §4.3 /
/// §6 of the design for the grammar.
pub fn parse_requirements(s: &str) -> Result<Vec<Requirement>> {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: Vec<(String, Vec<Constraint>)> = Vec::new();

    for block in s.split(',') {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        if let Some(caps) = BLOCK_RE.captures(block) {
            let name = caps[1].to_string();
            let constraint = match (caps.get(2), caps.get(3)) {
                (Some(op), Some(ver)) => {
                    let version = Version::parse(ver.as_str())
                        .map_err(|_| Error::InvalidRequirement(block.to_string()))?;
                    match op.as_str() {
                        "==" => Constraint::Equal(version),
                        ">=" => Constraint::Geq(version),
                        "<=" => Constraint::Leq(version),
                        _ => unreachable!("regex only captures known operators"),
                    }
                }
                _ => Constraint::Any,
            };

            push_constraint(&mut order, &mut by_name, name, constraint);
            continue;
        }

        if let Some(caps) = LOOSE_BLOCK_RE.captures(block) {
            return Err(Error::UnknownOperator {
                op: caps[2].to_string(),
                text: block.to_string(),
            });
        }

        return Err(Error::InvalidRequirement(block.to_string()));
    }

    Ok(order
        .into_iter()
        .map(|name| {
            let constraints = by_name
                .iter()
                .find(|(n, _)| n == &name)
                .map(|(_, c)| c.clone())
                .unwrap_or_default();
            Requirement::new(name, &constraints)
        })
        .collect())
}

fn push_constraint(
    order: &mut Vec<String>,
    by_name: &mut Vec<(String, Vec<Constraint>)>,
    name: String,
    constraint: Constraint,
) {
    if let Some((_, constraints)) = by_name.iter_mut().find(|(n, _)| n == &name) {
        constraints.push(constraint);
    } else {
        order.push(name.clone());
        by_name.push((name, vec![constraint]));
    }
}

/// The result of parsing a `"name-version[; depends (...)][; provides (...)]"`
/// package string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPackageString {
    pub name: String,
    pub version: String,
    pub depends: Vec<Requirement>,
    pub provides: Vec<Requirement>,
}

/// Parse a package string per §4.3/§6: a `name-version` header followed by
/// any number of `; depends (...)` / `; provides (...)` sections, in either
/// order.
pub fn parse_package_string(s: &str) -> Result<ParsedPackageString> {
    let mut segments = s.split(';');
    let header = segments
        .next()
        .ok_or_else(|| Error::InvalidPackageString(s.to_string()))?
        .trim();

    let caps = PACKAGE_HEADER_RE
        .captures(header)
        .ok_or_else(|| Error::InvalidPackageString(s.to_string()))?;
    let name = caps[1].to_string();
    let version = caps[2].to_string();

    let mut depends = Vec::new();
    let mut provides = Vec::new();

    for section in segments {
        let section = section.trim();
        if section.is_empty() {
            continue;
        }

        let caps = SECTION_RE
            .captures(section)
            .ok_or_else(|| Error::InvalidPackageString(s.to_string()))?;
        let keyword = &caps[1];
        let body = &caps[2];

        match keyword {
            "depends" => depends.extend(parse_requirements(body)?),
            "provides" => provides.extend(parse_requirements(body)?),
            other => {
                return Err(Error::UnknownSection {
                    section: other.to_string(),
                    text: s.to_string(),
                })
            }
        }
    }

    Ok(ParsedPackageString {
        name,
        version,
        depends,
        provides,
    })
}
