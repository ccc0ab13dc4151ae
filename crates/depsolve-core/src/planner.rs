use std::collections::HashSet;

use crate::decisions::Decisions;
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::pool::Pool;
use crate::repository::Repository;

/// Diff a solved decision set against `installed` into a concrete plan, per
/// §4.8.
///
/// Walks the decisions in the chronological order they were made, so the
/// result is deterministic for a given solve — then reverses the
/// accumulated steps, matching the reference ordering (dependencies decided
/// late end up installed first).
pub fn plan(pool: &Pool, installed: &Repository, decisions: &Decisions) -> Result<Vec<Operation>> {
    let mut ops = Vec::new();
    let mut updated_from_ids: HashSet<String> = HashSet::new();

    for (id, decision) in decisions.iter() {
        if decision.value {
            if installed.package_by_id(id).is_some() {
                continue;
            }

            let package = pool.package(id)?.clone();
            let same_name = installed.packages_by_name(package.name());
            match same_name.len() {
                0 => ops.push(Operation::Install(package)),
                1 => {
                    let from = same_name[0].clone();
                    updated_from_ids.insert(from.id().to_string());
                    ops.push(Operation::Update { from, to: package });
                }
                _ => {
                    return Err(Error::AmbiguousInstalledPackage {
                        name: package.name().to_string(),
                    })
                }
            }
        } else if let Some(old) = installed.package_by_id(id) {
            if !updated_from_ids.contains(old.id()) {
                ops.push(Operation::Remove(old.clone()));
            }
        }
    }

    ops.reverse();
    Ok(ops)
}
