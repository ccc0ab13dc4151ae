use std::collections::HashSet;

use indexmap::IndexMap;

use depsolve_semver::Version;

use crate::error::{Error, Result};
use crate::pool::Pool;

/// The tie-breaking rule over equally-valid candidates: installed packages
/// always outrank any non-installed version, otherwise higher versions
/// outrank lower ones.
///
/// Stateless — a `Policy` carries no data of its own, it only reads the
/// pool and the installed-id set passed to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Policy;

impl Policy {
    pub fn new() -> Policy {
        Policy
    }

    fn rank(&self, pool: &Pool, installed: &HashSet<String>, id: &str) -> Result<Version> {
        if installed.contains(id) {
            Ok(Version::Max)
        } else {
            Ok(pool.package(id)?.version().clone())
        }
    }

    /// Partition `ids` by package name, rank each group
    /// installed-first-then-highest-version, and prune each group down to
    /// its run of top-ranked entries.
    ///
    /// Returns the pruned groups keyed by name, in order of first
    /// appearance in `ids`.
    pub fn group_and_rank(
        &self,
        pool: &Pool,
        installed: &HashSet<String>,
        ids: &[String],
    ) -> Result<IndexMap<String, Vec<String>>> {
        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        for id in ids {
            let name = pool.package(id)?.name().to_string();
            groups.entry(name).or_default().push(id.clone());
        }

        for group in groups.values_mut() {
            let mut ranked: Vec<(String, Version)> = group
                .iter()
                .map(|id| self.rank(pool, installed, id).map(|v| (id.clone(), v)))
                .collect::<Result<_>>()?;
            ranked.sort_by(|a, b| b.1.cmp(&a.1));

            let best_rank = ranked.first().map(|(_, v)| v.clone());
            let pruned = match best_rank {
                Some(best) => ranked
                    .into_iter()
                    .take_while(|(_, v)| *v == best)
                    .map(|(id, _)| id)
                    .collect(),
                None => Vec::new(),
            };
            *group = pruned;
        }

        Ok(groups)
    }

    /// Rank `ids` and narrow down to exactly one candidate, failing fast
    /// (per §4.6/§9) if more than one package name or more than one
    /// candidate per name survives pruning — a documented limitation, not a
    /// bug to paper over.
    pub fn select(&self, pool: &Pool, installed: &HashSet<String>, ids: &[String]) -> Result<String> {
        let groups = self.group_and_rank(pool, installed, ids)?;

        if groups.len() > 1 {
            let names: Vec<String> = groups.keys().cloned().collect();
            log::warn!("policy selection spans more than one package name: {names:?}");
            return Err(Error::AmbiguousPackageName(names));
        }

        let (name, candidates) = groups
            .into_iter()
            .next()
            .ok_or_else(|| Error::AmbiguousPackageName(Vec::new()))?;

        if candidates.len() > 1 {
            log::warn!("policy could not narrow {name:?} to a single candidate: {candidates:?}");
            return Err(Error::AmbiguousCandidate { name, candidates });
        }

        Ok(candidates.into_iter().next().expect("checked len == 1 above"))
    }
}
