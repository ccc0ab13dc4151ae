use std::sync::Arc;

use indexmap::IndexMap;

use depsolve_semver::Requirement;

use crate::error::{Error, Result};
use crate::package::Package;
use crate::repository::Repository;

/// How a candidate package relates to a requirement, per §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    /// Same name, version also satisfies the requirement.
    Match,
    /// Same name, but the version does not satisfy the requirement.
    MatchName,
    /// Different name, matched through `provides`.
    MatchProvide,
    None,
}

/// Which candidates `Pool::what_provides` returns for a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Composer's own behavior: prefer direct name matches, falling back to
    /// provides only when the name is otherwise unknown.
    Composer,
    /// Direct name+version matches only.
    DirectOnly,
    /// Direct matches plus provides-based matches.
    IncludeIndirect,
    /// Every candidate under the name, regardless of version match.
    Any,
}

/// The union of one or more repositories.
///
/// Read-only once built: the clause compiler and solver only ever borrow a
/// `Pool`, and independent solves over the same pool share it freely.
#[derive(Debug, Default)]
pub struct Pool {
    packages: IndexMap<String, Arc<Package>>,
    provide_index: IndexMap<String, Vec<String>>,
}

impl Pool {
    pub fn new() -> Pool {
        Pool::default()
    }

    /// Merge a repository's packages into this pool. Packages whose id is
    /// already present are silently skipped (the pool never contains two
    /// packages with the same id).
    pub fn add_repository(&mut self, repository: &Repository) {
        for package in repository.iter() {
            self.add_package(package.clone());
        }
    }

    pub fn add_package(&mut self, package: Arc<Package>) {
        if self.packages.contains_key(package.id()) {
            return;
        }

        self.provide_index
            .entry(package.name().to_string())
            .or_default()
            .push(package.id().to_string());

        for provide in package.provides() {
            self.provide_index
                .entry(provide.name().to_string())
                .or_default()
                .push(package.id().to_string());
        }

        self.packages.insert(package.id().to_string(), package);
    }

    pub fn package(&self, id: &str) -> Result<&Arc<Package>> {
        self.packages
            .get(id)
            .ok_or_else(|| Error::MissingPackageInPool(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.packages.contains_key(id)
    }

    pub fn packages_by_name(&self, name: &str) -> Vec<&Arc<Package>> {
        self.provide_index
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.packages.get(id))
            .filter(|p| p.name() == name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn classify(candidate: &Package, requirement: &Requirement) -> MatchKind {
        if candidate.name() == requirement.name() {
            let candidate_requirement =
                Requirement::exact(candidate.name(), candidate.version().clone());
            if requirement.matches(&candidate_requirement) {
                MatchKind::Match
            } else {
                MatchKind::MatchName
            }
        } else {
            for provide in candidate.provides() {
                if requirement.matches(provide) {
                    return MatchKind::MatchProvide;
                }
            }
            MatchKind::None
        }
    }

    /// Returns packages providing `requirement`, classified and filtered
    /// per `mode`. Order is deterministic pool-insertion order within each
    /// bucket.
    pub fn what_provides(&self, requirement: &Requirement, mode: Mode) -> Vec<Arc<Package>> {
        let mut strict = Vec::new();
        let mut provided = Vec::new();
        let mut any_matches = Vec::new();

        for id in self
            .provide_index
            .get(requirement.name())
            .into_iter()
            .flatten()
        {
            let Some(candidate) = self.packages.get(id) else {
                continue;
            };
            match Self::classify(candidate, requirement) {
                MatchKind::Match => strict.push(candidate.clone()),
                MatchKind::MatchName => any_matches.push(candidate.clone()),
                MatchKind::MatchProvide => provided.push(candidate.clone()),
                MatchKind::None => {}
            }
        }

        log::trace!(
            "what_provides({:?}, {:?}): match={} match_name={} match_provide={}",
            requirement.name(),
            mode,
            strict.len(),
            any_matches.len(),
            provided.len()
        );

        match mode {
            Mode::Composer => {
                if !strict.is_empty() || !any_matches.is_empty() {
                    strict
                } else {
                    provided
                }
            }
            Mode::DirectOnly => strict,
            Mode::IncludeIndirect => {
                strict.extend(provided);
                strict
            }
            Mode::Any => {
                strict.extend(provided);
                strict.extend(any_matches);
                strict
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsolve_semver::Requirement;

    fn pool_of(strs: &[&str]) -> Pool {
        let mut repo = Repository::new();
        for s in strs {
            repo.add(Package::parse(s).unwrap());
        }
        let mut pool = Pool::new();
        pool.add_repository(&repo);
        pool
    }

    #[test]
    fn direct_name_match() {
        let pool = pool_of(&["mkl-10.3.0", "mkl-11.0.0"]);
        let req = Requirement::any("mkl");
        let found = pool.what_provides(&req, Mode::Composer);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn match_name_but_not_version() {
        let pool = pool_of(&["mkl-10.3.0"]);
        let req = Requirement::exact("mkl", depsolve_semver::Version::parse("11.0.0").unwrap());
        assert!(pool.what_provides(&req, Mode::DirectOnly).is_empty());
        assert_eq!(pool.what_provides(&req, Mode::Any).len(), 1);
    }

    #[test]
    fn composer_mode_falls_back_to_provides_when_name_unknown() {
        let pool = pool_of(&["nomkl_numpy-1.7.0; provides (numpy == 1.7.0)"]);
        let req = Requirement::any("numpy");
        let found = pool.what_provides(&req, Mode::Composer);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "nomkl_numpy");
    }

    #[test]
    fn composer_mode_prefers_direct_match_over_provides() {
        let pool = pool_of(&[
            "numpy-1.8.0",
            "nomkl_numpy-1.7.0; provides (numpy == 1.7.0)",
        ]);
        let req = Requirement::any("numpy");
        let found = pool.what_provides(&req, Mode::Composer);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "numpy");
    }

    #[test]
    fn what_provides_any_is_a_superset() {
        let pool = pool_of(&["mkl-10.3.0", "mkl-11.0.0"]);
        let req = Requirement::exact("mkl", depsolve_semver::Version::parse("11.0.0").unwrap());
        for mode in [Mode::Composer, Mode::DirectOnly, Mode::IncludeIndirect] {
            let subset = pool.what_provides(&req, mode);
            let any = pool.what_provides(&req, Mode::Any);
            for p in &subset {
                assert!(any.iter().any(|q| q.id() == p.id()));
            }
        }
    }

    #[test]
    fn duplicate_package_ids_deduplicate_silently() {
        let mut repo = Repository::new();
        repo.add(Package::parse("mkl-10.3.0").unwrap());
        let mut pool = Pool::new();
        pool.add_repository(&repo);
        pool.add_repository(&repo);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn missing_package_lookup_errors() {
        let pool = Pool::new();
        assert!(pool.package("does-not-exist").is_err());
    }
}
