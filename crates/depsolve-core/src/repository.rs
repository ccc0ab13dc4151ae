use std::collections::HashMap;
use std::sync::Arc;

use crate::package::Package;

/// An ordered collection of packages, indexed by id and by name.
///
/// Populated once at load time and never mutated afterward once handed to a
/// [`crate::pool::Pool`] — packages and repositories are immutable and may
/// be freely shared across concurrent, independent solves.
#[derive(Debug, Default)]
pub struct Repository {
    packages: Vec<Arc<Package>>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, Vec<usize>>,
}

impl Repository {
    pub fn new() -> Repository {
        Repository::default()
    }

    /// Add a package, returning the shared handle it was stored under.
    /// Adding a package whose id already exists in this repository is a
    /// silent no-op that returns the existing handle (same dedup rule the
    /// pool applies across repositories).
    pub fn add(&mut self, package: Package) -> Arc<Package> {
        if let Some(&idx) = self.by_id.get(package.id()) {
            return self.packages[idx].clone();
        }

        let id = package.id().to_string();
        let name = package.name().to_string();
        let arc = Arc::new(package);
        let idx = self.packages.len();

        self.packages.push(arc.clone());
        self.by_id.insert(id, idx);
        self.by_name.entry(name).or_default().push(idx);

        arc
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn package_by_id(&self, id: &str) -> Option<&Arc<Package>> {
        self.by_id.get(id).map(|&idx| &self.packages[idx])
    }

    pub fn packages_by_name(&self, name: &str) -> Vec<&Arc<Package>> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&idx| &self.packages[idx])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;

    #[test]
    fn indexes_by_id_and_name() {
        let mut repo = Repository::new();
        repo.add(Package::parse("mkl-10.3.0").unwrap());
        repo.add(Package::parse("mkl-11.0.0").unwrap());

        assert_eq!(repo.len(), 2);
        assert!(repo.package_by_id("mkl-10.3.0").is_some());
        assert_eq!(repo.packages_by_name("mkl").len(), 2);
    }

    #[test]
    fn duplicate_id_is_a_silent_noop() {
        let mut repo = Repository::new();
        repo.add(Package::parse("mkl-10.3.0").unwrap());
        repo.add(Package::parse("mkl-10.3.0").unwrap());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut repo = Repository::new();
        repo.add(Package::parse("mkl-11.0.0").unwrap());
        repo.add(Package::parse("mkl-10.3.0").unwrap());

        let ids: Vec<_> = repo.iter().map(|p| p.id().to_string()).collect();
        assert_eq!(ids, vec!["mkl-11.0.0", "mkl-10.3.0"]);
    }
}
