use depsolve_semver::{Requirement, Version};

/// An immutable, content-addressed package record.
///
/// `provides`/`dependencies` are canonicalized at construction (sorted by
/// their `Display` form) so that two packages built from the same logical
/// data always compare and hash equal, regardless of the order their
/// requirements were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Package {
    name: String,
    version: Version,
    provides: Vec<Requirement>,
    dependencies: Vec<Requirement>,
    id: String,
}

fn canonicalize(mut reqs: Vec<Requirement>) -> Vec<Requirement> {
    reqs.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    reqs.dedup_by(|a, b| a == b);
    reqs
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        version: Version,
        provides: Vec<Requirement>,
        dependencies: Vec<Requirement>,
    ) -> Package {
        let name = name.into();
        let id = format!("{name}-{version}");
        Package {
            name,
            version,
            provides: canonicalize(provides),
            dependencies: canonicalize(dependencies),
            id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn provides(&self) -> &[Requirement] {
        &self.provides
    }

    pub fn dependencies(&self) -> &[Requirement] {
        &self.dependencies
    }

    /// Stable content-derived id, used as the SAT-variable name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Parse `"name-version[; depends (...)][; provides (...)]"` into a
    /// `Package`, per the package-string grammar §4.3/§6.
    pub fn parse(s: &str) -> depsolve_semver::Result<Package> {
        let parsed = depsolve_semver::parse_package_string(s)?;
        let version = Version::parse_loose(&parsed.version)?;
        Ok(Package::new(
            parsed.name,
            version,
            parsed.provides,
            parsed.depends,
        ))
    }
}
