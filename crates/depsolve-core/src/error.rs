use thiserror::Error;

/// Errors produced while building a pool, compiling clauses, or solving.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Version(#[from] depsolve_semver::Error),

    #[error("no package in the pool provides requirement {0:?}")]
    MissingRequirementInPool(String),

    #[error("no package with id {0:?} in the pool")]
    MissingPackageInPool(String),

    #[error("impossible situation during solving: {0}")]
    Impossible(String),

    #[error("updating an already-selected package is not yet supported")]
    UpdateNotSupported,

    #[error("policy produced candidates spanning more than one package name: {0:?}")]
    AmbiguousPackageName(Vec<String>),

    #[error("policy could not narrow {name:?} down to a single candidate: {candidates:?}")]
    AmbiguousCandidate {
        name: String,
        candidates: Vec<String>,
    },

    #[error("package {name:?} is installed more than once, which the planner cannot diff")]
    AmbiguousInstalledPackage { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
