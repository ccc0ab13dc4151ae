use std::sync::Arc;

use crate::package::Package;

/// A single step of a resolved plan, per §4.8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Install(Arc<Package>),
    Update { from: Arc<Package>, to: Arc<Package> },
    Remove(Arc<Package>),
}

impl Operation {
    /// The package this operation installs or removes — `to` for an update.
    pub fn target(&self) -> &Arc<Package> {
        match self {
            Operation::Install(p) => p,
            Operation::Update { to, .. } => to,
            Operation::Remove(p) => p,
        }
    }
}
