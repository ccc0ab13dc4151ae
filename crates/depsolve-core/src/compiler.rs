use std::collections::HashSet;

use indexmap::IndexSet;

use depsolve_semver::Requirement;

use crate::error::{Error, Result};
use crate::pool::{Mode, Pool};
use crate::rule::{Clause, Literal};

/// Compile the CNF formula for an install request against `pool`, per §4.5.
///
/// The returned list always has the job clause at position 0 — the solver
/// relies on this to find its single entry-point decision.
pub fn compile(pool: &Pool, req: &Requirement) -> Result<Vec<Clause>> {
    let mut clauses: IndexSet<Clause> = IndexSet::new();

    let job_providers = pool.what_provides(req, Mode::Composer);
    if job_providers.is_empty() {
        return Err(Error::MissingRequirementInPool(req.name().to_string()));
    }
    let job_clause = Clause::new(
        job_providers
            .iter()
            .map(|p| Literal::positive(p.id()))
            .collect(),
    );
    clauses.insert(job_clause);

    let mut requirements_seen: IndexSet<Requirement> = IndexSet::new();
    requirements_seen.insert(req.clone());

    let mut visited_packages: HashSet<String> = HashSet::new();
    let mut stack: Vec<_> = job_providers.iter().map(|p| p.id().to_string()).collect();

    while let Some(id) = stack.pop() {
        if !visited_packages.insert(id.clone()) {
            continue;
        }
        let package = pool.package(&id)?.clone();

        for dep in package.dependencies() {
            requirements_seen.insert(dep.clone());

            let providers = pool.what_provides(dep, Mode::IncludeIndirect);
            if providers.is_empty() {
                return Err(Error::MissingRequirementInPool(dep.name().to_string()));
            }

            let mut literals = vec![Literal::negative(package.id())];
            literals.extend(providers.iter().map(|p| Literal::positive(p.id())));
            let clause = Clause::new(literals);
            log::debug!(
                "dependency closure: {} requires {} ({} provider(s))",
                package.id(),
                dep.name(),
                providers.len()
            );
            clauses.insert(clause);

            for provider in &providers {
                stack.push(provider.id().to_string());
            }
        }
    }

    // The "identity universe" for a conflict clique is every package that
    // could satisfy the *actual* requirement at hand (§4.5 step 3), not
    // every provider of the bare name — a dependency pinned to a narrow
    // range must not be cliqued against providers outside that range.
    for requirement in &requirements_seen {
        let siblings = pool.what_provides(requirement, Mode::Any);
        for i in 0..siblings.len() {
            for j in (i + 1)..siblings.len() {
                let clause = Clause::new(vec![
                    Literal::negative(siblings[i].id()),
                    Literal::negative(siblings[j].id()),
                ]);
                clauses.insert(clause);
            }
        }
    }

    Ok(clauses.into_iter().collect())
}
