use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;

use depsolve_semver::Requirement;

use crate::compiler;
use crate::decisions::Decisions;
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::planner;
use crate::policy::Policy;
use crate::pool::Pool;
use crate::repository::Repository;
use crate::rule::Clause;

/// Decide every singleton clause's literal, per §4.7 step 2 / the "pure
/// literal" step of a DPLL iteration — the two share this exact operation.
/// A conflict here means two assertion clauses disagree on the same
/// package, which is an internal bug, never a reachable user-input state.
fn decide_assertions(clauses: Vec<Clause>, decisions: &mut Decisions) -> Result<Vec<Clause>> {
    let mut remaining = Vec::new();
    for clause in clauses {
        if let Some(literal) = clause.assertion_literal() {
            let ok = decisions.decide(&literal.id, literal.positive, Some(clause.clone()));
            if !ok {
                return Err(Error::Impossible(format!(
                    "conflicting assertion clauses for {:?}",
                    literal.id
                )));
            }
        } else {
            remaining.push(clause);
        }
    }
    Ok(remaining)
}

/// Propagate unit clauses to a fixpoint, recording each inference's reason.
/// A conflict discovered mid-propagation (a clause becomes false because of
/// an inference this very pass made) is an internal bug: the reference
/// algorithm never backtracks out of a partially-applied propagation, it
/// only offers the single conflict/retry point at `dpll_iteration`'s own
/// entry.
fn propagate_units(mut clauses: Vec<Clause>, decisions: &mut Decisions) -> Result<Vec<Clause>> {
    loop {
        let mut made_progress = false;

        for clause in &clauses {
            let (is_unit, inferable) = clause.is_unit(decisions);
            if !is_unit {
                continue;
            }
            match inferable {
                Some(literal) => {
                    let ok = decisions.decide(&literal.id, literal.positive, Some(clause.clone()));
                    if !ok {
                        return Err(Error::Impossible(format!(
                            "conflicting unit propagation for {:?}",
                            literal.id
                        )));
                    }
                    made_progress = true;
                }
                None => {
                    return Err(Error::Impossible(
                        "clause became false during unit propagation".to_string(),
                    ))
                }
            }
        }

        let mut next = Vec::with_capacity(clauses.len());
        for clause in clauses {
            match clause.satisfies_or_none(decisions) {
                Some(true) => {}
                Some(false) => {
                    return Err(Error::Impossible(
                        "clause evaluated false after unit propagation".to_string(),
                    ))
                }
                None => next.push(clause),
            }
        }
        clauses = next;

        if !made_progress {
            return Ok(clauses);
        }
    }
}

/// One DPLL iteration per §4.7: prune satisfied clauses (detecting a
/// conflict against the *pre-existing* decision set), propagate units to a
/// fixpoint, then eliminate any remaining singleton clauses.
///
/// Returns `(false, _)` only for the soft conflict the caller is expected to
/// retry by flipping its last free decision; anything discovered once
/// propagation has started is a hard [`Error::Impossible`].
fn dpll_iteration(clauses: &[Clause], decisions: &mut Decisions) -> Result<(bool, Vec<Clause>)> {
    let mut pruned = Vec::with_capacity(clauses.len());
    for clause in clauses {
        match clause.satisfies_or_none(decisions) {
            Some(true) => {}
            Some(false) => return Ok((false, Vec::new())),
            None => pruned.push(clause.clone()),
        }
    }

    let pruned = propagate_units(pruned, decisions)?;
    let remaining = decide_assertions(pruned, decisions)?;
    Ok((true, remaining))
}

fn undecided_literal_ids(clause: &Clause, decisions: &Decisions) -> Vec<String> {
    clause
        .literals()
        .iter()
        .filter(|l| decisions.value(&l.id).is_none())
        .map(|l| l.id.clone())
        .collect()
}

/// Narrow a job clause's undecided literals down to its real candidate set,
/// mirroring `solve_job_clauses`: prefer already-installed literals when any
/// are present among the undecided ones. If a package is already mid-update
/// this falls back to the §9 open question exactly as the reference
/// implementation does — a single `solve` call only ever processes one job,
/// so `updated_ids` is always empty today, but the guard stays wired in
/// ahead of a job queue that would populate it.
fn job_candidate_ids(
    undecided: Vec<String>,
    installed_ids: &HashSet<String>,
    updated_ids: &HashSet<String>,
) -> Result<Vec<String>> {
    if !updated_ids.is_empty() {
        return Err(Error::UpdateNotSupported);
    }

    let installed_present: Vec<String> = undecided
        .iter()
        .filter(|id| installed_ids.contains(*id))
        .cloned()
        .collect();
    Ok(if installed_present.is_empty() {
        undecided
    } else {
        installed_present
    })
}

/// Resolve `req` against `pool`, given the currently `installed` packages,
/// using `policy` to break ties at every free decision point. This is the
/// single public entry point tying together the clause compiler, the DPLL
/// solver, and the planner (§4.5–§4.8).
pub fn solve(
    pool: &Pool,
    req: &Requirement,
    installed: &Repository,
    policy: &Policy,
) -> Result<Vec<Operation>> {
    log::debug!("solving requirement {:?}", req.name());

    let compiled = compiler::compile(pool, req)?;
    let job_clause = compiled[0].clone();

    // Defensive re-dedup: the compiler already de-duplicates, but `solve`
    // re-applies the same canonical-key dedup so the job-clause slice taken
    // above and the working clause list never drift out of step.
    let clauses: Vec<Clause> = compiled.into_iter().collect::<IndexSet<_>>().into_iter().collect();

    let mut decisions = Decisions::new();
    let installed_ids: HashSet<String> = installed.iter().map(|p| p.id().to_string()).collect();
    // Always empty today: this design's `solve` resolves exactly one job
    // clause per call, so there is no prior job whose update could still be
    // in flight. Kept as real state (rather than omitted) so the guard in
    // `job_candidate_ids` is load-bearing the moment a caller queues more
    // than one job, per §9.
    let updated_ids: HashSet<String> = HashSet::new();

    let mut remaining: VecDeque<Clause> =
        decide_assertions(clauses, &mut decisions)?.into_iter().collect();

    log::debug!("job decision for requirement {:?}", req.name());
    if job_clause.satisfies_or_none(&decisions) != Some(true) {
        let undecided = undecided_literal_ids(&job_clause, &decisions);
        if undecided.is_empty() {
            return Err(Error::Impossible(
                "job clause is unsatisfiable after the assertion pass".to_string(),
            ));
        }

        let candidate_ids = job_candidate_ids(undecided, &installed_ids, &updated_ids)?;

        let chosen = policy.select(pool, &installed_ids, &candidate_ids)?;
        log::trace!("job decision selects {chosen:?}");
        decisions.decide(&chosen, true, Some(job_clause.clone()));

        let remaining_vec: Vec<Clause> = remaining.into_iter().collect();
        let (ok, next) = dpll_iteration(&remaining_vec, &mut decisions)?;
        if !ok {
            return Err(Error::Impossible(
                "job decision produced an immediate conflict".to_string(),
            ));
        }
        remaining = next.into_iter().collect();
    }

    log::debug!("entering main solver loop with {} clause(s)", remaining.len());
    while let Some(clause) = remaining.front().cloned() {
        match clause.satisfies_or_none(&decisions) {
            Some(true) => {
                remaining.pop_front();
                continue;
            }
            Some(false) => {
                return Err(Error::Impossible(
                    "a clause evaluated false in the main solver loop".to_string(),
                ))
            }
            None => {}
        }

        let undecided = undecided_literal_ids(&clause, &decisions);
        let candidate = policy.select(pool, &installed_ids, &undecided)?;

        let remaining_vec: Vec<Clause> = remaining.iter().cloned().collect();

        decisions.decide(&candidate, true, Some(clause.clone()));
        let (ok, after_true) = dpll_iteration(&remaining_vec, &mut decisions)?;
        if ok {
            remaining = after_true.into_iter().collect();
            continue;
        }

        decisions.undo(&candidate);
        decisions.decide(&candidate, false, Some(clause.clone()));
        let (ok2, after_false) = dpll_iteration(&remaining_vec, &mut decisions)?;
        if !ok2 {
            // Single-level backtrack exhausted. A complete implementation
            // would unwind further up the decision trail; this design
            // deliberately does not (§9 open question).
            decisions.undo(&candidate);
            return Err(Error::Impossible(format!(
                "unresolvable conflict on {candidate:?}; deeper backtracking is not implemented"
            )));
        }
        remaining = after_false.into_iter().collect();
    }

    planner::plan(pool, installed, &decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;
    use crate::repository::Repository;

    fn repo_of(strs: &[&str]) -> Repository {
        let mut repo = Repository::new();
        for s in strs {
            repo.add(Package::parse(s).unwrap());
        }
        repo
    }

    #[test]
    fn job_candidate_ids_rejects_in_flight_updates() {
        let updated: HashSet<String> = ["numpy-1.6.0".to_string()].into_iter().collect();
        let err = job_candidate_ids(vec!["numpy-1.7.0".to_string()], &HashSet::new(), &updated)
            .unwrap_err();
        assert!(matches!(err, Error::UpdateNotSupported));
    }

    #[test]
    fn job_candidate_ids_prefers_installed_among_undecided() {
        let installed: HashSet<String> = ["mkl-10.3.0".to_string()].into_iter().collect();
        let candidates = job_candidate_ids(
            vec!["mkl-10.3.0".to_string(), "mkl-11.0.0".to_string()],
            &installed,
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(candidates, vec!["mkl-10.3.0".to_string()]);
    }

    fn pool_from(repo: &Repository) -> Pool {
        let mut pool = Pool::new();
        pool.add_repository(repo);
        pool
    }

    #[test]
    fn pure_install() {
        let repo = repo_of(&["mkl-10.3.0", "mkl-11.0.0"]);
        let pool = pool_from(&repo);
        let installed = Repository::new();
        let req = Requirement::any("mkl");

        let ops = solve(&pool, &req, &installed, &Policy::new()).unwrap();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], Operation::Install(p) if p.id() == "mkl-11.0.0"));
    }

    #[test]
    fn install_with_dependency() {
        let repo = repo_of(&[
            "mkl-10.3.0",
            "mkl-11.0.0",
            "numpy-1.7.0; depends (mkl)",
        ]);
        let pool = pool_from(&repo);
        let installed = Repository::new();
        let req = Requirement::any("numpy");

        let ops = solve(&pool, &req, &installed, &Policy::new()).unwrap();
        let ids: Vec<_> = ops.iter().map(|op| op.target().id().to_string()).collect();
        assert!(ids.contains(&"mkl-11.0.0".to_string()));
        assert!(ids.contains(&"numpy-1.7.0".to_string()));
    }

    #[test]
    fn installed_takes_precedence_over_higher_version() {
        let repo = repo_of(&["mkl-10.3.0", "mkl-11.0.0"]);
        let pool = pool_from(&repo);
        let installed = repo_of(&["mkl-10.3.0"]);
        let req = Requirement::any("mkl");

        let ops = solve(&pool, &req, &installed, &Policy::new()).unwrap();
        assert!(ops.is_empty());
    }

    #[test]
    fn update_path() {
        let repo = repo_of(&["numpy-1.6.0", "numpy-1.7.0"]);
        let pool = pool_from(&repo);
        let installed = repo_of(&["numpy-1.6.0"]);
        let req = Requirement::parse("numpy >= 1.7.0").unwrap();
        let req = req.into_iter().next().unwrap();

        let ops = solve(&pool, &req, &installed, &Policy::new()).unwrap();
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            Operation::Update { from, to } => {
                assert_eq!(from.id(), "numpy-1.6.0");
                assert_eq!(to.id(), "numpy-1.7.0");
            }
            other => panic!("expected an update, got {other:?}"),
        }
    }

    #[test]
    fn provides_based_match() {
        let repo = repo_of(&[
            "nomkl_numpy-1.7.0; provides (numpy == 1.7.0)",
            "scipy-0.11.0; depends (numpy >= 1.4.0)",
        ]);
        let pool = pool_from(&repo);
        let installed = Repository::new();
        let req = Requirement::any("scipy");

        let ops = solve(&pool, &req, &installed, &Policy::new()).unwrap();
        let ids: Vec<_> = ops.iter().map(|op| op.target().id().to_string()).collect();
        assert!(ids.contains(&"nomkl_numpy-1.7.0".to_string()));
        assert!(ids.contains(&"scipy-0.11.0".to_string()));
    }

    #[test]
    fn missing_requirement_errors() {
        let repo = repo_of(&["mkl-10.3.0"]);
        let pool = pool_from(&repo);
        let installed = Repository::new();
        let req = Requirement::any("numpy");

        let err = solve(&pool, &req, &installed, &Policy::new()).unwrap_err();
        assert!(matches!(err, Error::MissingRequirementInPool(_)));
    }

    #[test]
    fn solving_twice_is_deterministic() {
        let repo = repo_of(&["mkl-10.3.0", "mkl-11.0.0", "numpy-1.7.0; depends (mkl)"]);
        let pool = pool_from(&repo);
        let installed = Repository::new();
        let req = Requirement::any("numpy");

        let first = solve(&pool, &req, &installed, &Policy::new()).unwrap();
        let second = solve(&pool, &req, &installed, &Policy::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn installed_equals_required_produces_empty_plan() {
        let repo = repo_of(&["mkl-11.0.0"]);
        let pool = pool_from(&repo);
        let installed = repo_of(&["mkl-11.0.0"]);
        let req = Requirement::any("mkl");

        let ops = solve(&pool, &req, &installed, &Policy::new()).unwrap();
        assert!(ops.is_empty());
    }
}
