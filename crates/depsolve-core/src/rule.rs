use std::cmp::Ordering;

use crate::decisions::Decisions;

/// A signed reference to a package id: `+id` asserts the package is
/// selected, `-id` asserts it is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub id: String,
    pub positive: bool,
}

impl Literal {
    pub fn positive(id: impl Into<String>) -> Literal {
        Literal {
            id: id.into(),
            positive: true,
        }
    }

    pub fn negative(id: impl Into<String>) -> Literal {
        Literal {
            id: id.into(),
            positive: false,
        }
    }

    /// `Some(true)`/`Some(false)` if the literal's id is decided, `None` if
    /// it is still undecided under `decisions`.
    pub fn evaluate(&self, decisions: &Decisions) -> Option<bool> {
        decisions
            .value(&self.id)
            .map(|v| if self.positive { v } else { !v })
    }
}

fn literal_order(a: &Literal, b: &Literal) -> Ordering {
    a.id.cmp(&b.id).then(a.positive.cmp(&b.positive))
}

/// A disjunction of literals — a CNF clause (the system calls this a
/// "Rule" interchangeably with "Clause").
///
/// Literals are stored in a canonical order (sorted, deduplicated) so two
/// clauses built from the same logical disjunction compare and hash equal,
/// which is what lets the compiler de-duplicate clauses by literal set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(mut literals: Vec<Literal>) -> Clause {
        literals.sort_by(literal_order);
        literals.dedup();
        debug_assert!(!literals.is_empty(), "a clause must have at least one literal");
        Clause { literals }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn is_assertion(&self) -> bool {
        self.literals.len() == 1
    }

    /// The sole literal of an assertion clause.
    pub fn assertion_literal(&self) -> Option<&Literal> {
        if self.is_assertion() {
            self.literals.first()
        } else {
            None
        }
    }

    /// `Some(true)` if some literal is already true, `Some(false)` if every
    /// literal is decided false, `None` if still undecided.
    pub fn satisfies_or_none(&self, decisions: &Decisions) -> Option<bool> {
        let mut any_undecided = false;
        for literal in &self.literals {
            match literal.evaluate(decisions) {
                Some(true) => return Some(true),
                Some(false) => {}
                None => any_undecided = true,
            }
        }
        if any_undecided {
            None
        } else {
            Some(false)
        }
    }

    /// A clause is unit iff exactly `len - 1` of its literals are decided
    /// false. Returns `(is_unit, inferable_literal)`; if every literal is
    /// decided false the clause cannot be satisfied and `inferable_literal`
    /// is `None`.
    pub fn is_unit(&self, decisions: &Decisions) -> (bool, Option<Literal>) {
        let mut false_count = 0;
        let mut inferable = None;

        for literal in &self.literals {
            match decisions.value(&literal.id) {
                Some(value) => {
                    let literal_true = if literal.positive { value } else { !value };
                    if !literal_true {
                        false_count += 1;
                    }
                }
                None => inferable = Some(literal.clone()),
            }
        }

        if false_count == self.literals.len() {
            (true, None)
        } else if false_count + 1 == self.literals.len() {
            (true, inferable)
        } else {
            (false, None)
        }
    }
}
