//! The recursive DPLL search driver (§4.6).
//!
//! One level is one decision plus everything propagation forces as a
//! consequence of it; both live in the same trail level, and either both
//! survive or both are undone together. A level that runs out of phases to
//! try reports UNSAT to its caller, which itself then undoes its own level
//! and tries the other phase, or gives up in turn.

use dimacs::Lit;
use log::debug;

use crate::bookkeeping::{record_assignment, undo_assignment};
use crate::clause::ClauseStore;
use crate::feeder::{LiteralFeeder, NO_LITERAL};
use crate::graph::ImplicationGraph;
use crate::propagator::{PropagateOutcome, UnitPropagator};
use crate::trail::Trail;
use crate::valuation::Valuation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Satisfiable,
    Unsatisfiable,
    /// The search gave up without an answer (§7 kind 3). Unreachable for this
    /// driver, which always runs the full recursion to completion, but kept
    /// so the status type has somewhere to go if a resource bound is added.
    Unknown,
}

pub struct SolveResult {
    pub status: Status,
    pub model: Option<Vec<i64>>,
}

/// Drives the search to completion and, on SAT, verifies the resulting model
/// against every original clause before returning it (§4.6: "never report SAT
/// without this check").
pub fn solve(
    store: &mut ClauseStore,
    valuation: &mut Valuation,
    feeder: &mut dyn LiteralFeeder,
) -> SolveResult {
    if store.has_conflicting_clause() {
        return SolveResult {
            status: Status::Unsatisfiable,
            model: None,
        };
    }

    let mut trail = Trail::new();
    let mut graph = ImplicationGraph::new(valuation.num_variables());

    let satisfiable = solve_level(store, valuation, &mut trail, &mut graph, feeder, 0);

    if !satisfiable {
        return SolveResult {
            status: Status::Unsatisfiable,
            model: None,
        };
    }

    valuation.assign_remaining_true();

    if !verify(store, valuation) {
        // A correct implementation never reaches this; kept as a hard
        // backstop rather than silently reporting a wrong model as SAT.
        return SolveResult {
            status: Status::Unknown,
            model: None,
        };
    }

    SolveResult {
        status: Status::Satisfiable,
        model: Some(valuation.iter_model().collect()),
    }
}

fn verify(store: &ClauseStore, valuation: &Valuation) -> bool {
    store.iter().all(|clause| clause.literals().iter().any(|&lit| valuation.is_true(lit)))
}

/// Runs propagation at `level`, then either reports success, or picks a
/// decision literal and recurses, trying both phases before giving up.
fn solve_level(
    store: &mut ClauseStore,
    valuation: &mut Valuation,
    trail: &mut Trail,
    graph: &mut ImplicationGraph,
    feeder: &mut dyn LiteralFeeder,
    level: usize,
) -> bool {
    let propagator = UnitPropagator::new(store, valuation);
    match propagator.propagate(store, valuation, trail, graph, feeder, level) {
        PropagateOutcome::Conflict => {
            undo_level(store, valuation, trail, level);
            return false;
        }
        PropagateOutcome::Ok => {}
    }

    if store.all_satisfied() || valuation.all_assigned() {
        return true;
    }

    // `next_literal` draws from a single pool shared by the whole search, so
    // a candidate skipped here because it's already assigned must be handed
    // back rather than discarded, or it is lost to every sibling branch that
    // backtracking later frees it into. Restore skipped candidates in the
    // reverse order they were drawn: `SimpleFeeder::put_back` only remembers
    // the most recent call, so restoring last-skipped-first leaves its cursor
    // on the smallest one, rather than silently dropping it.
    let mut skipped = Vec::new();
    let candidate = loop {
        let next = feeder.next_literal();
        if next == NO_LITERAL {
            break NO_LITERAL;
        }
        if valuation.is_var_unassigned(next as usize - 1) {
            break next;
        }
        skipped.push(next);
    };
    for literal in skipped.into_iter().rev() {
        feeder.put_back(literal);
    }

    if candidate == NO_LITERAL {
        undo_level(store, valuation, trail, level);
        return false;
    }

    debug!("level {level}: deciding on variable {candidate}");

    if try_phase(store, valuation, trail, graph, feeder, level, candidate, true)
        || try_phase(store, valuation, trail, graph, feeder, level, candidate, false)
    {
        return true;
    }

    feeder.put_back(candidate);
    undo_level(store, valuation, trail, level);
    false
}

fn try_phase(
    store: &mut ClauseStore,
    valuation: &mut Valuation,
    trail: &mut Trail,
    graph: &mut ImplicationGraph,
    feeder: &mut dyn LiteralFeeder,
    level: usize,
    variable: i64,
    first_phase: bool,
) -> bool {
    use crate::valuation::Value;

    let wants_true = if first_phase {
        feeder.phase(variable) == Value::True
    } else {
        feeder.phase(variable) != Value::True
    };
    let decision = if wants_true { Lit::from_i64(variable) } else { Lit::from_i64(-variable) };

    record_assignment(store, valuation, trail, level + 1, decision);
    solve_level(store, valuation, trail, graph, feeder, level + 1)
}

fn undo_level(store: &mut ClauseStore, valuation: &mut Valuation, trail: &mut Trail, level: usize) {
    for literal in trail.take_level(level).into_iter().rev() {
        undo_assignment(store, valuation, literal);
    }
}
