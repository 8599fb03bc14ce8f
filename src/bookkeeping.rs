//! The one place assignments are made and unmade, shared by the driver's
//! decisions and the propagator's unit assignments.
//!
//! §9's "Counter symmetry" open question is resolved here: every assignment,
//! regardless of its source, runs its `positive`/`resolved` deltas over the
//! *full* occurrence lists of its variable, and every unassignment is its
//! exact inverse. This keeps `positive ≤ resolved ≤ |c|` (§8) invariant for
//! every clause, not just the one that happened to trigger the assignment.

use dimacs::{Lit, Sign};

use crate::clause::ClauseStore;
use crate::trail::Trail;
use crate::valuation::{var_index, Valuation};

fn update_counters_on_assign(store: &mut ClauseStore, literal: Lit) {
    let idx = var_index(literal);
    let agrees_with_positive = literal.sign() == Sign::Pos;

    let positive_clauses = store.positive_occur(idx).to_vec();
    let negative_clauses = store.negative_occur(idx).to_vec();

    for clause in positive_clauses {
        if agrees_with_positive {
            store.mark_true(clause);
        } else {
            store.mark_false(clause);
        }
    }
    for clause in negative_clauses {
        if agrees_with_positive {
            store.mark_false(clause);
        } else {
            store.mark_true(clause);
        }
    }
}

fn update_counters_on_unassign(store: &mut ClauseStore, literal: Lit) {
    let idx = var_index(literal);
    let agrees_with_positive = literal.sign() == Sign::Pos;

    let positive_clauses = store.positive_occur(idx).to_vec();
    let negative_clauses = store.negative_occur(idx).to_vec();

    for clause in positive_clauses {
        if agrees_with_positive {
            store.unmark_true(clause);
        } else {
            store.unmark_false(clause);
        }
    }
    for clause in negative_clauses {
        if agrees_with_positive {
            store.unmark_false(clause);
        } else {
            store.unmark_true(clause);
        }
    }
}

/// Assigns `literal` so that it is true, records it on the trail at `level`,
/// and updates every clause counter it touches.
pub fn record_assignment(
    store: &mut ClauseStore,
    valuation: &mut Valuation,
    trail: &mut Trail,
    level: usize,
    literal: Lit,
) {
    valuation.assign(literal);
    trail.push(level, literal);
    update_counters_on_assign(store, literal);
}

/// The exact inverse of [`record_assignment`]'s effect on `store`/`valuation`
/// (the trail entry itself is dropped by the caller via
/// [`crate::trail::Trail::take_level`]).
pub fn undo_assignment(store: &mut ClauseStore, valuation: &mut Valuation, literal: Lit) {
    update_counters_on_unassign(store, literal);
    valuation.unassign(literal);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clause::ClauseStore;

    #[test]
    fn assign_then_undo_restores_all_touched_counters() {
        let mut store = ClauseStore::new(
            2,
            vec![
                vec![Lit::from_i64(1), Lit::from_i64(2)],
                vec![Lit::from_i64(-1), Lit::from_i64(2)],
            ],
        );
        let mut valuation = Valuation::new(2);
        let mut trail = Trail::new();

        record_assignment(&mut store, &mut valuation, &mut trail, 0, Lit::from_i64(1));
        assert!(store.at(0).is_satisfied());
        assert!(store.at(1).is_unit());

        undo_assignment(&mut store, &mut valuation, Lit::from_i64(1));
        assert!(!store.at(0).is_satisfied());
        assert!(!store.at(1).is_unit());
        assert!(valuation.is_unassigned(Lit::from_i64(1)));
    }
}
