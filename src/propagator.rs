//! Head/tail watched-literal unit propagation (§4.4).
//!
//! A fresh [`UnitPropagator`] is built for every decision level ("the driver
//! does not reinitialize the propagator for the next level; it constructs a
//! fresh one", §4.4), from the clause store's *current* contents (including
//! any clauses learned at shallower levels) and the valuation as it stands
//! right now.
//!
//! Per-clause literals are split into a *free list* (the literals still
//! unassigned at construction time) with a head/tail pair of indices into it.
//! While both pointers sit on free literals the clause can be neither unit
//! nor empty; shortening a pointer past a now-false literal restores that
//! invariant, amortized linear over true assignments and amortized constant
//! over false ones (the textbook watched-literals argument).

use dimacs::{Lit, Sign};
use log::trace;

use crate::bookkeeping::record_assignment;
use crate::clause::ClauseStore;
use crate::feeder::LiteralFeeder;
use crate::graph::ImplicationGraph;
use crate::trail::Trail;
use crate::valuation::{var_index, Valuation};

pub enum PropagateOutcome {
    Ok,
    Conflict,
}

struct UnitClause {
    clause: usize,
    literal: Lit,
}

enum LiteralState {
    True,
    False,
    Free,
}

pub struct UnitPropagator {
    /// The free (unassigned) literals of each clause, in clause order, as of
    /// construction time. Empty for any clause that was already satisfied.
    clauses: Vec<Vec<Lit>>,
    /// The original literal data of each clause, for graph-edge bookkeeping
    /// (§4.4 step 2: "every other literal m in c's original clause data").
    original: Vec<Vec<Lit>>,
    head_index: Vec<usize>,
    tail_index: Vec<usize>,
    pos_head: Vec<Vec<usize>>,
    neg_head: Vec<Vec<usize>>,
    pos_tail: Vec<Vec<usize>>,
    neg_tail: Vec<Vec<usize>>,
    /// LIFO queue of pending unit literals ("Within propagation, unit
    /// processing order is LIFO (stack)", §5).
    units: Vec<UnitClause>,
    ok: bool,
    conflict_clause: Option<usize>,
}

impl UnitPropagator {
    pub fn new(store: &ClauseStore, valuation: &Valuation) -> UnitPropagator {
        let num_vars = valuation.num_variables();
        let mut clauses = Vec::with_capacity(store.len());
        let mut original = Vec::with_capacity(store.len());
        let mut conflict_clause = None;

        for (idx, clause) in store.iter().enumerate() {
            original.push(clause.literals().to_vec());

            let mut satisfied = false;
            let mut free = Vec::new();
            for &lit in clause.literals() {
                if valuation.is_true(lit) {
                    satisfied = true;
                    break;
                }
                if valuation.is_unassigned(lit) {
                    free.push(lit);
                }
            }

            if satisfied {
                clauses.push(Vec::new());
            } else if free.is_empty() && conflict_clause.is_none() {
                // Already empty before a single literal was processed this
                // level: a prior level's decision made it so.
                conflict_clause = Some(idx);
                clauses.push(Vec::new());
            } else {
                clauses.push(free);
            }
        }

        let mut propagator = UnitPropagator {
            clauses,
            original,
            head_index: vec![0; store.len()],
            tail_index: vec![0; store.len()],
            pos_head: vec![Vec::new(); num_vars],
            neg_head: vec![Vec::new(); num_vars],
            pos_tail: vec![Vec::new(); num_vars],
            neg_tail: vec![Vec::new(); num_vars],
            units: Vec::new(),
            ok: conflict_clause.is_none(),
            conflict_clause,
        };

        for idx in 0..propagator.clauses.len() {
            if propagator.clauses[idx].is_empty() {
                continue; // satisfied, or the pre-existing conflict handled above
            }
            // Design Notes: the head/tail pair is initialised to (0, len-1)
            // *after* the free-literal list is populated, not (0, -1) against
            // an empty vector (the source's bug).
            let last = propagator.clauses[idx].len() - 1;
            propagator.head_index[idx] = 0;
            propagator.tail_index[idx] = last;
            propagator.register_head(idx);
            propagator.register_tail(idx);
        }

        propagator
    }

    fn register_head(&mut self, clause: usize) {
        let lit = self.clauses[clause][self.head_index[clause]];
        match lit.sign() {
            Sign::Pos => self.pos_head[var_index(lit)].push(clause),
            Sign::Neg => self.neg_head[var_index(lit)].push(clause),
        }
    }

    fn register_tail(&mut self, clause: usize) {
        let lit = self.clauses[clause][self.tail_index[clause]];
        match lit.sign() {
            Sign::Pos => self.pos_tail[var_index(lit)].push(clause),
            Sign::Neg => self.neg_tail[var_index(lit)].push(clause),
        }
    }

    fn literal_state(literal: Lit, valuation: &Valuation) -> LiteralState {
        if valuation.is_true(literal) {
            LiteralState::True
        } else if valuation.is_false(literal) {
            LiteralState::False
        } else {
            LiteralState::Free
        }
    }

    fn report_conflict(
        &mut self,
        clause: usize,
        store: &mut ClauseStore,
        valuation: &Valuation,
        graph: &mut ImplicationGraph,
        feeder: &mut dyn LiteralFeeder,
        level: usize,
    ) {
        self.ok = false;
        let learned = graph.analyze(&self.original[clause], valuation);
        trace!("conflict in clause {clause} at level {level}, learned {} literals", learned.len());
        let learned_idx = store.append(learned, valuation);
        feeder.on_conflict(store.at(learned_idx).literals());
    }

    /// Runs propagation to fixpoint at `level`, mutating `store`/`valuation`/
    /// `trail`/`graph` for every forced assignment, or reporting a conflict
    /// after appending exactly one learned clause and notifying `feeder`.
    pub fn propagate(
        mut self,
        store: &mut ClauseStore,
        valuation: &mut Valuation,
        trail: &mut Trail,
        graph: &mut ImplicationGraph,
        feeder: &mut dyn LiteralFeeder,
        level: usize,
    ) -> PropagateOutcome {
        graph.begin_level(level);

        if let Some(clause) = self.conflict_clause {
            self.report_conflict(clause, store, valuation, graph, feeder, level);
            return PropagateOutcome::Conflict;
        }

        // Seed: any clause already reduced to a single free literal is unit.
        for (idx, literals) in self.clauses.iter().enumerate() {
            if !literals.is_empty() && self.head_index[idx] == self.tail_index[idx] {
                self.units.push(UnitClause {
                    clause: idx,
                    literal: literals[self.head_index[idx]],
                });
            }
        }

        if self.units.is_empty() {
            return PropagateOutcome::Ok;
        }

        while self.ok {
            let Some(UnitClause { clause, literal }) = self.units.pop() else {
                break;
            };

            if valuation.is_true(literal) {
                continue;
            }
            if valuation.is_false(literal) {
                self.report_conflict(clause, store, valuation, graph, feeder, level);
                return PropagateOutcome::Conflict;
            }

            record_assignment(store, valuation, trail, level, literal);

            // Every other literal `m` in `c` is already false, and so is a
            // reason for `ℓ` — link directionally (`m` → `ℓ`). `m` is often
            // itself a decision; giving it an incoming edge from `ℓ` would
            // make `analyze` treat it as having a reason and never collect
            // it as the root of the conflict.
            for &other in self.original[clause].iter() {
                if other != literal {
                    graph.link(other, literal, level);
                }
            }

            self.propagate_value(literal, valuation);
        }

        if self.ok {
            PropagateOutcome::Ok
        } else {
            // propagate_value found an empty clause mid-shorten.
            let clause = self.conflict_clause.expect("ok=false implies a conflict clause");
            self.report_conflict(clause, store, valuation, graph, feeder, level);
            PropagateOutcome::Conflict
        }
    }

    /// Kills every literal of the opposite sign to `assigned`, shortening the
    /// clauses that watch them (§4.4 step 3).
    fn propagate_value(&mut self, assigned: Lit, valuation: &Valuation) {
        let idx = var_index(assigned);
        let (head_list, tail_list) = match assigned.sign() {
            Sign::Pos => (
                std::mem::take(&mut self.neg_head[idx]),
                std::mem::take(&mut self.neg_tail[idx]),
            ),
            Sign::Neg => (
                std::mem::take(&mut self.pos_head[idx]),
                std::mem::take(&mut self.pos_tail[idx]),
            ),
        };

        for clause in head_list {
            if self.ok {
                self.shorten_from_head(clause, valuation);
            }
        }
        for clause in tail_list {
            if self.ok {
                self.shorten_from_tail(clause, valuation);
            }
        }
    }

    fn shorten_from_head(&mut self, clause: usize, valuation: &Valuation) {
        let tail = self.tail_index[clause];
        let mut i = self.head_index[clause] + 1;
        while i <= tail {
            let literal = self.clauses[clause][i];
            match Self::literal_state(literal, valuation) {
                LiteralState::True => return,
                LiteralState::False => i += 1,
                LiteralState::Free => {
                    self.head_index[clause] = i;
                    if i == tail {
                        self.units.push(UnitClause { clause, literal });
                    } else {
                        self.register_head(clause);
                    }
                    return;
                }
            }
        }
        self.ok = false;
        self.conflict_clause = Some(clause);
    }

    fn shorten_from_tail(&mut self, clause: usize, valuation: &Valuation) {
        let head = self.head_index[clause];
        let mut i = self.tail_index[clause];
        while i > head {
            i -= 1;
            let literal = self.clauses[clause][i];
            match Self::literal_state(literal, valuation) {
                LiteralState::True => return,
                LiteralState::False => continue,
                LiteralState::Free => {
                    self.tail_index[clause] = i;
                    if i == head {
                        self.units.push(UnitClause { clause, literal });
                    } else {
                        self.register_tail(clause);
                    }
                    return;
                }
            }
        }
        self.ok = false;
        self.conflict_clause = Some(clause);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::feeder::SimpleFeeder;

    fn lits(values: &[i64]) -> Vec<Lit> {
        values.iter().map(|&v| Lit::from_i64(v)).collect()
    }

    #[test]
    fn unit_clause_forces_its_literal() {
        let mut store = ClauseStore::new(1, vec![lits(&[1])]);
        let mut valuation = Valuation::new(1);
        let mut trail = Trail::new();
        let mut graph = ImplicationGraph::new(1);
        let mut feeder = SimpleFeeder::new(1);

        let propagator = UnitPropagator::new(&store, &valuation);
        let outcome = propagator.propagate(
            &mut store,
            &mut valuation,
            &mut trail,
            &mut graph,
            &mut feeder,
            0,
        );
        assert!(matches!(outcome, PropagateOutcome::Ok));
        assert!(valuation.is_true(Lit::from_i64(1)));
    }

    #[test]
    fn contradictory_units_report_conflict() {
        let mut store = ClauseStore::new(1, vec![lits(&[1]), lits(&[-1])]);
        let mut valuation = Valuation::new(1);
        let mut trail = Trail::new();
        let mut graph = ImplicationGraph::new(1);
        let mut feeder = SimpleFeeder::new(1);

        let outcome = UnitPropagator::new(&store, &valuation).propagate(
            &mut store,
            &mut valuation,
            &mut trail,
            &mut graph,
            &mut feeder,
            0,
        );
        assert!(matches!(outcome, PropagateOutcome::Conflict));
    }

    #[test]
    fn a_chain_of_units_propagates_to_fixpoint() {
        // (1) & (-1 v 2) & (-2 v 3) => 1, 2, 3 all true.
        let mut store = ClauseStore::new(3, vec![lits(&[1]), lits(&[-1, 2]), lits(&[-2, 3])]);
        let mut valuation = Valuation::new(3);
        let mut trail = Trail::new();
        let mut graph = ImplicationGraph::new(3);
        let mut feeder = SimpleFeeder::new(3);

        let outcome = UnitPropagator::new(&store, &valuation).propagate(
            &mut store,
            &mut valuation,
            &mut trail,
            &mut graph,
            &mut feeder,
            0,
        );
        assert!(matches!(outcome, PropagateOutcome::Ok));
        assert!(valuation.is_true(Lit::from_i64(1)));
        assert!(valuation.is_true(Lit::from_i64(2)));
        assert!(valuation.is_true(Lit::from_i64(3)));
        assert_eq!(trail.level(0).len(), 3);
    }

    #[test]
    fn propagation_with_no_units_is_a_no_op() {
        let mut store = ClauseStore::new(2, vec![lits(&[1, 2])]);
        let mut valuation = Valuation::new(2);
        let mut trail = Trail::new();
        let mut graph = ImplicationGraph::new(2);
        let mut feeder = SimpleFeeder::new(2);

        let outcome = UnitPropagator::new(&store, &valuation).propagate(
            &mut store,
            &mut valuation,
            &mut trail,
            &mut graph,
            &mut feeder,
            0,
        );
        assert!(matches!(outcome, PropagateOutcome::Ok));
        assert_eq!(valuation.assigned_count(), 0);
    }
}
