//! Decision heuristics (§4.5 "Decision heuristic (literal feeder)").
//!
//! Three interchangeable policies share one capability set. The engine holds a
//! `Box<dyn LiteralFeeder>` (per the spec's own design note: "the engine should
//! be polymorphic over the capability set... dynamic dispatch cost is dwarfed
//! by propagation work").

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use dimacs::Lit;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::clause::ClauseStore;
use crate::valuation::{var_index, Value};

/// `0` is the feeder's sentinel for "no more variables" (§3 "the literal `0`
/// is reserved as a terminator").
pub const NO_LITERAL: i64 = 0;

pub trait LiteralFeeder {
    /// Returns an unassigned variable to branch on (always positive), or `0`
    /// once exhausted.
    fn next_literal(&mut self) -> i64;

    /// The phase to try first for `literal`.
    fn phase(&self, literal: i64) -> Value;

    /// Returns `literal` to the pool of candidates, undoing one `next_literal` call.
    fn put_back(&mut self, literal: i64);

    /// Notifies the feeder that `learned_clause` was derived from a conflict.
    fn on_conflict(&mut self, learned_clause: &[Lit]);
}

/// Emits variables `1, 2, …, N` in order; phase always TRUE (§4.5 "Simple").
pub struct SimpleFeeder {
    next: i64,
    bound: i64,
}

impl SimpleFeeder {
    pub fn new(num_variables: usize) -> SimpleFeeder {
        SimpleFeeder {
            next: 1,
            bound: num_variables as i64,
        }
    }
}

impl LiteralFeeder for SimpleFeeder {
    fn next_literal(&mut self) -> i64 {
        if self.next <= self.bound {
            let literal = self.next;
            self.next += 1;
            literal
        } else {
            NO_LITERAL
        }
    }

    fn phase(&self, _literal: i64) -> Value {
        Value::True
    }

    fn put_back(&mut self, literal: i64) {
        self.next = literal;
    }

    fn on_conflict(&mut self, _learned_clause: &[Lit]) {}
}

/// Emits a random permutation of `1..N`; each variable's phase is fixed,
/// randomly, at construction (§4.5 "Randomized").
pub struct RandomizedFeeder {
    next: usize,
    order: Vec<i64>,
    phase_of: Vec<Value>,
}

impl RandomizedFeeder {
    pub fn new(num_variables: usize, seed: u64) -> RandomizedFeeder {
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut order: Vec<i64> = (1..=num_variables as i64).collect();
        order.shuffle(&mut rng);

        let phase_of = (0..num_variables)
            .map(|_| if rng.gen_bool(0.5) { Value::True } else { Value::False })
            .collect();

        RandomizedFeeder {
            next: 0,
            order,
            phase_of,
        }
    }
}

impl LiteralFeeder for RandomizedFeeder {
    fn next_literal(&mut self) -> i64 {
        if self.next < self.order.len() {
            let literal = self.order[self.next];
            self.next += 1;
            literal
        } else {
            NO_LITERAL
        }
    }

    fn phase(&self, literal: i64) -> Value {
        self.phase_of[literal as usize - 1]
    }

    fn put_back(&mut self, _literal: i64) {
        self.next -= 1;
    }

    fn on_conflict(&mut self, _learned_clause: &[Lit]) {}
}

/// Decays every score by `δ ≈ 1.05` on each conflict, per §4.5.
const CONFLICT_DECAY: f64 = 1.05;

#[derive(Debug, Clone, Copy)]
struct ScoredVar {
    score: f64,
    var: usize,
}

impl PartialEq for ScoredVar {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for ScoredVar {}

impl Ord for ScoredVar {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }
}

impl PartialOrd for ScoredVar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Initial score = occurrence count in the original formula, maintained in a
/// max-heap; a conflict decays every score and bumps the variables in the
/// learned clause (§4.5 "VSIDS-like").
pub struct VsidsFeeder {
    heap: BinaryHeap<ScoredVar>,
    counter: Vec<f64>,
    phase_of: Vec<Value>,
}

impl VsidsFeeder {
    pub fn new(num_variables: usize, store: &ClauseStore, seed: u64) -> VsidsFeeder {
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut counter = vec![0.0; num_variables];
        for clause in store.iter() {
            for &lit in clause.literals() {
                counter[var_index(lit)] += 1.0;
            }
        }

        let heap = (0..num_variables)
            .map(|var| ScoredVar {
                score: counter[var],
                var,
            })
            .collect();

        let phase_of = (0..num_variables)
            .map(|_| if rng.gen_bool(0.5) { Value::True } else { Value::False })
            .collect();

        VsidsFeeder {
            heap,
            counter,
            phase_of,
        }
    }
}

impl LiteralFeeder for VsidsFeeder {
    fn next_literal(&mut self) -> i64 {
        match self.heap.pop() {
            Some(scored) => (scored.var + 1) as i64,
            None => NO_LITERAL,
        }
    }

    fn phase(&self, literal: i64) -> Value {
        self.phase_of[literal as usize - 1]
    }

    fn put_back(&mut self, literal: i64) {
        let var = literal as usize - 1;
        self.heap.push(ScoredVar {
            score: self.counter[var],
            var,
        });
    }

    fn on_conflict(&mut self, learned_clause: &[Lit]) {
        for score in self.counter.iter_mut() {
            *score /= CONFLICT_DECAY;
        }
        for &lit in learned_clause {
            self.counter[var_index(lit)] += 1.0;
        }

        // Re-heapify: every entry currently in the heap needs its score
        // refreshed from the just-updated counters.
        let present: Vec<usize> = self.heap.drain().map(|scored| scored.var).collect();
        self.heap = present
            .into_iter()
            .map(|var| ScoredVar {
                score: self.counter[var],
                var,
            })
            .collect();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn simple_feeder_counts_up_then_exhausts() {
        let mut feeder = SimpleFeeder::new(10);
        let emitted: Vec<i64> = (0..12).map(|_| feeder.next_literal()).collect();
        assert_eq!(
            emitted,
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 0, 0]
        );
    }

    #[test]
    fn simple_feeder_single_variable() {
        let mut feeder = SimpleFeeder::new(1);
        assert_eq!(feeder.next_literal(), 1);
        assert_eq!(feeder.next_literal(), 0);
        assert_eq!(feeder.next_literal(), 0);
    }

    #[test]
    fn simple_feeder_put_back_resets_cursor() {
        let mut feeder = SimpleFeeder::new(3);
        assert_eq!(feeder.next_literal(), 1);
        assert_eq!(feeder.next_literal(), 2);
        feeder.put_back(2);
        assert_eq!(feeder.next_literal(), 2);
        assert_eq!(feeder.next_literal(), 3);
    }

    #[test]
    fn randomized_feeder_is_deterministic_given_a_seed() {
        let mut a = RandomizedFeeder::new(20, 42);
        let mut b = RandomizedFeeder::new(20, 42);
        let seq_a: Vec<i64> = (0..20).map(|_| a.next_literal()).collect();
        let seq_b: Vec<i64> = (0..20).map(|_| b.next_literal()).collect();
        assert_eq!(seq_a, seq_b);

        let mut seen: Vec<i64> = seq_a.clone();
        seen.sort_unstable();
        assert_eq!(seen, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn vsids_conflict_ranks_participants_above_the_rest() {
        let store = ClauseStore::new(
            5,
            vec![
                vec![Lit::from_i64(1), Lit::from_i64(2)],
                vec![Lit::from_i64(2), Lit::from_i64(3)],
                vec![Lit::from_i64(4), Lit::from_i64(5)],
            ],
        );
        let mut feeder = VsidsFeeder::new(5, &store, 7);
        feeder.on_conflict(&[Lit::from_i64(3), Lit::from_i64(-5)]);

        let first = feeder.next_literal();
        let second = feeder.next_literal();
        let mut top_two = [first, second];
        top_two.sort_unstable();
        assert_eq!(top_two, [3, 5]);
    }
}
