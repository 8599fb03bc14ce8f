use dimacs::Lit;
use fixedbitset::FixedBitSet;

use crate::valuation::{var_index, Value, Valuation};

/// Per-variable node storing, for each decision level, incoming "reason" edges
/// and outgoing edges (§3 "Implication graph", §4.3).
///
/// Adjacency is indexed `[variable][level]` per the spec's redesign note:
/// "store the graph as a dense array indexed by variable id; adjacency lists
/// hold variable_id (not pointers); level is an outer axis of adjacency" is
/// inverted here to variable-as-outer-axis, which is the layout §3 actually
/// describes ("For every variable, two arrays indexed by level").
pub struct ImplicationGraph {
    edges: Vec<Vec<Vec<usize>>>,
    rev_edges: Vec<Vec<Vec<usize>>>,
}

impl ImplicationGraph {
    pub fn new(num_variables: usize) -> ImplicationGraph {
        ImplicationGraph {
            edges: vec![Vec::new(); num_variables],
            rev_edges: vec![Vec::new(); num_variables],
        }
    }

    /// Ensures the adjacency arrays are sized for `level`, and clears the
    /// level-`level` bucket of every node (§4.3 `begin_level`). Edges for a
    /// level are additive until the next `begin_level` call for that level.
    pub fn begin_level(&mut self, level: usize) {
        for node in self.edges.iter_mut() {
            if node.len() <= level {
                node.resize_with(level + 1, Vec::new);
            } else {
                node[level].clear();
            }
        }
        for node in self.rev_edges.iter_mut() {
            if node.len() <= level {
                node.resize_with(level + 1, Vec::new);
            } else {
                node[level].clear();
            }
        }
    }

    /// Adds a forward edge from `from` (the reason) to `to` (the implied
    /// literal) at `level`, plus the mirror `rev_edges` entry (§4.3 `link`).
    ///
    /// Directional only: when a clause's other, already-false literals `m`
    /// are each a reason for the newly implied literal `ℓ`, call
    /// `link(m, ℓ, level)` — never the reverse. `m` is frequently a decision
    /// itself; giving it an incoming `rev_edges` entry for `ℓ` would make
    /// `analyze` see it as having a reason and skip collecting it.
    pub fn link(&mut self, from: Lit, to: Lit, level: usize) {
        let from_idx = var_index(from);
        let to_idx = var_index(to);
        self.edges[from_idx][level].push(to_idx);
        self.rev_edges[to_idx][level].push(from_idx);
    }

    /// DFS from every literal of `conflict_literals`, following `rev_edges`
    /// across all levels; nodes with no incoming edges are decisions or roots.
    /// Collects the negations of the decisions reached, recovering polarity
    /// from `valuation` (§4.3 `analyze`).
    ///
    /// Each node is visited once, bounding the walk by graph size. A
    /// `rev_edges` entry whose reason variable is currently UNASSIGNED is a
    /// stale edge from an abandoned branch (levels are only cleared when
    /// revisited, not on backtrack) and is ignored rather than followed or
    /// counted towards `has_reason`, so a reachable leaf is always assigned.
    pub fn analyze(&self, conflict_literals: &[Lit], valuation: &Valuation) -> Vec<Lit> {
        let mut visited = FixedBitSet::with_capacity(self.edges.len());
        let mut stack: Vec<usize> = conflict_literals.iter().map(|&lit| var_index(lit)).collect();
        let mut learned = Vec::new();

        while let Some(var) = stack.pop() {
            if visited.contains(var) {
                continue;
            }
            visited.insert(var);

            let reasons = self.rev_edges[var].iter().flatten().copied();
            let mut has_reason = false;
            for reason in reasons {
                if valuation.is_var_unassigned(reason) {
                    continue;
                }
                has_reason = true;
                if !visited.contains(reason) {
                    stack.push(reason);
                }
            }

            if !has_reason {
                learned.push(negation_of(var, valuation));
            }
        }

        learned
    }
}

fn negation_of(var_idx: usize, valuation: &Valuation) -> Lit {
    let var = (var_idx + 1) as i64;
    match valuation.value_of_var(var_idx) {
        Value::True => Lit::from_i64(-var),
        Value::False => Lit::from_i64(var),
        Value::Unassigned => unreachable!("a decision reached by analyze must be assigned"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decision_with_no_incoming_edges_contributes_its_negation() {
        let mut graph = ImplicationGraph::new(3);
        graph.begin_level(0);
        let mut valuation = Valuation::new(3);
        valuation.assign(Lit::from_i64(1));

        let learned = graph.analyze(&[Lit::from_i64(1)], &valuation);
        assert_eq!(learned, vec![Lit::from_i64(-1)]);
    }

    #[test]
    fn propagated_literal_resolves_to_its_reasons() {
        let mut graph = ImplicationGraph::new(3);
        graph.begin_level(0);
        // variable 2 (the decision) implied variable 3 via some clause.
        graph.link(Lit::from_i64(2), Lit::from_i64(-3), 0);

        let mut valuation = Valuation::new(3);
        valuation.assign(Lit::from_i64(2));
        valuation.assign(Lit::from_i64(-3));

        let learned = graph.analyze(&[Lit::from_i64(-3)], &valuation);
        assert_eq!(learned, vec![Lit::from_i64(-2)]);
    }

    #[test]
    fn each_node_is_visited_once() {
        let mut graph = ImplicationGraph::new(2);
        graph.begin_level(0);
        // Two clauses independently recorded variable 1 as a reason for variable 2.
        graph.link(Lit::from_i64(1), Lit::from_i64(2), 0);
        graph.link(Lit::from_i64(1), Lit::from_i64(2), 0);

        let mut valuation = Valuation::new(2);
        valuation.assign(Lit::from_i64(1));
        valuation.assign(Lit::from_i64(2));

        let learned = graph.analyze(&[Lit::from_i64(2)], &valuation);
        assert_eq!(learned, vec![Lit::from_i64(-1)]);
    }

    #[test]
    fn stale_edge_to_a_now_unassigned_variable_is_ignored() {
        let mut graph = ImplicationGraph::new(2);
        // An abandoned branch recorded variable 1 as a reason for variable 2
        // at level 1, then backtracked without level 1 ever being revisited.
        graph.begin_level(1);
        graph.link(Lit::from_i64(1), Lit::from_i64(2), 1);

        // The current branch re-derives variable 2 independently, with no
        // live reason at its own level.
        graph.begin_level(0);
        let mut valuation = Valuation::new(2);
        valuation.assign(Lit::from_i64(2));
        // Variable 1 is unassigned in the current branch: the level-1 edge
        // is stale and must not be followed into `negation_of`, which would
        // otherwise panic on an unassigned variable.
        let learned = graph.analyze(&[Lit::from_i64(2)], &valuation);
        assert_eq!(learned, vec![Lit::from_i64(-2)]);
    }
}
