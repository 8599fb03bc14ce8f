use dimacs::Lit;

/// A sequence of per-decision-level lists of literals assigned at that level
/// (§3 "Trail", §4.2).
///
/// The trail owns no clause or valuation state; it is purely a record of *what
/// was assigned, at which level, in what order*, so that backtracking can undo
/// it symmetrically.
#[derive(Default)]
pub struct Trail {
    levels: Vec<Vec<Lit>>,
}

impl Trail {
    pub fn new() -> Trail {
        Trail { levels: Vec::new() }
    }

    fn ensure_level(&mut self, level: usize) {
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, Vec::new);
        }
    }

    /// Records `literal` as assigned at `level`.
    pub fn push(&mut self, level: usize, literal: Lit) {
        self.ensure_level(level);
        self.levels[level].push(literal);
    }

    pub fn level(&self, level: usize) -> &[Lit] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn level_len(&self, level: usize) -> usize {
        self.level(level).len()
    }

    /// Drops every entry at `level`, returning them so the caller can undo the
    /// matching valuation/counter changes in reverse order (LIFO, §4.2).
    pub fn take_level(&mut self, level: usize) -> Vec<Lit> {
        self.ensure_level(level);
        std::mem::take(&mut self.levels[level])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use dimacs::Lit;

    #[test]
    fn entries_are_ordered_per_level_and_take_clears() {
        let mut trail = Trail::new();
        trail.push(0, Lit::from_i64(1));
        trail.push(0, Lit::from_i64(2));
        trail.push(1, Lit::from_i64(3));

        assert_eq!(trail.level(0), &[Lit::from_i64(1), Lit::from_i64(2)]);
        assert_eq!(trail.level(1), &[Lit::from_i64(3)]);

        let taken = trail.take_level(0);
        assert_eq!(taken, vec![Lit::from_i64(1), Lit::from_i64(2)]);
        assert!(trail.level(0).is_empty());
        assert_eq!(trail.level(1), &[Lit::from_i64(3)]);
    }

    #[test]
    fn unused_level_is_empty() {
        let trail = Trail::new();
        assert!(trail.level(5).is_empty());
    }
}
