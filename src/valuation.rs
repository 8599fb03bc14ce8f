use dimacs::{Lit, Sign};

/// Tri-valued truth for a single variable (§3 "Tri-valued truth").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    True,
    False,
    Unassigned,
}

impl Value {
    fn matches_sign(self, sign: Sign) -> bool {
        match (self, sign) {
            (Value::True, Sign::Pos) => true,
            (Value::False, Sign::Neg) => true,
            _ => false,
        }
    }
}

/// The partial assignment under construction. Indexed by variable, 1-based in
/// DIMACS terms but stored 0-based internally (see [`var_index`]).
pub struct Valuation {
    buffer: Vec<Value>,
    assigned_count: usize,
}

/// Maps a literal to its 0-based variable index into [`Valuation`]'s buffer.
pub fn var_index(literal: Lit) -> usize {
    literal.var().to_u64() as usize - 1
}

impl Valuation {
    pub fn new(num_variables: usize) -> Valuation {
        Valuation {
            buffer: vec![Value::Unassigned; num_variables],
            assigned_count: 0,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.buffer.len()
    }

    /// The value currently held by the variable underlying `literal`, independent
    /// of the literal's sign.
    pub fn value_of(&self, literal: Lit) -> Value {
        self.buffer[var_index(literal)]
    }

    pub fn value_of_var(&self, var_idx: usize) -> Value {
        self.buffer[var_idx]
    }

    pub fn is_true(&self, literal: Lit) -> bool {
        self.buffer[var_index(literal)].matches_sign(literal.sign())
    }

    pub fn is_false(&self, literal: Lit) -> bool {
        match self.buffer[var_index(literal)] {
            Value::Unassigned => false,
            value => !value.matches_sign(literal.sign()),
        }
    }

    pub fn is_unassigned(&self, literal: Lit) -> bool {
        self.buffer[var_index(literal)] == Value::Unassigned
    }

    pub fn is_var_unassigned(&self, var_idx: usize) -> bool {
        self.buffer[var_idx] == Value::Unassigned
    }

    /// Assigns the variable underlying `literal` so that `literal` itself becomes true.
    pub fn assign(&mut self, literal: Lit) {
        let idx = var_index(literal);
        debug_assert_eq!(self.buffer[idx], Value::Unassigned, "double assignment");
        self.buffer[idx] = match literal.sign() {
            Sign::Pos => Value::True,
            Sign::Neg => Value::False,
        };
        self.assigned_count += 1;
    }

    pub fn unassign(&mut self, literal: Lit) {
        let idx = var_index(literal);
        debug_assert_ne!(self.buffer[idx], Value::Unassigned, "double unassignment");
        self.buffer[idx] = Value::Unassigned;
        self.assigned_count -= 1;
    }

    /// Flips an already-assigned variable to the opposite truth value, without
    /// touching `assigned_count`. Used by the driver's phase-flip retry (§4.6).
    pub fn flip(&mut self, literal: Lit) {
        let idx = var_index(literal);
        self.buffer[idx] = match self.buffer[idx] {
            Value::True => Value::False,
            Value::False => Value::True,
            Value::Unassigned => unreachable!("flip of an unassigned variable"),
        };
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned_count
    }

    pub fn all_assigned(&self) -> bool {
        self.assigned_count == self.buffer.len()
    }

    /// Assigns TRUE to every variable still unassigned, per §4.6 and §6 ("Variables
    /// that remained UNASSIGNED at the end are assigned TRUE before printing").
    pub fn assign_remaining_true(&mut self) {
        for value in self.buffer.iter_mut() {
            if *value == Value::Unassigned {
                *value = Value::True;
            }
        }
    }

    /// Yields each variable's final signed literal, in variable order, treating
    /// any lingering `Unassigned` as TRUE (should not happen after
    /// [`Valuation::assign_remaining_true`], but kept total for direct printing).
    pub fn iter_model(&self) -> impl Iterator<Item = i64> + '_ {
        self.buffer.iter().enumerate().map(|(idx, value)| {
            let var = (idx + 1) as i64;
            match value {
                Value::False => -var,
                _ => var,
            }
        })
    }
}
