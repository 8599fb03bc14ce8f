//! Loading a DIMACS CNF instance into the solver's own data structures
//! (§3 "DIMACS CNF", §6 "Input").

use std::path::{Path, PathBuf};

use dimacs::Instance;

use crate::clause::ClauseStore;
use crate::error::InputError;

/// A parsed CNF instance: variable count plus raw clause literals, ready to
/// be handed to [`ClauseStore::new`] and [`crate::valuation::Valuation::new`].
pub struct CnfFormula {
    num_variables: usize,
    clauses: Vec<Vec<dimacs::Lit>>,
}

impl CnfFormula {
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn into_clause_store(self) -> ClauseStore {
        ClauseStore::new(self.num_variables, self.clauses)
    }
}

impl TryFrom<Instance> for CnfFormula {
    type Error = InputError;

    fn try_from(instance: Instance) -> Result<Self, Self::Error> {
        match instance {
            Instance::Cnf { num_vars, clauses } => Ok(CnfFormula {
                num_variables: num_vars as usize,
                clauses: clauses.iter().map(|clause| clause.lits().to_vec()).collect(),
            }),
            Instance::Sat { .. } => Err(InputError::NotCnf),
        }
    }
}

/// Reads and parses a DIMACS CNF file at `path`.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<CnfFormula, InputError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    parse(&contents)
}

/// Parses a DIMACS CNF instance from an already-read string, e.g. stdin
/// (§6: "With no file argument, the instance is read from standard input").
pub fn parse(contents: &str) -> Result<CnfFormula, InputError> {
    let instance = dimacs::parse_dimacs(contents).map_err(|err| InputError::Parse(format!("{err:?}")))?;
    CnfFormula::try_from(instance)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_a_minimal_cnf_instance() {
        let dimacs = "p cnf 2 2\n1 2 0\n-1 -2 0\n";
        let formula = parse(dimacs).expect("valid CNF");
        assert_eq!(formula.num_variables(), 2);
        let store = formula.into_clause_store();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn rejects_sat_format_instances() {
        let sat = "p sat 2\n(1 2)\n";
        let err = parse(sat).unwrap_err();
        assert!(matches!(err, InputError::NotCnf));
    }

    #[test]
    fn surfaces_io_errors_for_a_missing_file() {
        let err = load_from_file("/nonexistent/path/does-not-exist.cnf").unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}
