pub mod bookkeeping;
pub mod clause;
pub mod cnf;
pub mod error;
pub mod feeder;
pub mod graph;
pub mod propagator;
pub mod solver;
pub mod trail;
pub mod valuation;

pub use cnf::CnfFormula;
pub use error::InputError;
pub use solver::{solve, SolveResult, Status};
