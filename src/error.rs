use std::path::PathBuf;

/// Errors that can occur while turning raw input into a [`crate::cnf::CnfFormula`].
///
/// These are the only *recoverable* errors in the crate (§7, kind 1): a malformed
/// header, a non-CNF instance, or an I/O failure reading the input file. Internal
/// inconsistencies (kind 2) are asserts, not `Result`s, and an unverifiable SAT
/// witness (kind 3) is reported as `s UNKNOWN`, not as an `Err`.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed DIMACS input: {0}")]
    Parse(String),

    #[error("expected a CNF instance, found a SAT-format instance")]
    NotCnf,
}
