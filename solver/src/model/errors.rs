use crate::core::{IntCst, IntVar};
use thiserror::Error;

/// Misuse of the modeling API.
///
/// These errors reveal a bug in the application rather than a property of the problem being
/// solved: they are never caused by search and are not recovered from by backtracking. The
/// `try_*` methods return them, the other ones panic with their message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("empty range [{0}, {1}]")]
    EmptyRange(IntCst, IntCst),
    #[error("value {0} is reserved to represent infinity")]
    ReservedValue(IntCst),
    #[error("variable {0:?} belongs to another manager")]
    ForeignVariable(IntVar),
    #[error("{constraint} expects {expected} variables, got {actual}")]
    Arity {
        constraint: &'static str,
        expected: &'static str,
        actual: usize,
    },
    #[error("cannot post a constraint during search (depth {0}), restart the search first")]
    NotAtRoot(u32),
    #[error("domain of width {0} is too wide to represent its holes (limit: {1}, see FDSOLVE_MAX_BITSET_WIDTH)")]
    TooWide(u64, u32),
}
