use crate::core::state::{Cause, InvalidUpdate};
use std::fmt::{Display, Formatter};

pub mod cp;

/// Reason for which propagation failed. It is always recovered from by backtracking.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Contradiction {
    /// An update would have emptied the domain of a variable.
    InvalidUpdate(InvalidUpdate),
    /// The constraint identified by the cause cannot be satisfied in the current domains,
    /// although no domain was emptied.
    Infeasible(Cause),
}

impl From<InvalidUpdate> for Contradiction {
    fn from(empty: InvalidUpdate) -> Self {
        Contradiction::InvalidUpdate(empty)
    }
}

impl Display for Contradiction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Contradiction::InvalidUpdate(InvalidUpdate(var, cause)) => {
                write!(f, "empty domain for {var:?} ({cause:?})")
            }
            Contradiction::Infeasible(cause) => write!(f, "infeasible ({cause:?})"),
        }
    }
}
