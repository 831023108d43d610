use crate::core::state::Cause;
use crate::core::*;
use std::fmt::{Debug, Formatter};

/// An event represents the removal of the values `[lo, hi]` from the domain of a variable.
///
/// All values of the interval are absent from the domain after the event, but some of them may
/// have been absent before. A single-value removal has `lo == hi`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Event {
    pub var: VarRef,
    pub lo: IntCst,
    pub hi: IntCst,
    pub cause: Cause,
}

impl Event {
    pub fn is_single_value(&self) -> bool {
        self.lo == self.hi
    }
}

impl Debug for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_single_value() {
            write!(f, "{:?} != {}  ({:?})", self.var, self.lo, self.cause)
        } else {
            write!(f, "{:?} !in [{}, {}]  ({:?})", self.var, self.lo, self.hi, self.cause)
        }
    }
}
