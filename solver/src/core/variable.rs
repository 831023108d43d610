use crate::create_ref_type;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};

create_ref_type!(VarRef);

// `var` represents a variable
impl Debug for VarRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "var{:?}", self.to_u32())
    }
}

/// Identifies a [`Manager`](crate::solver::Manager) for the whole life of the process.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ManagerId(u32);

impl ManagerId {
    /// Returns an identifier that was never handed out before.
    pub fn fresh() -> ManagerId {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        ManagerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to an integer variable of a manager.
///
/// The handle is a plain index tagged with the manager that created it: passing it to another
/// manager is a programmer error that is detected and reported as a
/// [`ModelError::ForeignVariable`](crate::model::ModelError::ForeignVariable).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntVar {
    var: VarRef,
    manager: ManagerId,
}

impl IntVar {
    pub(crate) fn new(var: VarRef, manager: ManagerId) -> IntVar {
        IntVar { var, manager }
    }

    /// Index of the variable in its manager.
    pub fn var_ref(self) -> VarRef {
        self.var
    }

    pub fn manager(self) -> ManagerId {
        self.manager
    }
}

impl From<IntVar> for VarRef {
    fn from(v: IntVar) -> Self {
        v.var
    }
}

impl Debug for IntVar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_ids_are_unique() {
        let a = ManagerId::fresh();
        let b = ManagerId::fresh();
        assert_ne!(a, b);
        let v = IntVar::new(VarRef::from_u32(3), a);
        assert_ne!(v, IntVar::new(VarRef::from_u32(3), b));
        assert_eq!(format!("{v:?}"), "var3");
    }
}
