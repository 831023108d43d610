// ========== Constraint ===========

use crate::core::state::*;
use crate::core::*;
use crate::create_ref_type;
use crate::reasoners::Contradiction;

use super::Watches;

// Unique ID of a propagator (assigned by the CP store)
create_ref_type!(PropagatorId);

impl std::fmt::Debug for PropagatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.to_u32())
    }
}

/// Propagation contract of a constraint.
///
/// A propagator is immutable once posted: everything that changes during search lives in the
/// domains, so that undoing domain changes is enough to restore the propagator's view.
pub trait Propagator: Send {
    /// Requests notifications on the variables of the constraint.
    fn setup(&self, id: PropagatorId, context: &mut Watches);

    /// Full propagation from the current domains.
    ///
    /// All changes must be made with the given `cause`, which is used to avoid notifying the
    /// propagator of its own inferences. In turn, the domains must be at a fixpoint of this
    /// propagator when it returns successfully.
    fn propagate(&self, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction>;

    /// Incremental propagation of a single event on one of the watched variables.
    ///
    /// Called only when the domains were at a fixpoint of this propagator before the event.
    /// The result must be at least as strong as [`Propagator::propagate`].
    fn propagate_event(&self, _event: &Event, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        self.propagate(domains, cause)
    }

    /// Variables involved in the constraint, in the order of their roles.
    fn variables(&self) -> Vec<VarRef>;

    fn arity(&self) -> usize {
        self.variables().len()
    }

    fn clone_box(&self) -> Box<dyn Propagator>;
}

/// A simple wrapper around a propagator for dynamic-dispatch
pub struct DynPropagator {
    pub(super) constraint: Box<dyn Propagator>,
}

impl Clone for DynPropagator {
    fn clone(&self) -> Self {
        DynPropagator {
            constraint: self.constraint.clone_box(),
        }
    }
}

impl<T: Propagator + 'static> From<T> for DynPropagator {
    fn from(propagator: T) -> Self {
        DynPropagator {
            constraint: Box::new(propagator),
        }
    }
}
