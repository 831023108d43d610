use crate::reasoners::cp::PropagatorId;

/// Origin of a domain update.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Cause {
    /// Event caused by a decision of the search.
    Decision,
    /// Event that resulted from the application code, e.g. restricting a domain while modeling.
    /// This should only occur at the root of the search tree.
    Encoding,
    /// The event is due to an inference of the identified propagator.
    /// The propagator is not notified of the events it caused itself.
    Inference(PropagatorId),
}

impl Cause {
    /// Returns true if the update was inferred by `propagator`.
    pub fn is_from(self, propagator: PropagatorId) -> bool {
        self == Cause::Inference(propagator)
    }
}

impl From<PropagatorId> for Cause {
    fn from(id: PropagatorId) -> Self {
        Cause::Inference(id)
    }
}
