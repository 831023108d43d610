pub mod all_different;
pub mod eq;
pub mod leq;
pub mod linear;
pub mod neq;

mod propagator;
pub use propagator::*;

use crate::collections::ref_store::RefVec;
use crate::core::state::{Cause, Domains};
use crate::core::VarRef;
use crate::reasoners::Contradiction;

/// Propagators attached to each variable, in the order of their attachment.
#[derive(Clone, Default)]
pub struct Watches {
    propagators: RefVec<VarRef, Vec<PropagatorId>>,
    /// For each variable, number of arcs in the constraint graph, i.e. sum of `arity - 1` over
    /// the constraints involving it.
    arcs: RefVec<VarRef, u32>,
}

impl Watches {
    /// Requests a notification of `propagator_id` on every change of the domain of `watched`.
    pub fn add_watch(&mut self, watched: VarRef, propagator_id: PropagatorId) {
        self.propagators.fill_with(watched, || Vec::with_capacity(4));
        let watchers = &mut self.propagators[watched];
        if !watchers.contains(&propagator_id) {
            watchers.push(propagator_id)
        }
    }

    fn add_arcs(&mut self, var: VarRef, num_arcs: u32) {
        self.arcs.fill_with(var, || 0);
        self.arcs[var] += num_arcs;
    }

    /// Propagators to notify on a change of `var`.
    pub fn get(&self, var: VarRef) -> &[PropagatorId] {
        if self.propagators.contains(var) {
            self.propagators[var].as_slice()
        } else {
            &[]
        }
    }

    /// Number of arcs of `var` in the constraint graph.
    pub fn arc_count(&self, var: VarRef) -> u32 {
        if self.arcs.contains(var) {
            self.arcs[var]
        } else {
            0
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct Stats {
    /// Number of invocations of a propagator.
    pub num_propagations: u64,
    /// Number of invocations that failed.
    pub num_conflicts: u64,
}

/// Store of all constraints of a problem, responsible for propagating them until quiescence.
///
/// Propagation is variable-oriented: each pending event on a variable is presented, in turn, to
/// every propagator attached to that variable except the one that caused it. The event at the
/// front of the queue is fully processed before the next one is considered.
#[derive(Clone, Default)]
pub struct Cp {
    constraints: RefVec<PropagatorId, DynPropagator>,
    watches: Watches,
    pub stats: Stats,
}

impl Cp {
    pub fn new() -> Cp {
        Cp::default()
    }

    /// Registers a propagator. It is not propagated until [`Cp::propagate_constraint`] is invoked.
    pub fn add_propagator(&mut self, propagator: impl Into<DynPropagator>) -> PropagatorId {
        let propagator = propagator.into();
        let propagator_id = self.constraints.next_key();
        propagator.constraint.setup(propagator_id, &mut self.watches);
        let vars = propagator.constraint.variables();
        let num_arcs = vars.len().saturating_sub(1) as u32;
        for var in vars {
            self.watches.add_arcs(var, num_arcs);
        }
        self.constraints.push(propagator)
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraint(&self, id: PropagatorId) -> &dyn Propagator {
        self.constraints[id].constraint.as_ref()
    }

    pub fn watches(&self) -> &Watches {
        &self.watches
    }

    /// Runs the full propagation of a single constraint, without processing the resulting events.
    pub fn propagate_constraint(&mut self, id: PropagatorId, domains: &mut Domains) -> Result<(), Contradiction> {
        self.stats.num_propagations += 1;
        let res = self.constraints[id].constraint.propagate(domains, Cause::Inference(id));
        if res.is_err() {
            self.stats.num_conflicts += 1;
            domains.queue_mut().clear();
        }
        res
    }

    /// Processes all pending events until the queue is empty.
    ///
    /// On failure, the queue is cleared and the domains are left as they were when the failure
    /// was detected: it is up to the caller to restore them.
    pub fn propagate(&mut self, domains: &mut Domains) -> Result<(), Contradiction> {
        while let Some(item) = domains.queue().front().copied() {
            let watchers = self.watches.get(item.event.var);
            let mut cursor = item.cursor;
            while cursor < watchers.len() && item.event.cause.is_from(watchers[cursor]) {
                cursor += 1;
            }
            if cursor >= watchers.len() {
                // all watchers were notified of this event
                domains.queue_mut().pop_front();
                continue;
            }
            let propagator = watchers[cursor];
            if let Some(front) = domains.queue_mut().front_mut() {
                front.cursor = cursor + 1;
            }
            let constraint = self.constraints[propagator].constraint.as_ref();
            self.stats.num_propagations += 1;
            if let Err(contradiction) = constraint.propagate_event(&item.event, domains, Cause::Inference(propagator)) {
                self.stats.num_conflicts += 1;
                domains.queue_mut().clear();
                return Err(contradiction);
            }
        }
        Ok(())
    }

    /// Runs the full propagation of every constraint, then processes the resulting events.
    pub fn propagate_all(&mut self, domains: &mut Domains) -> Result<(), Contradiction> {
        for i in 0..self.constraints.len() {
            self.propagate_constraint(PropagatorId::from(i), domains)?;
        }
        self.propagate(domains)
    }
}
