use crate::core::state::{Cause, Domains, Event};
use crate::core::{cst_int_to_long, LongCst, VarRef};
use crate::reasoners::cp::{Propagator, PropagatorId, Watches};
use crate::reasoners::Contradiction;

/// Constraint stating that all variables take pairwise distinct values.
///
/// The value of each bound variable is removed from all others. Variables bound as a result
/// are processed in the same call, since the propagator is not notified of its own removals.
/// It additionally checks that the union of the bounds has enough values for all variables.
#[derive(Clone, Debug)]
pub struct AllDifferent {
    vars: Vec<VarRef>,
}

impl AllDifferent {
    pub fn new(vars: Vec<VarRef>) -> AllDifferent {
        AllDifferent { vars }
    }

    /// Removes the values of the variables at the given positions (that must be bound) from all
    /// other variables, then does the same for every variable that becomes bound.
    fn remove_bound_values(
        &self,
        mut pending: Vec<usize>,
        domains: &mut Domains,
        cause: Cause,
    ) -> Result<(), Contradiction> {
        let mut done = vec![false; self.vars.len()];
        while let Some(i) = pending.pop() {
            if done[i] {
                continue;
            }
            done[i] = true;
            let Some(value) = domains.value(self.vars[i]) else {
                continue;
            };
            for (j, &other) in self.vars.iter().enumerate() {
                if j != i && domains.remove(other, value, cause)? && domains.is_bound(other) {
                    pending.push(j);
                }
            }
        }
        Ok(())
    }
}

impl AllDifferent {
    /// Fails if the union of the bounds has fewer values than there are variables.
    fn check_span(&self, domains: &Domains, cause: Cause) -> Result<(), Contradiction> {
        let lb = self.vars.iter().map(|&v| domains.lb(v)).min().unwrap_or_default();
        let ub = self.vars.iter().map(|&v| domains.ub(v)).max().unwrap_or_default();
        if !self.vars.is_empty() && cst_int_to_long(ub) - cst_int_to_long(lb) + 1 < self.vars.len() as LongCst {
            Err(Contradiction::Infeasible(cause))
        } else {
            Ok(())
        }
    }
}

impl Propagator for AllDifferent {
    fn setup(&self, id: PropagatorId, context: &mut Watches) {
        for &v in &self.vars {
            context.add_watch(v, id);
        }
    }

    fn propagate(&self, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        let bound = (0..self.vars.len()).filter(|&i| domains.is_bound(self.vars[i])).collect();
        self.remove_bound_values(bound, domains, cause)?;
        self.check_span(domains, cause)
    }

    fn propagate_event(&self, event: &Event, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        if domains.is_bound(event.var) {
            let positions = (0..self.vars.len()).filter(|&i| self.vars[i] == event.var).collect();
            self.remove_bound_values(positions, domains, cause)?;
        }
        self.check_span(domains, cause)
    }

    fn variables(&self) -> Vec<VarRef> {
        self.vars.clone()
    }

    fn clone_box(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}
