use crate::core::state::{Cause, Domains, Event};
use crate::core::{cst_int_to_long, cst_long_to_int, IntCst, VarRef};
use crate::reasoners::cp::{Propagator, PropagatorId, Watches};
use crate::reasoners::Contradiction;

/// Adds `offset` to `value`, saturating at the infinity sentinels.
fn shift(value: IntCst, offset: IntCst) -> IntCst {
    cst_long_to_int(cst_int_to_long(value) + cst_int_to_long(offset))
}

/// Constraint `x = y + offset`.
///
/// Arc consistent: the domain of `x` is kept equal to the domain of `y` translated by `offset`.
/// On the removal of an interval of values from one side, the translated interval is removed
/// from the other side.
#[derive(Clone, Debug)]
pub struct EqOffset {
    x: VarRef,
    y: VarRef,
    offset: IntCst,
}

impl EqOffset {
    pub fn new(x: VarRef, y: VarRef, offset: IntCst) -> EqOffset {
        EqOffset { x, y, offset }
    }

    /// Removes from `target` all values that are not in `source` translated by `offset`.
    fn restrict(
        target: VarRef,
        source: VarRef,
        offset: IntCst,
        domains: &mut Domains,
        cause: Cause,
    ) -> Result<(), Contradiction> {
        let intervals: Vec<(IntCst, IntCst)> = domains.domain(source).intervals().collect();
        let (first, last) = (intervals[0], intervals[intervals.len() - 1]);
        domains.set_lb(target, shift(first.0, offset), cause)?;
        domains.set_ub(target, shift(last.1, offset), cause)?;
        for gap in intervals.windows(2) {
            let (lo, hi) = (gap[0].1 + 1, gap[1].0 - 1);
            domains.remove_range(target, shift(lo, offset), shift(hi, offset), cause)?;
        }
        Ok(())
    }
}

impl Propagator for EqOffset {
    fn setup(&self, id: PropagatorId, context: &mut Watches) {
        context.add_watch(self.x, id);
        context.add_watch(self.y, id);
    }

    fn propagate(&self, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        if self.x == self.y {
            return if self.offset == 0 {
                Ok(())
            } else {
                Err(Contradiction::Infeasible(cause))
            };
        }
        Self::restrict(self.x, self.y, self.offset, domains, cause)?;
        // only removes values of y without support in x, which leaves x unchanged
        Self::restrict(self.y, self.x, -self.offset, domains, cause)
    }

    fn propagate_event(&self, event: &Event, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        if self.x == self.y {
            return Ok(());
        }
        if event.var == self.x {
            let (lo, hi) = (shift(event.lo, -self.offset), shift(event.hi, -self.offset));
            domains.remove_range(self.y, lo, hi, cause)?;
        } else {
            let (lo, hi) = (shift(event.lo, self.offset), shift(event.hi, self.offset));
            domains.remove_range(self.x, lo, hi, cause)?;
        }
        Ok(())
    }

    fn variables(&self) -> Vec<VarRef> {
        vec![self.x, self.y]
    }

    fn clone_box(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}
