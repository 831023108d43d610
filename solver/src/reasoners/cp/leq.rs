use crate::core::state::{Cause, Domains};
use crate::core::{cst_int_to_long, cst_long_to_int, IntCst, VarRef};
use crate::reasoners::cp::{Propagator, PropagatorId, Watches};
use crate::reasoners::Contradiction;

/// Constraint `x + offset <= y`. Strict inequalities use an offset of 1.
///
/// Bounds consistent. A single pass reaches the fixpoint: tightening the upper bound of `x`
/// cannot change its lower bound, which is the only one used to tighten `y`.
#[derive(Clone, Debug)]
pub struct LeqOffset {
    x: VarRef,
    y: VarRef,
    offset: IntCst,
}

impl LeqOffset {
    pub fn new(x: VarRef, y: VarRef, offset: IntCst) -> LeqOffset {
        LeqOffset { x, y, offset }
    }
}

impl Propagator for LeqOffset {
    fn setup(&self, id: PropagatorId, context: &mut Watches) {
        context.add_watch(self.x, id);
        context.add_watch(self.y, id);
    }

    fn propagate(&self, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        if self.x == self.y {
            return if self.offset <= 0 {
                Ok(())
            } else {
                Err(Contradiction::Infeasible(cause))
            };
        }
        let offset = cst_int_to_long(self.offset);
        let x_ub = cst_long_to_int(cst_int_to_long(domains.ub(self.y)) - offset);
        domains.set_ub(self.x, x_ub, cause)?;
        let y_lb = cst_long_to_int(cst_int_to_long(domains.lb(self.x)) + offset);
        domains.set_lb(self.y, y_lb, cause)?;
        Ok(())
    }

    fn variables(&self) -> Vec<VarRef> {
        vec![self.x, self.y]
    }

    fn clone_box(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_domains_are_left_unchanged() {
        let mut d = Domains::new();
        let x = d.new_var(1, 3);
        let y = d.new_var(5, 7);
        let lt = LeqOffset::new(x, y, 1);
        assert!(lt.propagate(&mut d, Cause::Decision).is_ok());
        assert_eq!(d.bounds(x), (1, 3));
        assert_eq!(d.bounds(y), (5, 7));
        assert!(d.queue().is_empty());
    }

    #[test]
    fn bounds() {
        let mut d = Domains::new();
        let x = d.new_var(0, 10);
        let y = d.new_var(-5, 5);
        let c = LeqOffset::new(x, y, 2);
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        assert_eq!(d.bounds(x), (0, 3));
        assert_eq!(d.bounds(y), (2, 5));

        // holes are skipped over
        d.remove(y, 5, Cause::Decision).unwrap();
        d.remove(x, 2, Cause::Decision).unwrap();
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        assert_eq!(d.bounds(x), (0, 1));

        d.set_lb(x, 1, Cause::Decision).unwrap();
        d.set_ub(y, 2, Cause::Decision).unwrap();
        assert!(c.propagate(&mut d, Cause::Decision).is_err());
    }
}
