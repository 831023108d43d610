use crate::core::state::{Cause, Domains, Event};
use crate::core::{cst_int_to_long, cst_long_to_int, IntCst, VarRef};
use crate::reasoners::cp::{Propagator, PropagatorId, Watches};
use crate::reasoners::Contradiction;

/// Constraint `x != y + offset`.
///
/// Arc consistent: it only prunes once one of the two variables is bound.
#[derive(Clone, Debug)]
pub struct Neq {
    x: VarRef,
    y: VarRef,
    offset: IntCst,
}

impl Neq {
    pub fn new(x: VarRef, y: VarRef, offset: IntCst) -> Neq {
        Neq { x, y, offset }
    }

    /// Removes from `y` the value forbidden by `x` being bound.
    fn from_x(&self, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        if let Some(vx) = domains.value(self.x) {
            let forbidden = cst_long_to_int(cst_int_to_long(vx) - cst_int_to_long(self.offset));
            domains.remove(self.y, forbidden, cause)?;
        }
        Ok(())
    }

    /// Removes from `x` the value forbidden by `y` being bound.
    fn from_y(&self, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        if let Some(vy) = domains.value(self.y) {
            let forbidden = cst_long_to_int(cst_int_to_long(vy) + cst_int_to_long(self.offset));
            domains.remove(self.x, forbidden, cause)?;
        }
        Ok(())
    }
}

impl Propagator for Neq {
    fn setup(&self, id: PropagatorId, context: &mut Watches) {
        context.add_watch(self.x, id);
        context.add_watch(self.y, id);
    }

    fn propagate(&self, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        if self.x == self.y {
            return if self.offset == 0 {
                Err(Contradiction::Infeasible(cause))
            } else {
                Ok(())
            };
        }
        self.from_x(domains, cause)?;
        self.from_y(domains, cause)
    }

    fn propagate_event(&self, event: &Event, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        if self.x == self.y {
            Ok(())
        } else if event.var == self.x {
            self.from_x(domains, cause)
        } else {
            self.from_y(domains, cause)
        }
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
    use crate::core::state::InvalidUpdate;

    #[test]
    fn prunes_when_bound() {
        let mut d = Domains::new();
        let x = d.new_var(0, 5);
        let y = d.new_var(0, 5);
        let c = Neq::new(x, y, 2);
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        assert_eq!(d.size(x), 6);
        assert_eq!(d.size(y), 6);

        d.set(y, 1, Cause::Decision).unwrap();
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        assert!(!d.contains(x, 3));
        assert_eq!(d.size(x), 5);

        d.set(x, 5, Cause::Decision).unwrap();
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
    }

    #[test]
    fn conflict() {
        let mut d = Domains::new();
        let x = d.new_var(3, 3);
        let y = d.new_var(4, 4);
        let c = Neq::new(x, y, -1);
        assert_eq!(
            c.propagate(&mut d, Cause::Decision),
            Err(Contradiction::InvalidUpdate(InvalidUpdate(y, Cause::Decision)))
        );
        assert_eq!(Neq::new(x, x, 0).propagate(&mut d, Cause::Decision), Err(Contradiction::Infeasible(Cause::Decision)));
        assert_eq!(Neq::new(x, x, 1).propagate(&mut d, Cause::Decision), Ok(()));
    }
}
