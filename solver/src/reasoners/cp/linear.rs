use crate::core::state::{Cause, Domains, InvalidUpdate};
use crate::core::{cst_int_to_long, IntCst, LongCst, VarRef, INT_CST_MAX, INT_CST_MIN};
use crate::reasoners::cp::{Propagator, PropagatorId, Watches};
use crate::reasoners::Contradiction;
use itertools::Itertools;
use num_integer::{div_ceil, div_floor};
use std::cmp::Ordering;

/// A term `factor * var` of a linear constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SumElem {
    pub factor: IntCst,
    pub var: VarRef,
}

impl std::fmt::Display for SumElem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.factor {
            1 => write!(f, "{:?}", self.var),
            c if c < 0 => write!(f, "({c})*{:?}", self.var),
            c => write!(f, "{c}*{:?}", self.var),
        }
    }
}

impl SumElem {
    pub fn new(factor: IntCst, var: VarRef) -> SumElem {
        SumElem { factor, var }
    }

    fn negated(self) -> SumElem {
        SumElem::new(-self.factor, self.var)
    }

    /// Smallest value the term can take.
    fn min(self, domains: &Domains) -> LongCst {
        let bound = match self.factor.cmp(&0) {
            Ordering::Less => domains.ub(self.var),
            Ordering::Equal => 0,
            Ordering::Greater => domains.lb(self.var),
        };
        cst_int_to_long(bound).saturating_mul(cst_int_to_long(self.factor))
    }

    /// Largest value the term can take.
    fn max(self, domains: &Domains) -> LongCst {
        let bound = match self.factor.cmp(&0) {
            Ordering::Less => domains.lb(self.var),
            Ordering::Equal => 0,
            Ordering::Greater => domains.ub(self.var),
        };
        cst_int_to_long(bound).saturating_mul(cst_int_to_long(self.factor))
    }

    /// Restricts the variable so that the term is at most `limit`.
    fn restrict_to(self, limit: LongCst, domains: &mut Domains, cause: Cause) -> Result<bool, InvalidUpdate> {
        let factor = cst_int_to_long(self.factor);
        match self.factor.cmp(&0) {
            // var >= ceil(limit / factor)
            Ordering::Less => domains.set_lb(self.var, to_cst(div_ceil(limit, factor)), cause),
            Ordering::Equal => Ok(false),
            // var <= floor(limit / factor)
            Ordering::Greater => domains.set_ub(self.var, to_cst(div_floor(limit, factor)), cause),
        }
    }
}

fn to_cst(value: LongCst) -> IntCst {
    value.clamp(INT_CST_MIN as LongCst, INT_CST_MAX as LongCst) as IntCst
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SumKind {
    Leq,
    Eq,
}

/// Linear constraint `sum(factor_i * var_i) <= rhs`, or `sum(factor_i * var_i) = rhs`.
///
/// Bounds consistent. Each pass caps every term with the slack left by the minimum of the others
/// (and, for an equality, does the same on the negated sum), until a pass changes nothing.
#[derive(Clone, Debug)]
pub struct LinearPropagator {
    pub elements: Vec<SumElem>,
    pub rhs: IntCst,
    pub kind: SumKind,
}

impl std::fmt::Display for LinearPropagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.elements.is_empty() {
            write!(f, "0")?;
        } else {
            write!(f, "{}", self.elements.iter().format(" + "))?;
        }
        match self.kind {
            SumKind::Leq => write!(f, " <= {}", self.rhs),
            SumKind::Eq => write!(f, " = {}", self.rhs),
        }
    }
}

impl LinearPropagator {
    pub fn leq(elements: Vec<SumElem>, rhs: IntCst) -> LinearPropagator {
        LinearPropagator {
            elements,
            rhs,
            kind: SumKind::Leq,
        }
    }

    pub fn eq(elements: Vec<SumElem>, rhs: IntCst) -> LinearPropagator {
        LinearPropagator {
            elements,
            rhs,
            kind: SumKind::Eq,
        }
    }

    /// One pass on `sum(terms) <= rhs`. Returns true if a domain was modified.
    fn tighten(
        terms: impl Iterator<Item = SumElem> + Clone,
        rhs: LongCst,
        domains: &mut Domains,
        cause: Cause,
    ) -> Result<bool, Contradiction> {
        let min_sum = terms.clone().map(|t| t.min(domains)).fold(0, LongCst::saturating_add);
        let slack = rhs.saturating_sub(min_sum);
        if slack < 0 {
            return Err(Contradiction::Infeasible(cause));
        }
        let mut changed = false;
        for t in terms {
            let min = t.min(domains);
            debug_assert!(min <= t.max(domains));
            if t.max(domains).saturating_sub(min) > slack {
                changed |= t.restrict_to(min + slack, domains, cause)?;
            }
        }
        Ok(changed)
    }
}

impl Propagator for LinearPropagator {
    fn setup(&self, id: PropagatorId, context: &mut Watches) {
        for e in self.elements.iter().filter(|e| e.factor != 0) {
            context.add_watch(e.var, id);
        }
    }

    fn propagate(&self, domains: &mut Domains, cause: Cause) -> Result<(), Contradiction> {
        let rhs = cst_int_to_long(self.rhs);
        loop {
            let mut changed = Self::tighten(self.elements.iter().copied(), rhs, domains, cause)?;
            if self.kind == SumKind::Eq {
                let negated = self.elements.iter().map(|e| e.negated());
                changed |= Self::tighten(negated, -rhs, domains, cause)?;
            }
            if !changed {
                return Ok(());
            }
        }
    }

    fn variables(&self) -> Vec<VarRef> {
        self.elements.iter().map(|e| e.var).collect()
    }

    fn clone_box(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(factor: IntCst, lb: IntCst, ub: IntCst, d: &mut Domains) -> SumElem {
        SumElem::new(factor, d.new_var(lb, ub))
    }

    fn range(t: SumElem, d: &Domains) -> (LongCst, LongCst) {
        (t.min(d), t.max(d))
    }

    #[test]
    fn term_restriction() {
        let mut d = Domains::new();
        let t = term(2, -100, 100, &mut d);
        assert_eq!(range(t, &d), (-200, 200));
        assert_eq!(t.restrict_to(51, &mut d, Cause::Decision), Ok(true));
        assert_eq!(range(t, &d), (-200, 50));
        assert_eq!(t.restrict_to(50, &mut d, Cause::Decision), Ok(false));

        let t = term(-3, -100, 100, &mut d);
        assert_eq!(t.restrict_to(-10, &mut d, Cause::Decision), Ok(true));
        // -3 * x <= -10  <=>  x >= 4
        assert_eq!(d.lb(t.var), 4);
        assert_eq!(range(t, &d), (-300, -12));
    }

    #[test]
    fn single_term() {
        // 2x <= 7
        let mut d = Domains::new();
        let x = term(2, -100, 100, &mut d);
        let c = LinearPropagator::leq(vec![x], 7);
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        assert_eq!(d.bounds(x.var), (-100, 3));
    }

    #[test]
    fn mixed_factors() {
        // 2x - 3y + 0z <= -15
        let mut d = Domains::new();
        let x = term(2, -100, 100, &mut d);
        let y = term(-3, -100, 100, &mut d);
        let z = term(0, -100, 100, &mut d);
        let c = LinearPropagator::leq(vec![x, y, z], -15);
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        assert_eq!(d.bounds(x.var), (-100, 100));
        assert_eq!(d.bounds(y.var), (-61, 100));
        assert_eq!(d.bounds(z.var), (-100, 100));

        let mut watches = Watches::default();
        c.setup(PropagatorId::from_u32(0), &mut watches);
        assert!(watches.get(z.var).is_empty());
        assert_eq!(c.arity(), 3);
    }

    #[test]
    fn equality() {
        // x + y = 10
        let mut d = Domains::new();
        let x = term(1, 0, 3, &mut d);
        let y = term(1, 0, 10, &mut d);
        let c = LinearPropagator::eq(vec![x, y], 10);
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        assert_eq!(d.bounds(x.var), (0, 3));
        assert_eq!(d.bounds(y.var), (7, 10));

        d.remove(y.var, 10, Cause::Decision).unwrap();
        d.remove(y.var, 7, Cause::Decision).unwrap();
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        assert_eq!(d.bounds(x.var), (1, 2));
        assert_eq!(d.bounds(y.var), (8, 9));
    }

    #[test]
    fn equality_reaches_fixpoint() {
        // x - y + z = 0
        let mut d = Domains::new();
        let x = term(1, 0, 5, &mut d);
        let y = term(-1, 0, 5, &mut d);
        let z = term(1, 0, 10, &mut d);
        let c = LinearPropagator::eq(vec![x, y, z], 0);
        d.set_lb(x.var, 3, Cause::Decision).unwrap();
        d.set_ub(y.var, 4, Cause::Decision).unwrap();
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        assert_eq!(d.bounds(x.var), (3, 4));
        assert_eq!(d.bounds(y.var), (3, 4));
        assert_eq!(d.bounds(z.var), (0, 1));
        let before = d.clone();
        assert!(c.propagate(&mut d, Cause::Decision).is_ok());
        for v in [x.var, y.var, z.var] {
            assert_eq!(d.domain(v), before.domain(v));
        }
    }

    #[test]
    fn infeasible() {
        let mut d = Domains::new();
        let x = term(1, 5, 10, &mut d);
        let c = LinearPropagator::leq(vec![x], 4);
        assert_eq!(c.propagate(&mut d, Cause::Decision), Err(Contradiction::Infeasible(Cause::Decision)));
        assert_eq!(d.bounds(x.var), (5, 10));
        assert_eq!(c.to_string(), "var0 <= 4");
        let c = LinearPropagator::eq(vec![x, term(-2, 0, 1, &mut d)], 3);
        assert_eq!(c.to_string(), "var0 + (-2)*var1 = 3");
    }
}
