use crate::core::state::{Cause, Domains};
use crate::core::IntVar;
use crate::reasoners::Contradiction;
use crate::solver::goal::{Goal, GoalStep};

/// Value tried first when instantiating a variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueOrder {
    Min,
    Max,
}

/// Order in which variables are instantiated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VarOrder {
    /// First unbound variable, in the order given.
    Lexical,
    /// Unbound variable with the smallest domain, ties broken by the order given.
    FirstFail,
}

/// Binds `var` by a sequence of binary choices: either `var = v` or `var != v` and retry,
/// where `v` is the smallest or largest value of the domain.
pub fn instantiate(var: IntVar, order: ValueOrder) -> Goal {
    Goal::leaf(Instantiate { var, order })
}

/// Binds all variables, one at a time.
pub fn label(vars: impl IntoIterator<Item = IntVar>, var_order: VarOrder, value_order: ValueOrder) -> Goal {
    Goal::leaf(Label {
        vars: vars.into_iter().collect(),
        var_order,
        value_order,
    })
}

#[derive(Clone)]
struct Instantiate {
    var: IntVar,
    order: ValueOrder,
}

impl GoalStep for Instantiate {
    fn execute(self: Box<Self>, domains: &mut Domains) -> Result<Option<Goal>, Contradiction> {
        let var = self.var.var_ref();
        if domains.is_bound(var) {
            return Ok(None);
        }
        let value = match self.order {
            ValueOrder::Min => domains.lb(var),
            ValueOrder::Max => domains.ub(var),
        };
        let assign = Goal::from_fn(move |d: &mut Domains| {
            d.set(var, value, Cause::Decision)?;
            Ok(None)
        });
        let refute = Goal::from_fn(move |d: &mut Domains| {
            d.remove(var, value, Cause::Decision)?;
            Ok(None)
        });
        Ok(Some(Goal::or(assign, Goal::and(refute, Goal::Leaf(self)))))
    }

    fn clone_box(&self) -> Box<dyn GoalStep> {
        Box::new(self.clone())
    }

    fn variables(&self) -> Vec<IntVar> {
        vec![self.var]
    }
}

#[derive(Clone)]
struct Label {
    vars: Vec<IntVar>,
    var_order: VarOrder,
    value_order: ValueOrder,
}

impl Label {
    fn select(&self, domains: &Domains) -> Option<IntVar> {
        let mut unbound = self.vars.iter().copied().filter(|v| !domains.is_bound(v.var_ref()));
        match self.var_order {
            VarOrder::Lexical => unbound.next(),
            VarOrder::FirstFail => unbound.min_by_key(|v| domains.size(v.var_ref())),
        }
    }
}

impl GoalStep for Label {
    fn execute(self: Box<Self>, domains: &mut Domains) -> Result<Option<Goal>, Contradiction> {
        match self.select(domains) {
            None => Ok(None),
            Some(var) => {
                let first = Goal::leaf(Instantiate {
                    var,
                    order: self.value_order,
                });
                Ok(Some(Goal::and(first, Goal::Leaf(self))))
            }
        }
    }

    fn clone_box(&self) -> Box<dyn GoalStep> {
        Box::new(self.clone())
    }

    fn variables(&self) -> Vec<IntVar> {
        self.vars.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ManagerId, VarRef};

    fn handles(vars: &[VarRef]) -> Vec<IntVar> {
        let owner = ManagerId::fresh();
        vars.iter().map(|&v| IntVar::new(v, owner)).collect()
    }

    fn label_of(vars: &[VarRef], var_order: VarOrder) -> Label {
        Label {
            vars: handles(vars),
            var_order,
            value_order: ValueOrder::Min,
        }
    }

    #[test]
    fn variable_selection() {
        let mut d = Domains::new();
        let a = d.new_var(0, 10);
        let b = d.new_var(0, 3);
        let c = d.new_var(5, 5);
        let e = d.new_var(0, 3);
        let vars = [c, a, b, e];
        let selected = |order| label_of(&vars, order).select(&d).map(IntVar::var_ref);
        assert_eq!(selected(VarOrder::Lexical), Some(a));
        assert_eq!(selected(VarOrder::FirstFail), Some(b));
        d.set(b, 1, Cause::Decision).unwrap();
        let selected = |order| label_of(&vars, order).select(&d).map(IntVar::var_ref);
        assert_eq!(selected(VarOrder::FirstFail), Some(e));
        d.set(a, 1, Cause::Decision).unwrap();
        d.set(e, 1, Cause::Decision).unwrap();
        assert!(label_of(&vars, VarOrder::Lexical).select(&d).is_none());
        let label = label_of(&vars, VarOrder::Lexical);
        assert_eq!(label.variables(), label.vars);
    }

    #[test]
    fn instantiation_choices() {
        let mut d = Domains::new();
        let x = d.new_var(2, 4);
        let step = Box::new(Instantiate {
            var: handles(&[x])[0],
            order: ValueOrder::Max,
        });
        let Some(Goal::Or(assign, refute)) = step.clone().execute(&mut d).unwrap() else {
            panic!("expected a choice")
        };
        let Goal::Leaf(assign) = *assign else { panic!() };
        let mut d1 = d.clone();
        assert!(assign.execute(&mut d1).unwrap().is_none());
        assert_eq!(d1.value(x), Some(4));

        let Goal::And(refute, retry) = *refute else { panic!() };
        let Goal::Leaf(refute) = *refute else { panic!() };
        assert!(refute.execute(&mut d).unwrap().is_none());
        assert_eq!(d.bounds(x), (2, 3));
        assert!(matches!(*retry, Goal::Leaf(_)));

        d.set(x, 3, Cause::Decision).unwrap();
        assert!(step.execute(&mut d).unwrap().is_none());
    }
}
