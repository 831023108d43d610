use crate::core::{IntCst, IntVar};
use crate::model::lang::LinearSum;
use crate::model::ModelError;
use crate::reasoners::cp::linear::SumKind;

/// A constraint of the modeling API, to be posted with [`Manager::add`](crate::solver::Manager::add).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// `x != y + offset`
    Neq(IntVar, IntVar, IntCst),
    /// `x + offset <= y`
    LeqOffset(IntVar, IntVar, IntCst),
    /// `x = y + offset`
    EqOffset(IntVar, IntVar, IntCst),
    /// All variables take distinct values.
    AllDifferent(Vec<IntVar>),
    /// `sum <= 0` or `sum = 0`
    Linear(LinearSum, SumKind),
}

impl Constraint {
    /// Variables of the constraint, possibly with duplicates.
    pub fn variables(&self) -> Vec<IntVar> {
        match self {
            Constraint::Neq(x, y, _) | Constraint::LeqOffset(x, y, _) | Constraint::EqOffset(x, y, _) => vec![*x, *y],
            Constraint::AllDifferent(vars) => vars.clone(),
            Constraint::Linear(sum, _) => sum.terms().iter().map(|t| t.var()).collect(),
        }
    }

    /// Checks the structural requirements of the constraint.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Constraint::AllDifferent(vars) if vars.len() < 2 => Err(ModelError::Arity {
                constraint: "all_different",
                expected: "at least 2",
                actual: vars.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// `x != y`
pub fn neq(x: IntVar, y: IntVar) -> Constraint {
    Constraint::Neq(x, y, 0)
}

/// `x != y + offset`
pub fn neq_offset(x: IntVar, y: IntVar, offset: IntCst) -> Constraint {
    Constraint::Neq(x, y, offset)
}

/// `x < y`
pub fn lt(x: IntVar, y: IntVar) -> Constraint {
    Constraint::LeqOffset(x, y, 1)
}

/// `x <= y`
pub fn leq(x: IntVar, y: IntVar) -> Constraint {
    Constraint::LeqOffset(x, y, 0)
}

/// `x = y`
pub fn eq(x: IntVar, y: IntVar) -> Constraint {
    Constraint::EqOffset(x, y, 0)
}

/// `x = y + offset`
pub fn eq_offset(x: IntVar, y: IntVar, offset: IntCst) -> Constraint {
    Constraint::EqOffset(x, y, offset)
}

pub fn all_different(vars: impl IntoIterator<Item = IntVar>) -> Constraint {
    Constraint::AllDifferent(vars.into_iter().collect())
}
