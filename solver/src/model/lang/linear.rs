use crate::core::{IntCst, IntVar};
use crate::model::lang::Constraint;
use crate::reasoners::cp::linear::SumKind;
use std::collections::BTreeMap;

/// A linear term of the form `a * X` where `a` is a constant and `X` is a variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinearTerm {
    factor: IntCst,
    var: IntVar,
}

impl LinearTerm {
    pub const fn new(factor: IntCst, var: IntVar) -> LinearTerm {
        LinearTerm { factor, var }
    }

    pub fn factor(&self) -> IntCst {
        self.factor
    }

    pub fn var(&self) -> IntVar {
        self.var
    }
}

impl From<IntVar> for LinearTerm {
    fn from(var: IntVar) -> Self {
        LinearTerm::new(1, var)
    }
}

impl std::ops::Neg for LinearTerm {
    type Output = LinearTerm;

    fn neg(self) -> Self::Output {
        LinearTerm {
            factor: -self.factor,
            var: self.var,
        }
    }
}

/// A linear sum of the form `a1 * X1 + a2 * X2 + ... + Y` where `ai` and `Y` are constants and `Xi` is a variable.
///
/// Sums are built with the usual operators:
/// ```
/// use fdsolve::prelude::*;
/// let mut m = Manager::new();
/// let x = m.new_var(0, 10);
/// let y = m.new_var(0, 10);
/// let sum = x * 2 - y + 3;
/// assert_eq!(sum.get_constant(), 3);
/// m.add(sum.leq(10));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearSum {
    terms: Vec<LinearTerm>,
    constant: IntCst,
}

impl LinearSum {
    pub fn zero() -> LinearSum {
        LinearSum::default()
    }

    pub fn constant(n: IntCst) -> LinearSum {
        Self::zero() + n
    }

    /// Sum of all elements.
    pub fn of<T: Into<LinearSum>>(elements: impl IntoIterator<Item = T>) -> LinearSum {
        elements.into_iter().fold(Self::zero(), |sum, e| sum + e)
    }

    /// Sum of `factor_i * var_i`.
    pub fn weighted(terms: impl IntoIterator<Item = (IntCst, IntVar)>) -> LinearSum {
        LinearSum {
            terms: terms.into_iter().map(|(f, v)| LinearTerm::new(f, v)).collect(),
            constant: 0,
        }
    }

    pub fn leq<T: Into<LinearSum>>(self, upper_bound: T) -> Constraint {
        Constraint::Linear(self - upper_bound, SumKind::Leq)
    }

    pub fn geq<T: Into<LinearSum>>(self, lower_bound: T) -> Constraint {
        (-self).leq(-lower_bound.into())
    }

    pub fn eq<T: Into<LinearSum>>(self, value: T) -> Constraint {
        Constraint::Linear(self - value, SumKind::Eq)
    }

    pub fn get_constant(&self) -> IntCst {
        self.constant
    }

    pub fn terms(&self) -> &[LinearTerm] {
        self.terms.as_ref()
    }

    /// Equivalent sum in which each variable appears at most once, with a non-zero factor.
    /// Variables are sorted by index.
    pub fn simplify(&self) -> LinearSum {
        let mut vars = BTreeMap::new();
        for e in &self.terms {
            vars.entry(e.var).and_modify(|factor| *factor += e.factor).or_insert(e.factor);
        }
        LinearSum {
            terms: vars
                .into_iter()
                .filter(|&(_, factor)| factor != 0)
                .map(|(var, factor)| LinearTerm::new(factor, var))
                .collect(),
            constant: self.constant,
        }
    }

    /// If the simplified sum has the form `X + c`, returns `(X, c)`.
    pub fn as_offset(&self) -> Option<(IntVar, IntCst)> {
        match self.simplify().terms.as_slice() {
            [t] if t.factor == 1 => Some((t.var, self.constant)),
            _ => None,
        }
    }
}

impl From<LinearTerm> for LinearSum {
    fn from(term: LinearTerm) -> Self {
        LinearSum {
            terms: vec![term],
            constant: 0,
        }
    }
}

impl From<IntCst> for LinearSum {
    fn from(constant: IntCst) -> Self {
        LinearSum {
            terms: Vec::new(),
            constant,
        }
    }
}

impl From<IntVar> for LinearSum {
    fn from(var: IntVar) -> Self {
        LinearTerm::from(var).into()
    }
}

impl<T: Into<LinearSum>> std::ops::Add<T> for LinearSum {
    type Output = LinearSum;

    fn add(mut self, rhs: T) -> Self::Output {
        self += rhs;
        self
    }
}

impl<T: Into<LinearSum>> std::ops::Sub<T> for LinearSum {
    type Output = LinearSum;

    fn sub(mut self, rhs: T) -> Self::Output {
        self -= rhs;
        self
    }
}

impl<T: Into<LinearSum>> std::ops::AddAssign<T> for LinearSum {
    fn add_assign(&mut self, rhs: T) {
        let rhs: LinearSum = rhs.into();
        self.terms.extend(&rhs.terms);
        self.constant += rhs.constant;
    }
}

impl<T: Into<LinearSum>> std::ops::SubAssign<T> for LinearSum {
    fn sub_assign(&mut self, rhs: T) {
        let sum: LinearSum = -rhs.into();
        *self += sum;
    }
}

impl std::ops::Neg for LinearSum {
    type Output = LinearSum;

    fn neg(mut self) -> Self::Output {
        for e in &mut self.terms {
            *e = -(*e)
        }
        self.constant = -self.constant;
        self
    }
}

impl std::ops::Mul<IntCst> for LinearSum {
    type Output = LinearSum;

    fn mul(mut self, factor: IntCst) -> Self::Output {
        for e in &mut self.terms {
            e.factor *= factor;
        }
        self.constant *= factor;
        self
    }
}

impl<T: Into<LinearSum>> std::ops::Add<T> for IntVar {
    type Output = LinearSum;

    fn add(self, rhs: T) -> Self::Output {
        LinearSum::from(self) + rhs
    }
}

impl<T: Into<LinearSum>> std::ops::Sub<T> for IntVar {
    type Output = LinearSum;

    fn sub(self, rhs: T) -> Self::Output {
        LinearSum::from(self) - rhs
    }
}

impl std::ops::Neg for IntVar {
    type Output = LinearSum;

    fn neg(self) -> Self::Output {
        -LinearSum::from(self)
    }
}

impl std::ops::Mul<IntCst> for IntVar {
    type Output = LinearSum;

    fn mul(self, factor: IntCst) -> Self::Output {
        LinearTerm::new(factor, self).into()
    }
}

impl std::ops::Mul<IntVar> for IntCst {
    type Output = LinearSum;

    fn mul(self, var: IntVar) -> Self::Output {
        var * self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ManagerId, VarRef};

    fn vars() -> (IntVar, IntVar) {
        let m = ManagerId::fresh();
        (IntVar::new(VarRef::from_u32(0), m), IntVar::new(VarRef::from_u32(1), m))
    }

    #[test]
    fn operators() {
        let (x, y) = vars();
        let sum = x * 3 + y - 4 - x + 2 * y;
        assert_eq!(sum.get_constant(), -4);
        assert_eq!(sum.terms().len(), 4);
        let simplified = sum.simplify();
        assert_eq!(simplified.terms(), &[LinearTerm::new(2, x), LinearTerm::new(3, y)]);
        assert_eq!(simplified.get_constant(), -4);

        let neg = -(x - y) * 2;
        assert_eq!(neg.simplify().terms(), &[LinearTerm::new(-2, x), LinearTerm::new(2, y)]);
    }

    #[test]
    fn offsets() {
        let (x, y) = vars();
        assert_eq!((x + 3).as_offset(), Some((x, 3)));
        assert_eq!((x + y - y - 1).as_offset(), Some((x, -1)));
        assert_eq!((x * 2).as_offset(), None);
        assert_eq!((x + y).as_offset(), None);
        assert_eq!(LinearSum::constant(4).as_offset(), None);
    }

    #[test]
    fn constraints() {
        let (x, y) = vars();
        assert_eq!((x + y).leq(5), Constraint::Linear(x + y - 5, SumKind::Leq));
        assert_eq!((x + y).geq(y), Constraint::Linear(-x - y + y + 0, SumKind::Leq));
        assert_eq!(LinearSum::of([x, y]).eq(2), Constraint::Linear(x + y - 2, SumKind::Eq));
    }
}
