use crate::core::state::{Cause, Domains};
use crate::core::IntVar;
use crate::reasoners::Contradiction;
use std::fmt::{Debug, Formatter};

/// A unit of search work.
///
///  - `And(g1, g2)` runs `g1` then `g2` in the same branch.
///  - `Or(g1, g2)` opens a choice point: `g1` is tried first and `g2` is the alternative run after
///    backtracking.
///  - `Leaf(step)` runs arbitrary code on the domains, possibly producing a continuation.
pub enum Goal {
    And(Box<Goal>, Box<Goal>),
    Or(Box<Goal>, Box<Goal>),
    Leaf(Box<dyn GoalStep>),
}

/// Code executed by a [`Goal::Leaf`].
///
/// A step may only modify the domains through the trail-aware operations of [`Domains`].
/// It returns `Ok(None)` exactly when no work remains and `Ok(Some(goal))` to be replaced by `goal`.
/// An `Err` is a dead end of the search and triggers a backtrack.
pub trait GoalStep: Send {
    fn execute(self: Box<Self>, domains: &mut Domains) -> Result<Option<Goal>, Contradiction>;

    fn clone_box(&self) -> Box<dyn GoalStep>;

    /// Handles of the variables the step operates on, checked against the manager running it.
    fn variables(&self) -> Vec<IntVar> {
        Vec::new()
    }
}

impl Goal {
    pub fn and(first: Goal, second: Goal) -> Goal {
        Goal::And(Box::new(first), Box::new(second))
    }

    pub fn or(first: Goal, alternative: Goal) -> Goal {
        Goal::Or(Box::new(first), Box::new(alternative))
    }

    pub fn leaf(step: impl GoalStep + 'static) -> Goal {
        Goal::Leaf(Box::new(step))
    }

    /// A leaf running the given closure.
    pub fn from_fn<F>(f: F) -> Goal
    where
        F: FnOnce(&mut Domains) -> Result<Option<Goal>, Contradiction> + Clone + Send + 'static,
    {
        Goal::leaf(FnStep(f))
    }

    /// Runs all goals in sequence. An empty sequence succeeds immediately.
    pub fn all(goals: impl IntoIterator<Item = Goal>) -> Goal {
        let goals: Vec<Goal> = goals.into_iter().collect();
        goals
            .into_iter()
            .rev()
            .reduce(|rest, g| Goal::and(g, rest))
            .unwrap_or_else(Goal::success)
    }

    /// A goal with no effect.
    pub fn success() -> Goal {
        Goal::from_fn(|_| Ok(None))
    }

    /// Handles of all variables referenced by the leaves of this goal.
    pub fn variables(&self) -> Vec<IntVar> {
        let mut vars = Vec::new();
        let mut stack = vec![self];
        while let Some(goal) = stack.pop() {
            match goal {
                Goal::And(a, b) | Goal::Or(a, b) => {
                    stack.push(b);
                    stack.push(a);
                }
                Goal::Leaf(step) => vars.extend(step.variables()),
            }
        }
        vars
    }

    /// A goal that always fails.
    pub fn failure() -> Goal {
        Goal::from_fn(|_| Err(Contradiction::Infeasible(Cause::Decision)))
    }
}

impl Clone for Goal {
    fn clone(&self) -> Self {
        match self {
            Goal::And(a, b) => Goal::And(a.clone(), b.clone()),
            Goal::Or(a, b) => Goal::Or(a.clone(), b.clone()),
            Goal::Leaf(step) => Goal::Leaf(step.clone_box()),
        }
    }
}

impl Debug for Goal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Goal::And(a, b) => write!(f, "and({a:?}, {b:?})"),
            Goal::Or(a, b) => write!(f, "or({a:?}, {b:?})"),
            Goal::Leaf(_) => write!(f, "leaf"),
        }
    }
}

#[derive(Clone)]
struct FnStep<F>(F);

impl<F> GoalStep for FnStep<F>
where
    F: FnOnce(&mut Domains) -> Result<Option<Goal>, Contradiction> + Clone + Send + 'static,
{
    fn execute(self: Box<Self>, domains: &mut Domains) -> Result<Option<Goal>, Contradiction> {
        (self.0)(domains)
    }

    fn clone_box(&self) -> Box<dyn GoalStep> {
        Box::new(self.clone())
    }
}
