//! Module that re-export most commonly used types and traits to ease import.

pub use crate::backtrack::Backtrack;
pub use crate::core::state::{Cause, Domains};
pub use crate::core::{Domain, IntCst, IntVar, VarRef};
pub use crate::model::lang::*;
pub use crate::model::ModelError;
pub use crate::reasoners::Contradiction;
pub use crate::solver::goal::{Goal, GoalStep};
pub use crate::solver::search::{instantiate, label, ValueOrder, VarOrder};
pub use crate::solver::{Manager, SearchResult};
