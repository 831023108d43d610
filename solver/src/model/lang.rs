//! Expressions and constraints of the modeling API.

pub mod expr;
pub mod linear;

pub use expr::*;
pub use linear::{LinearSum, LinearTerm};
