//! Finite-domain constraint solver.
//!
//! Variables have finite integer domains represented as bitsets. Constraints remove values that
//! cannot be part of a solution, reacting to each removal through an AC-5 propagation queue.
//! Search is described by a tree of goals and explored depth-first, with all domain changes undone
//! on backtrack from a trail.

pub mod backtrack;
pub mod collections;
pub mod core;
pub mod model;
pub mod prelude;
pub mod reasoners;
pub mod solver;
