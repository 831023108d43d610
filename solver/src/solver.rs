pub mod goal;
pub mod limits;
pub mod search;
pub mod stats;
mod solver_impl;

pub use solver_impl::*;
