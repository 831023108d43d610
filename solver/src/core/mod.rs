pub use cst::*;
pub use domain::*;
pub use variable::*;

mod cst;
mod domain;
pub mod state;
mod variable;
