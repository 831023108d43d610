mod errors;
pub mod lang;

pub use errors::*;
