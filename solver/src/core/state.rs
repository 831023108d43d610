mod cause;
mod domains;
mod event;
mod queue;

pub use cause::*;
pub use domains::*;
pub use event::*;
pub use queue::*;

use crate::core::VarRef;

/// Represents a triggered event of emptying the domain of a variable.
/// The second field is the cause of the rejected update.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct InvalidUpdate(pub VarRef, pub Cause);
