//! Save points and undo logs.
//!
//! The search opens a save point for each choice point and undoes every change recorded since
//! then when backtracking. Changes performed at the root (before any save point) are permanent.

mod trail;

pub use trail::Trail;

use std::fmt::{Debug, Formatter};
use std::num::NonZeroU32;

/// Number of save points currently open. `DecLvl::ROOT` means no save point.
///
/// The internal representation excludes 0 so that `Option<DecLvl>` fits on 32 bits.
#[derive(Copy, Clone, Ord, PartialOrd, PartialEq, Eq, Hash)]
pub struct DecLvl(NonZeroU32);

impl DecLvl {
    pub const ROOT: DecLvl = Self::new(0);

    pub const fn new(num_saved: u32) -> Self {
        match NonZeroU32::new(num_saved + 1) {
            Some(lvl) => DecLvl(lvl),
            None => panic!("decision level overflow"),
        }
    }

    /// Integer representation of the level, the root being 0.
    pub const fn to_int(self) -> u32 {
        self.0.get() - 1
    }

    pub fn parent(self) -> DecLvl {
        debug_assert!(self > DecLvl::ROOT, "the root has no parent");
        DecLvl::new(self.to_int() - 1)
    }
}

impl Default for DecLvl {
    fn default() -> Self {
        Self::ROOT
    }
}

impl From<u32> for DecLvl {
    fn from(u: u32) -> Self {
        DecLvl::new(u)
    }
}

impl From<DecLvl> for usize {
    fn from(dl: DecLvl) -> Self {
        dl.to_int() as usize
    }
}

impl Debug for DecLvl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "dl({})", self.to_int())
    }
}

/// Identifies one save point over the whole life of a trail.
///
/// Unlike a [DecLvl], a stamp is never reused: closing a save point and opening a new one at
/// the same depth yields a fresh stamp. Data structures compare their last stamp with the
/// current one to decide whether a snapshot was already taken for the current save point.
#[derive(Copy, Clone, Ord, PartialOrd, PartialEq, Eq, Hash, Debug, Default)]
pub struct Stamp(u64);

impl Stamp {
    /// Stamp of the root, at which changes are never recorded.
    pub const ROOT: Stamp = Stamp(0);

    pub fn is_root(self) -> bool {
        self == Stamp::ROOT
    }
}

/// A data structure whose changes can be undone up to a previously saved state.
pub trait Backtrack {
    /// Opens a new save point and returns the resulting decision level.
    fn save_state(&mut self) -> DecLvl;

    fn num_saved(&self) -> u32;

    fn current_decision_level(&self) -> DecLvl {
        DecLvl::new(self.num_saved())
    }

    /// Undoes all changes since the last save point and closes it.
    fn restore_last(&mut self);

    /// Undoes changes until `saved` is the current decision level.
    fn restore(&mut self, saved: DecLvl) {
        while self.current_decision_level() > saved {
            self.restore_last();
        }
    }

    /// Undoes every change down to the root.
    fn reset(&mut self) {
        self.restore(DecLvl::ROOT)
    }
}
