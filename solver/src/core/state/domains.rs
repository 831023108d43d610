use crate::backtrack::{Backtrack, DecLvl, Trail};
use crate::collections::ref_store::RefVec;
use crate::core::state::{Cause, Event, InvalidUpdate, PropagationQueue};
use crate::core::*;
use std::fmt::{Debug, Formatter};

/// Domains of all variables of a problem, together with the machinery to undo their changes and
/// to notify propagators of them.
///
/// Every modification goes through the same path:
///  1. if the domain was not saved since the last save point, a snapshot of it is pushed on the
///     trail (changes made at the root are never recorded),
///  2. the domain is updated,
///  3. an event describing the removed values is pushed on the propagation queue (or merged into
///     the last pending event of the variable if it has the same cause).
///
/// All modifying methods return:
///  - `Ok(true)` if the domain was changed and is still non-empty,
///  - `Ok(false)` if nothing had to be done,
///  - `Err(InvalidUpdate(v, cause))` if the change would empty the domain of `v`. The domain is
///    left unchanged in this case.
#[derive(Clone)]
pub struct Domains {
    doms: RefVec<VarRef, Domain>,
    trail: Trail<(VarRef, Domain)>,
    queue: PropagationQueue,
}

impl Domains {
    pub fn new() -> Self {
        Domains {
            doms: RefVec::new(),
            trail: Trail::new(),
            queue: PropagationQueue::new(),
        }
    }

    /// Creates a new variable whose domain is `[lb, ub]`.
    ///
    /// # Panics
    /// If the range is empty or touches one of the infinity sentinels.
    pub fn new_var(&mut self, lb: IntCst, ub: IntCst) -> VarRef {
        self.add_domain(Domain::new(lb, ub))
    }

    /// Creates a new variable with the given domain.
    pub fn add_domain(&mut self, mut dom: Domain) -> VarRef {
        dom.last_saved = self.trail.current_stamp();
        self.doms.push(dom)
    }

    pub fn num_variables(&self) -> usize {
        self.doms.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = VarRef> + '_ {
        self.doms.keys()
    }

    pub fn domain(&self, var: VarRef) -> &Domain {
        &self.doms[var]
    }

    pub fn lb(&self, var: VarRef) -> IntCst {
        self.doms[var].min()
    }

    pub fn ub(&self, var: VarRef) -> IntCst {
        self.doms[var].max()
    }

    pub fn bounds(&self, var: VarRef) -> (IntCst, IntCst) {
        let dom = &self.doms[var];
        (dom.min(), dom.max())
    }

    pub fn size(&self, var: VarRef) -> u64 {
        self.doms[var].size()
    }

    pub fn contains(&self, var: VarRef, value: IntCst) -> bool {
        self.doms[var].contains(value)
    }

    pub fn is_bound(&self, var: VarRef) -> bool {
        self.doms[var].is_bound()
    }

    /// Value of the variable if its domain is a singleton.
    pub fn value(&self, var: VarRef) -> Option<IntCst> {
        self.doms[var].value()
    }

    /// Removes a single value from the domain of `var`.
    pub fn remove(&mut self, var: VarRef, value: IntCst, cause: Cause) -> Result<bool, InvalidUpdate> {
        let dom = &self.doms[var];
        if !dom.contains(value) {
            return Ok(false);
        }
        if dom.is_bound() {
            return Err(InvalidUpdate(var, cause));
        }
        self.save(var);
        self.doms[var].remove(value);
        self.notify(var, value, value, cause);
        Ok(true)
    }

    /// Removes all values of `[lo, hi]` from the domain of `var`.
    /// If that would empty the domain, nothing is removed.
    pub fn remove_range(&mut self, var: VarRef, lo: IntCst, hi: IntCst, cause: Cause) -> Result<bool, InvalidUpdate> {
        let dom = &self.doms[var];
        let lo = lo.max(dom.min());
        let hi = hi.min(dom.max());
        if lo > hi || dom.next(lo - 1) > hi {
            // no value of the domain in [lo, hi]
            return Ok(false);
        }
        if lo == dom.min() && hi == dom.max() {
            return Err(InvalidUpdate(var, cause));
        }
        self.save(var);
        match self.doms[var].remove_range(lo, hi) {
            Ok(changed) => {
                debug_assert!(changed);
                self.notify(var, lo, hi, cause);
                Ok(true)
            }
            Err(_) => Err(InvalidUpdate(var, cause)),
        }
    }

    /// Removes all values strictly smaller than `lb`.
    pub fn set_lb(&mut self, var: VarRef, lb: IntCst, cause: Cause) -> Result<bool, InvalidUpdate> {
        let (min, max) = self.bounds(var);
        if lb <= min {
            Ok(false)
        } else if lb > max {
            Err(InvalidUpdate(var, cause))
        } else {
            self.remove_range(var, min, lb - 1, cause)
        }
    }

    /// Removes all values strictly greater than `ub`.
    pub fn set_ub(&mut self, var: VarRef, ub: IntCst, cause: Cause) -> Result<bool, InvalidUpdate> {
        let (min, max) = self.bounds(var);
        if ub >= max {
            Ok(false)
        } else if ub < min {
            Err(InvalidUpdate(var, cause))
        } else {
            self.remove_range(var, ub + 1, max, cause)
        }
    }

    /// Restricts the domain of `var` to the single `value`, by removing the values on both sides of it.
    pub fn set(&mut self, var: VarRef, value: IntCst, cause: Cause) -> Result<bool, InvalidUpdate> {
        if !self.doms[var].contains(value) {
            return Err(InvalidUpdate(var, cause));
        }
        let below = self.set_lb(var, value, cause)?;
        let above = self.set_ub(var, value, cause)?;
        Ok(below || above)
    }

    /// Unconditionally fails on `var`. The domain is not modified.
    pub fn remove_all(&mut self, var: VarRef, cause: Cause) -> Result<bool, InvalidUpdate> {
        Err(InvalidUpdate(var, cause))
    }

    pub fn queue(&self) -> &PropagationQueue {
        &self.queue
    }

    pub(crate) fn queue_mut(&mut self) -> &mut PropagationQueue {
        &mut self.queue
    }

    /// Records a snapshot of the domain if none was taken since the last save point.
    fn save(&mut self, var: VarRef) {
        let stamp = self.trail.current_stamp();
        let dom = &mut self.doms[var];
        if dom.last_saved != stamp {
            self.trail.push((var, dom.clone()));
            dom.last_saved = stamp;
        }
    }

    /// Signals the removal of the values `[lo, hi]` from `var`.
    fn notify(&mut self, var: VarRef, lo: IntCst, hi: IntCst, cause: Cause) {
        let dom = &self.doms[var];
        if let Some(last) = self.queue.back_mut().filter(|item| item.is_untouched()) {
            let ev = &mut last.event;
            if ev.var == var && ev.cause == cause {
                let (lo, hi) = (lo.min(ev.lo), hi.max(ev.hi));
                if dom.next(lo - 1) > hi {
                    // all values of the merged interval are absent
                    ev.lo = lo;
                    ev.hi = hi;
                    return;
                }
            }
        }
        self.queue.push(Event { var, lo, hi, cause })
    }
}

impl Default for Domains {
    fn default() -> Self {
        Self::new()
    }
}

impl Backtrack for Domains {
    fn save_state(&mut self) -> DecLvl {
        self.trail.save_state()
    }

    fn num_saved(&self) -> u32 {
        self.trail.num_saved()
    }

    fn restore_last(&mut self) {
        // events refer to removals that are about to be undone
        self.queue.clear();
        let doms = &mut self.doms;
        self.trail.restore_last_with(|(var, dom)| doms[var] = dom);
    }
}

impl Debug for Domains {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}", self.current_decision_level())?;
        for (var, dom) in self.doms.entries() {
            writeln!(f, "  {var:?}: {dom}")?;
        }
        Ok(())
    }
}
