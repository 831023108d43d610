use crate::backtrack::Backtrack;
use crate::core::state::{Cause, Domains, InvalidUpdate};
use crate::core::*;
use crate::model::lang::{Constraint, LinearSum};
use crate::model::ModelError;
use crate::reasoners::cp::all_different::AllDifferent;
use crate::reasoners::cp::eq::EqOffset;
use crate::reasoners::cp::leq::LeqOffset;
use crate::reasoners::cp::linear::{LinearPropagator, SumElem, SumKind};
use crate::reasoners::cp::neq::Neq;
use crate::reasoners::cp::{Cp, DynPropagator};
use crate::solver::goal::Goal;
use crate::solver::limits::Limits;
use crate::solver::search::SearchStack;
use crate::solver::stats::{Stats, STATS_AT_SOLUTION};
use std::time::{Duration, Instant};
use tracing::instrument;

/// Outcome of a call to [`Manager::solve_next`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// All variables are bound, the domains are on the solution.
    Solution,
    /// There are no more solutions. Domains are back to their state before search.
    Exhausted,
    /// A limit was reached before the search could conclude.
    /// The search resumes from the same point on the next call.
    LimitReached,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SearchState {
    /// No search started since the creation of the manager or the last restart.
    Idle,
    Searching,
    AtSolution,
    Exhausted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Sense {
    Minimize,
    Maximize,
}

#[derive(Copy, Clone, Debug)]
struct Objective {
    var: VarRef,
    sense: Sense,
}

/// Owner of the variables and constraints of a problem, driving the search for its solutions.
///
/// Constraints are posted at the root, where they are immediately propagated. Search is driven by
/// the goals given to [`Manager::add_goal`]: a solution is reached when all goals are discharged
/// without failure. Successive calls to [`Manager::solve_next`] enumerate the solutions, each call
/// resuming the search where the previous one stopped.
///
/// ```
/// use fdsolve::prelude::*;
/// let mut m = Manager::new();
/// let x = m.new_var(0, 3);
/// let y = m.new_var(0, 3);
/// m.add(lt(x, y));
/// m.add_goal(label([x, y], VarOrder::Lexical, ValueOrder::Min));
/// let mut count = 0;
/// while m.next_solution() {
///     assert!(m.value(x) < m.value(y));
///     count += 1;
/// }
/// assert_eq!(count, 6);
/// ```
pub struct Manager {
    id: ManagerId,
    domains: Domains,
    cp: Cp,
    goals: Vec<Goal>,
    stack: SearchStack,
    intermediates: Vec<IntVar>,
    objective: Option<Objective>,
    best: Option<IntCst>,
    /// The objective bound must be (re)applied before the next step of the search.
    bound_pending: bool,
    limits: Limits,
    state: SearchState,
    last_result: Option<SearchResult>,
    /// Set when the root itself was proven infeasible.
    inconsistent: bool,
    stats: Stats,
}

impl Manager {
    pub fn new() -> Manager {
        Manager {
            id: ManagerId::fresh(),
            domains: Domains::new(),
            cp: Cp::new(),
            goals: Vec::new(),
            stack: SearchStack::new(),
            intermediates: Vec::new(),
            objective: None,
            best: None,
            bound_pending: false,
            limits: Limits::default(),
            state: SearchState::Idle,
            last_result: None,
            inconsistent: false,
            stats: Stats::new(),
        }
    }

    pub fn id(&self) -> ManagerId {
        self.id
    }

    /* ==================== Variables ==================== */

    /// Creates a variable with domain `[lb, ub]`.
    ///
    /// # Panics
    /// If the range is empty or contains a reserved value.
    pub fn new_var(&mut self, lb: IntCst, ub: IntCst) -> IntVar {
        self.try_new_var(lb, ub).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new_var(&mut self, lb: IntCst, ub: IntCst) -> Result<IntVar, ModelError> {
        let dom = Domain::try_new(lb, ub)?;
        Ok(IntVar::new(self.domains.add_domain(dom), self.id))
    }

    /// Creates `n` variables with domain `[lb, ub]`.
    pub fn new_vars(&mut self, n: usize, lb: IntCst, ub: IntCst) -> Vec<IntVar> {
        (0..n).map(|_| self.new_var(lb, ub)).collect()
    }

    /// Creates a variable constrained to be equal to `expr`.
    ///
    /// # Panics
    /// On any of the errors of [`Manager::try_intermediate`].
    pub fn intermediate(&mut self, expr: impl Into<LinearSum>) -> IntVar {
        self.try_intermediate(expr).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Creates a variable constrained to be equal to `expr`.
    ///
    /// An expression of the form `x + c` results in an arc-consistent view of `x`, while general
    /// sums are only kept bounds-consistent.
    pub fn try_intermediate(&mut self, expr: impl Into<LinearSum>) -> Result<IntVar, ModelError> {
        self.check_at_root()?;
        let expr = expr.into().simplify();
        for term in expr.terms() {
            self.check(term.var())?;
        }
        let var = if let Some((x, offset)) = expr.as_offset() {
            let (lb, ub) = self.domains.bounds(x.var_ref());
            let var = self.try_new_var(shifted(lb, offset), shifted(ub, offset))?;
            self.try_add(Constraint::EqOffset(var, x, offset))?;
            var
        } else {
            let mut lb = cst_int_to_long(expr.get_constant());
            let mut ub = lb;
            for term in expr.terms() {
                let (min, max) = self.domains.bounds(term.var().var_ref());
                let factor = cst_int_to_long(term.factor());
                let (a, b) = (factor * cst_int_to_long(min), factor * cst_int_to_long(max));
                lb += a.min(b);
                ub += a.max(b);
            }
            let var = self.try_new_var(clamped(lb), clamped(ub))?;
            self.try_add((expr - var).eq(0))?;
            var
        };
        tracing::trace!("intermediate {var:?}");
        self.intermediates.push(var);
        Ok(var)
    }

    /// Variables created by [`Manager::intermediate`], in creation order.
    pub fn intermediates(&self) -> &[IntVar] {
        &self.intermediates
    }

    pub fn num_variables(&self) -> usize {
        self.domains.num_variables()
    }

    pub fn variables(&self) -> impl Iterator<Item = IntVar> + '_ {
        self.domains.variables().map(|v| IntVar::new(v, self.id))
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Current domain of `var`.
    ///
    /// # Panics
    /// If the variable belongs to another manager (as all accessors below).
    pub fn domain(&self, var: IntVar) -> &Domain {
        self.domains.domain(self.var_ref(var))
    }

    pub fn lb(&self, var: IntVar) -> IntCst {
        self.domains.lb(self.var_ref(var))
    }

    pub fn ub(&self, var: IntVar) -> IntCst {
        self.domains.ub(self.var_ref(var))
    }

    pub fn size(&self, var: IntVar) -> u64 {
        self.domains.size(self.var_ref(var))
    }

    pub fn contains(&self, var: IntVar, value: IntCst) -> bool {
        self.domains.contains(self.var_ref(var), value)
    }

    pub fn is_bound(&self, var: IntVar) -> bool {
        self.domains.is_bound(self.var_ref(var))
    }

    /// Value of the variable if bound.
    pub fn value(&self, var: IntVar) -> Option<IntCst> {
        self.domains.value(self.var_ref(var))
    }

    /* ==================== Root modifications ==================== */
    // Each of the methods below returns whether the problem is still consistent after the change
    // and its propagation. A `false` result is permanent until the next restart at the earliest.

    pub fn remove(&mut self, var: IntVar, value: IntCst) -> bool {
        self.update(var, |d, v| d.remove(v, value, Cause::Encoding))
    }

    pub fn remove_range(&mut self, var: IntVar, lo: IntCst, hi: IntCst) -> bool {
        self.update(var, |d, v| d.remove_range(v, lo, hi, Cause::Encoding))
    }

    pub fn set_lb(&mut self, var: IntVar, lb: IntCst) -> bool {
        self.update(var, |d, v| d.set_lb(v, lb, Cause::Encoding))
    }

    pub fn set_ub(&mut self, var: IntVar, ub: IntCst) -> bool {
        self.update(var, |d, v| d.set_ub(v, ub, Cause::Encoding))
    }

    pub fn set(&mut self, var: IntVar, value: IntCst) -> bool {
        self.update(var, |d, v| d.set(v, value, Cause::Encoding))
    }

    /// Declares the problem infeasible.
    pub fn remove_all(&mut self, var: IntVar) -> bool {
        self.update(var, |d, v| d.remove_all(v, Cause::Encoding))
    }

    fn update(
        &mut self,
        var: IntVar,
        op: impl FnOnce(&mut Domains, VarRef) -> Result<bool, InvalidUpdate>,
    ) -> bool {
        let res = self
            .check_at_root()
            .and_then(|_| self.check(var))
            .map(|v| op(&mut self.domains, v));
        match res {
            Ok(Ok(_)) => self.propagate_at_root(),
            Ok(Err(_)) => self.set_inconsistent(),
            Err(e) => panic!("{e}"),
        }
    }

    /* ==================== Constraints ==================== */

    /// Posts a constraint and propagates it. Returns false if the problem was proven infeasible.
    ///
    /// # Panics
    /// On any of the errors of [`Manager::try_add`].
    pub fn add(&mut self, constraint: impl Into<Constraint>) -> bool {
        self.try_add(constraint).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Posts a constraint and propagates it. Returns `Ok(false)` if the problem was proven infeasible.
    ///
    /// Constraints can only be posted at the root: before the first search, after the search
    /// space is exhausted or after a restart.
    pub fn try_add(&mut self, constraint: impl Into<Constraint>) -> Result<bool, ModelError> {
        let constraint = constraint.into();
        self.check_at_root()?;
        constraint.validate()?;
        for var in constraint.variables() {
            self.check(var)?;
        }
        tracing::trace!("post {constraint:?}");
        let propagator: DynPropagator = match constraint {
            Constraint::Neq(x, y, offset) => Neq::new(x.var_ref(), y.var_ref(), offset).into(),
            Constraint::LeqOffset(x, y, offset) => LeqOffset::new(x.var_ref(), y.var_ref(), offset).into(),
            Constraint::EqOffset(x, y, offset) => EqOffset::new(x.var_ref(), y.var_ref(), offset).into(),
            Constraint::AllDifferent(vars) => AllDifferent::new(vars.into_iter().map(IntVar::var_ref).collect()).into(),
            Constraint::Linear(sum, kind) => {
                let sum = sum.simplify();
                let elements = sum
                    .terms()
                    .iter()
                    .map(|t| SumElem::new(t.factor(), t.var().var_ref()))
                    .collect();
                let rhs = -sum.get_constant();
                match kind {
                    SumKind::Leq => LinearPropagator::leq(elements, rhs).into(),
                    SumKind::Eq => LinearPropagator::eq(elements, rhs).into(),
                }
            }
        };
        let id = self.cp.add_propagator(propagator);
        if self.inconsistent {
            return Ok(false);
        }
        match self.cp.propagate_constraint(id, &mut self.domains) {
            Ok(()) => Ok(self.propagate_at_root()),
            Err(_) => Ok(self.set_inconsistent()),
        }
    }

    pub fn num_constraints(&self) -> usize {
        self.cp.num_constraints()
    }

    /// False if the problem was proven infeasible at the root.
    pub fn is_consistent(&self) -> bool {
        !self.inconsistent
    }

    /// Returns true if propagating every constraint from scratch would leave all domains unchanged.
    pub fn check_fixpoint(&self) -> bool {
        let mut domains = self.domains.clone();
        let mut cp = self.cp.clone();
        if cp.propagate_all(&mut domains).is_err() {
            return false;
        }
        let unchanged = domains.variables().all(|v| domains.domain(v) == self.domains.domain(v));
        unchanged
    }

    fn propagate_at_root(&mut self) -> bool {
        match self.cp.propagate(&mut self.domains) {
            Ok(()) => true,
            Err(_) => self.set_inconsistent(),
        }
    }

    fn set_inconsistent(&mut self) -> bool {
        tracing::debug!("inconsistent at the root");
        self.domains.queue_mut().clear();
        self.inconsistent = true;
        false
    }

    /* ==================== Search ==================== */

    /// Adds a goal to be run by every search. Goals are run in the order they were added.
    ///
    /// A goal added while a search is in progress is only taken into account after the next restart.
    ///
    /// # Panics
    /// If the goal operates on a variable of another manager.
    pub fn add_goal(&mut self, goal: Goal) {
        self.try_add_goal(goal).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Adds a goal to be run by every search, after checking that all variables it labels belong
    /// to this manager.
    pub fn try_add_goal(&mut self, goal: Goal) -> Result<(), ModelError> {
        for var in goal.variables() {
            self.check(var)?;
        }
        self.goals.push(goal);
        Ok(())
    }

    /// Requires each solution to have a smaller value of `var` than the previous one.
    pub fn minimize(&mut self, var: IntVar) {
        self.set_objective(var, Sense::Minimize)
    }

    /// Requires each solution to have a greater value of `var` than the previous one.
    pub fn maximize(&mut self, var: IntVar) {
        self.set_objective(var, Sense::Maximize)
    }

    fn set_objective(&mut self, var: IntVar, sense: Sense) {
        let var = self.var_ref(var);
        self.objective = Some(Objective { var, sense });
        self.best = None;
    }

    /// Objective value of the last solution found, that any later solution must improve on.
    ///
    /// If the objective is not bound in a solution, this is its upper bound when minimizing and its
    /// lower bound when maximizing.
    pub fn best_objective(&self) -> Option<IntCst> {
        self.best
    }

    pub fn set_time_limit(&mut self, timeout: Duration) {
        self.limits.set_time_limit(timeout)
    }

    /// Limits the number of backtracks, counted from now.
    pub fn set_backtrack_limit(&mut self, budget: u64) {
        self.limits.set_backtrack_limit(budget, self.stats.num_backtracks)
    }

    pub fn clear_limits(&mut self) {
        self.limits.clear()
    }

    pub fn has_limits(&self) -> bool {
        self.limits.is_set()
    }

    /// Looks for the next solution. Returns false when there are no more solutions or a limit was
    /// reached; the two cases are distinguished by [`Manager::last_result`].
    pub fn next_solution(&mut self) -> bool {
        self.solve_next() == SearchResult::Solution
    }

    /// Outcome of the last search call, if any.
    pub fn last_result(&self) -> Option<SearchResult> {
        self.last_result
    }

    /// Looks for the next solution.
    #[instrument(level = "debug", skip(self), fields(manager = ?self.id))]
    pub fn solve_next(&mut self) -> SearchResult {
        let start = Instant::now();
        let result = self.search();
        self.stats.solve_time += start.elapsed();
        self.stats.num_propagations = self.cp.stats.num_propagations;
        self.last_result = Some(result);
        result
    }

    /// Undoes all decisions and returns to the root, keeping the constraints, goals and the best
    /// objective value. The next search starts from scratch.
    pub fn restart(&mut self) {
        while self.stack.pop().is_some() {}
        self.domains.reset();
        self.domains.queue_mut().clear();
        self.state = SearchState::Idle;
        self.stats.num_restarts += 1;
        tracing::debug!("restart");
    }

    /// Depth of the search tree, the root being at 0.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn print_stats(&self) {
        println!("{}", self.stats);
    }

    fn search(&mut self) -> SearchResult {
        if self.state == SearchState::Exhausted {
            return SearchResult::Exhausted;
        }
        if self.state == SearchState::Idle && self.inconsistent {
            return self.exhausted();
        }
        match self.state {
            SearchState::Idle => {
                let level = self.domains.save_state();
                self.stack.open_base(level, self.goals.clone().into_iter());
                self.bound_pending = self.best.is_some();
            }
            SearchState::AtSolution => {
                if self.limits.exceeded(self.stats.num_backtracks) {
                    tracing::debug!("limit reached after {} backtracks", self.stats.num_backtracks);
                    return SearchResult::LimitReached;
                }
                if !self.backtrack() {
                    return self.exhausted();
                }
            }
            SearchState::Searching | SearchState::Exhausted => {}
        }
        self.state = SearchState::Searching;
        loop {
            if self.limits.exceeded(self.stats.num_backtracks) {
                tracing::debug!("limit reached after {} backtracks", self.stats.num_backtracks);
                return SearchResult::LimitReached;
            }
            if self.bound_pending {
                self.bound_pending = false;
                if self.apply_objective_bound().is_err() && !self.fail() {
                    return self.exhausted();
                }
                continue;
            }
            if !self.domains.queue().is_empty() {
                if self.cp.propagate(&mut self.domains).is_err() && !self.fail() {
                    return self.exhausted();
                }
                continue;
            }
            let Some(goal) = self.stack.next_goal() else {
                return self.solution_found();
            };
            self.stats.num_goals += 1;
            match goal {
                Goal::And(first, second) => {
                    self.stack.push_goal(*second);
                    self.stack.push_goal(*first);
                }
                Goal::Or(first, alternative) => {
                    let level = self.domains.save_state();
                    self.stack.open(level, *first, *alternative);
                    self.stats.num_choice_points += 1;
                    self.stats.max_depth = self.stats.max_depth.max(level.to_int());
                    tracing::trace!("choice point at {level:?}");
                }
                Goal::Leaf(step) => match step.execute(&mut self.domains) {
                    Ok(Some(next)) => self.stack.push_goal(next),
                    Ok(None) => {}
                    Err(_) => {
                        if !self.fail() {
                            return self.exhausted();
                        }
                    }
                },
            }
        }
    }

    /// Handles a dead end. Returns false if the search space is exhausted.
    fn fail(&mut self) -> bool {
        self.stats.num_failures += 1;
        self.backtrack()
    }

    /// Undoes the most recent choice point and schedules its alternative.
    /// Returns false if no choice point with an alternative remains.
    fn backtrack(&mut self) -> bool {
        self.domains.queue_mut().clear();
        while let Some(node) = self.stack.pop() {
            self.domains.restore(node.level.parent());
            if let Some(alternative) = node.alternative {
                self.stack.push_goal(alternative);
                self.stats.num_backtracks += 1;
                self.bound_pending = self.best.is_some();
                tracing::trace!("backtrack to {:?}", self.domains.current_decision_level());
                return true;
            }
        }
        false
    }

    fn apply_objective_bound(&mut self) -> Result<bool, InvalidUpdate> {
        match (self.objective, self.best) {
            (Some(Objective { var, sense }), Some(best)) => match sense {
                Sense::Minimize => self.domains.set_ub(var, best - 1, Cause::Decision),
                Sense::Maximize => self.domains.set_lb(var, best + 1, Cause::Decision),
            },
            _ => Ok(false),
        }
    }

    fn solution_found(&mut self) -> SearchResult {
        self.state = SearchState::AtSolution;
        self.stats.num_solutions += 1;
        if let Some(Objective { var, sense }) = self.objective {
            let value = match sense {
                Sense::Minimize => self.domains.ub(var),
                Sense::Maximize => self.domains.lb(var),
            };
            self.best = Some(value);
            tracing::debug!(objective = value, "solution found");
        } else {
            tracing::debug!("solution found");
        }
        if STATS_AT_SOLUTION.get() {
            tracing::info!("\n{}", self.stats);
        }
        SearchResult::Solution
    }

    fn exhausted(&mut self) -> SearchResult {
        self.state = SearchState::Exhausted;
        debug_assert_eq!(self.stack.depth(), 0);
        tracing::debug!("search space exhausted");
        SearchResult::Exhausted
    }

    /* ==================== Helpers ==================== */

    fn check(&self, var: IntVar) -> Result<VarRef, ModelError> {
        if var.manager() == self.id {
            Ok(var.var_ref())
        } else {
            Err(ModelError::ForeignVariable(var))
        }
    }

    fn var_ref(&self, var: IntVar) -> VarRef {
        self.check(var).unwrap_or_else(|e| panic!("{e}"))
    }

    fn check_at_root(&self) -> Result<(), ModelError> {
        match self.stack.depth() {
            0 => Ok(()),
            depth => Err(ModelError::NotAtRoot(depth as u32)),
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

/// `value + offset`, restricted to the range of representable values.
fn shifted(value: IntCst, offset: IntCst) -> IntCst {
    clamped(cst_int_to_long(value) + cst_int_to_long(offset))
}

fn clamped(value: LongCst) -> IntCst {
    cst_long_to_int(value).clamp(INT_CST_MIN, INT_CST_MAX)
}
