//! Search tree bookkeeping and the goal producers labeling variables.

mod labeling;

pub use labeling::*;

use crate::backtrack::DecLvl;
use crate::solver::goal::Goal;

/// A choice point of the search tree.
///
/// A node is opened by a [`Goal::Or`] and corresponds to one save point of the domains. All
/// changes made while the node is on top of the stack are undone when it is popped.
pub(crate) struct SearchNode {
    /// Decision level of the domains right after the save point of this node was opened.
    pub level: DecLvl,
    /// Branch to run in the parent once this node is exhausted. `None` for the root and base nodes.
    pub alternative: Option<Goal>,
    /// Goals to run in this node, the last one being the next.
    pending: Vec<Goal>,
    /// Goals of ancestors that remain to run after the pending ones, identified by the index of an
    /// ancestor and the number of goals at the start of its pending list.
    /// The ancestor lists are not modified while this node exists, so they are read without being consumed.
    leftovers: Option<(usize, usize)>,
}

/// Stack of open choice points. The bottom node is the root, which is never popped.
pub(crate) struct SearchStack {
    nodes: Vec<SearchNode>,
}

impl SearchStack {
    pub fn new() -> SearchStack {
        SearchStack {
            nodes: vec![SearchNode {
                level: DecLvl::ROOT,
                alternative: None,
                pending: Vec::new(),
                leftovers: None,
            }],
        }
    }

    /// Number of nodes above the root.
    pub fn depth(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Opens a node without alternative, whose goals are run in order.
    pub fn open_base(&mut self, level: DecLvl, goals: impl DoubleEndedIterator<Item = Goal>) {
        self.nodes.push(SearchNode {
            level,
            alternative: None,
            pending: goals.rev().collect(),
            leftovers: None,
        })
    }

    /// Opens a choice point that first runs `first` then the leftovers of its parent.
    pub fn open(&mut self, level: DecLvl, first: Goal, alternative: Goal) {
        let parent_index = self.nodes.len() - 1;
        let parent = &self.nodes[parent_index];
        let leftovers = if parent.pending.is_empty() {
            parent.leftovers
        } else {
            Some((parent_index, parent.pending.len()))
        };
        self.nodes.push(SearchNode {
            level,
            alternative: Some(alternative),
            pending: vec![first],
            leftovers,
        })
    }

    /// Schedules `goal` as the next one to run in the top node.
    pub fn push_goal(&mut self, goal: Goal) {
        self.top_mut().pending.push(goal)
    }

    /// Next goal to run: the last pending one of the top node, else the most recent leftover of
    /// an ancestor. Returns `None` when no work remains in the current branch.
    pub fn next_goal(&mut self) -> Option<Goal> {
        let top = self.nodes.len() - 1;
        if let Some(goal) = self.nodes[top].pending.pop() {
            return Some(goal);
        }
        while let Some((ancestor, len)) = self.nodes[top].leftovers {
            if len == 0 {
                self.nodes[top].leftovers = self.nodes[ancestor].leftovers;
            } else {
                self.nodes[top].leftovers = Some((ancestor, len - 1));
                return Some(self.nodes[ancestor].pending[len - 1].clone());
            }
        }
        None
    }

    /// Removes the top node. The root is never removed.
    pub fn pop(&mut self) -> Option<SearchNode> {
        if self.nodes.len() > 1 {
            self.nodes.pop()
        } else {
            None
        }
    }

    fn top_mut(&mut self) -> &mut SearchNode {
        let top = self.nodes.len() - 1;
        &mut self.nodes[top]
    }
}
