use crate::core::state::Event;
use std::collections::VecDeque;

/// An event waiting for the propagators of its variable to be notified.
///
/// `cursor` is the position, in the list of propagators watching the variable, of the next one
/// to notify. The item is discarded once all of them have been visited.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueueItem {
    pub event: Event,
    pub cursor: usize,
}

impl QueueItem {
    /// True if no propagator was notified of this item yet.
    pub fn is_untouched(&self) -> bool {
        self.cursor == 0
    }
}

/// FIFO of domain events pending propagation.
///
/// Items are started in the order of their creation and the front item is fully processed
/// before the next one is started.
#[derive(Clone, Default, Debug)]
pub struct PropagationQueue {
    items: VecDeque<QueueItem>,
    /// Number of items ever pushed.
    num_pushed: u64,
}

impl PropagationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.num_pushed += 1;
        self.items.push_back(QueueItem { event, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn front(&self) -> Option<&QueueItem> {
        self.items.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut QueueItem> {
        self.items.front_mut()
    }

    pub fn back_mut(&mut self) -> Option<&mut QueueItem> {
        self.items.back_mut()
    }

    pub fn pop_front(&mut self) -> Option<QueueItem> {
        self.items.pop_front()
    }

    /// Discards all pending items.
    pub fn clear(&mut self) {
        self.items.clear()
    }

    pub fn num_pushed(&self) -> u64 {
        self.num_pushed
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueItem> + '_ {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Cause;
    use crate::core::VarRef;

    fn ev(var: u32, value: i32) -> Event {
        Event {
            var: VarRef::from_u32(var),
            lo: value as _,
            hi: value as _,
            cause: Cause::Decision,
        }
    }

    #[test]
    fn fifo() {
        let mut q = PropagationQueue::new();
        q.push(ev(0, 1));
        q.push(ev(1, 2));
        assert_eq!(q.len(), 2);
        assert!(q.front().unwrap().is_untouched());
        q.front_mut().unwrap().cursor += 1;
        assert_eq!(q.pop_front().map(|i| (i.event, i.cursor)), Some((ev(0, 1), 1)));
        assert_eq!(q.pop_front().map(|i| i.event), Some(ev(1, 2)));
        assert!(q.is_empty());
        q.push(ev(0, 3));
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.num_pushed(), 3);
    }
}
