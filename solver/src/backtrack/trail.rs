use crate::backtrack::{Backtrack, DecLvl, Stamp};

#[derive(Copy, Clone, Debug)]
struct SavePoint {
    /// Index of the first event recorded after this save point.
    first_event: usize,
    stamp: Stamp,
}

/// An undo log partitioned by save points.
///
/// Each segment of the trail holds the events recorded while its save point was the most
/// recent one. Restoring a save point replays its segment in reverse order, so that the
/// oldest recorded state of an item is the one that ends up in place.
///
/// Events pushed while no save point is open are dropped: they could never be undone.
#[derive(Clone)]
pub struct Trail<Event> {
    events: Vec<Event>,
    save_points: Vec<SavePoint>,
    last_stamp: Stamp,
}

impl<Event> Trail<Event> {
    pub fn new() -> Self {
        Trail {
            events: Vec::new(),
            save_points: Vec::new(),
            last_stamp: Stamp::ROOT,
        }
    }

    pub fn push(&mut self, e: Event) {
        if !self.save_points.is_empty() {
            self.events.push(e);
        }
    }

    /// Stamp of the current save point, [Stamp::ROOT] if none is open.
    pub fn current_stamp(&self) -> Stamp {
        self.save_points.last().map_or(Stamp::ROOT, |sp| sp.stamp)
    }

    /// Total number of recorded events, over all open save points.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events recorded since the last save point, oldest first.
    #[cfg(test)]
    fn current_segment(&self) -> &[Event] {
        let start = self.save_points.last().map_or(self.events.len(), |sp| sp.first_event);
        &self.events[start..]
    }

    /// Closes the last save point, passing each of its events to `undo`, most recent first.
    ///
    /// # Panics
    /// If no save point is open.
    pub fn restore_last_with(&mut self, mut undo: impl FnMut(Event)) {
        let sp = match self.save_points.pop() {
            Some(sp) => sp,
            None => panic!("no save point to restore"),
        };
        while self.events.len() > sp.first_event {
            if let Some(ev) = self.events.pop() {
                undo(ev)
            }
        }
    }
}

impl<Event> Default for Trail<Event> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Event> Backtrack for Trail<Event> {
    fn save_state(&mut self) -> DecLvl {
        self.last_stamp = Stamp(self.last_stamp.0 + 1);
        self.save_points.push(SavePoint {
            first_event: self.events.len(),
            stamp: self.last_stamp,
        });
        self.current_decision_level()
    }

    fn num_saved(&self) -> u32 {
        self.save_points.len() as u32
    }

    fn restore_last(&mut self) {
        self.restore_last_with(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_events_are_dropped() {
        let mut trail = Trail::new();
        trail.push(1);
        assert!(trail.is_empty());
        assert_eq!(trail.current_stamp(), Stamp::ROOT);
        trail.save_state();
        trail.push(2);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.current_segment(), &[2]);
    }

    #[test]
    fn nested_restore_in_reverse_order() {
        let mut trail = Trail::new();
        let l1 = trail.save_state();
        trail.push("a");
        trail.push("b");
        let l2 = trail.save_state();
        assert!(l2 > l1);
        trail.push("c");
        trail.push("d");

        let mut undone = Vec::new();
        trail.restore_last_with(|e| undone.push(e));
        assert_eq!(undone, vec!["d", "c"]);
        assert_eq!(trail.current_decision_level(), l1);
        assert_eq!(trail.current_segment(), &["a", "b"]);

        trail.restore_last_with(|e| undone.push(e));
        assert_eq!(undone, vec!["d", "c", "b", "a"]);
        assert_eq!(trail.current_decision_level(), DecLvl::ROOT);
    }

    #[test]
    fn stamps_are_never_reused() {
        let mut trail: Trail<u8> = Trail::new();
        trail.save_state();
        let first = trail.current_stamp();
        trail.restore_last();
        trail.save_state();
        let second = trail.current_stamp();
        assert_eq!(trail.current_decision_level(), DecLvl::new(1));
        assert_ne!(first, second);
        assert!(!second.is_root());
    }

    #[test]
    fn restore_to_level() {
        let mut trail = Trail::new();
        for i in 0..5 {
            trail.save_state();
            trail.push(i);
        }
        trail.restore(DecLvl::new(2));
        assert_eq!(trail.len(), 2);
        trail.reset();
        assert!(trail.is_empty());
        assert_eq!(trail.num_saved(), 0);
    }
}
