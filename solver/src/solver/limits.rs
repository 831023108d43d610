use std::time::{Duration, Instant};

/// Budgets of a search, polled once per iteration of the search loop.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    deadline: Option<Instant>,
    /// Number of backtracks at which the search must be interrupted.
    max_backtracks: Option<u64>,
}

impl Limits {
    /// Interrupts the search once `timeout` has elapsed from now.
    pub fn set_time_limit(&mut self, timeout: Duration) {
        // an overflowing deadline is never reached
        self.deadline = Instant::now().checked_add(timeout);
    }

    /// Interrupts the search once `budget` more backtracks have been performed,
    /// `current` being the number of backtracks performed so far.
    pub fn set_backtrack_limit(&mut self, budget: u64, current: u64) {
        self.max_backtracks = Some(current.saturating_add(budget));
    }

    pub fn clear(&mut self) {
        self.deadline = None;
        self.max_backtracks = None;
    }

    pub fn is_set(&self) -> bool {
        self.deadline.is_some() || self.max_backtracks.is_some()
    }

    pub fn exceeded(&self, num_backtracks: u64) -> bool {
        if let Some(max) = self.max_backtracks {
            if num_backtracks >= max {
                return true;
            }
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets() {
        let mut limits = Limits::default();
        assert!(!limits.is_set());
        assert!(!limits.exceeded(u64::MAX));

        limits.set_backtrack_limit(10, 5);
        assert!(!limits.exceeded(14));
        assert!(limits.exceeded(15));

        limits.set_time_limit(Duration::ZERO);
        limits.set_backtrack_limit(u64::MAX, 5);
        assert!(limits.exceeded(0));

        limits.clear();
        limits.set_time_limit(Duration::MAX);
        assert!(!limits.exceeded(0));
    }
}
