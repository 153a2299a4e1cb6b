//! Coalesced redraw deadlines.

use std::time::{Duration, Instant};

/// Sorted list of pending redraw deadlines.
///
/// Any number of expired deadlines collapse into a single redraw when
/// [`take_due`](Self::take_due) runs.
#[derive(Clone, Debug, Default)]
pub struct RedrawScheduler {
    deadlines: Vec<Instant>,
}

impl RedrawScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a redraw at `deadline`. Duplicate deadlines are kept once.
    pub fn schedule_at(&mut self, deadline: Instant) {
        if let Err(idx) = self.deadlines.binary_search(&deadline) {
            self.deadlines.insert(idx, deadline);
        }
    }

    /// Request a redraw `delay` after `now`.
    pub fn schedule_in(&mut self, now: Instant, delay: Duration) {
        self.schedule_at(now + delay);
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.first().copied()
    }

    /// Drop every deadline at or before `now`; true if any were dropped.
    pub fn take_due(&mut self, now: Instant) -> bool {
        let due = self.deadlines.partition_point(|&deadline| deadline <= now);
        self.deadlines.drain(..due);
        due > 0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_deadlines_stay_sorted_and_unique() {
        let now = Instant::now();
        let mut redraw = RedrawScheduler::new();
        redraw.schedule_in(now, 30 * MS);
        redraw.schedule_in(now, 10 * MS);
        redraw.schedule_in(now, 30 * MS);
        assert_eq!(redraw.len(), 2);
        assert_eq!(redraw.next_deadline(), Some(now + 10 * MS));
    }

    #[test]
    fn test_take_due_coalesces() {
        let now = Instant::now();
        let mut redraw = RedrawScheduler::new();
        redraw.schedule_in(now, 5 * MS);
        redraw.schedule_in(now, 10 * MS);
        redraw.schedule_in(now, 50 * MS);
        assert!(!redraw.take_due(now));
        assert!(redraw.take_due(now + 20 * MS));
        assert_eq!(redraw.len(), 1);
        assert!(!redraw.take_due(now + 20 * MS));
        assert!(redraw.take_due(now + 50 * MS));
        assert!(redraw.is_empty());
    }
}
