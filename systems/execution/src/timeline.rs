//! Virtual clock with a registry of cancellable scheduled continuations.

use std::time::Duration;

/// Handle returned when a continuation is scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Scheduled<T> {
    id: TimerId,
    due: Duration,
    payload: T,
}

/// Deterministic timer registry driven by explicit clock advances.
///
/// Every pending continuation stays in the registry until it fires or is
/// cancelled, so a reset can drain all of them at once. Continuations due at
/// the same instant fire in scheduling order.
#[derive(Clone, Debug)]
pub struct Timeline<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Timeline<T> {
    /// Creates an empty timeline at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of continuations waiting to fire.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Time at which the earliest pending continuation fires.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|entry| entry.due).min()
    }

    /// Schedules `payload` to fire `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            due: self.now.saturating_add(delay),
            payload,
        });
        id
    }

    /// Cancels every pending continuation and reports how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Removes the earliest continuation due at or before `until`.
    ///
    /// The clock moves forward to the continuation's due time so anything it
    /// schedules is measured from the moment it fired.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.id))
            .map(|(index, _)| index)?;
        let entry = self.pending.remove(index);
        self.now = self.now.max(entry.due);
        Some((entry.id, entry.payload))
    }

    /// Moves the clock forward without firing anything.
    pub fn settle_at(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Timeline;

    #[test]
    fn fires_in_due_order_then_schedule_order() {
        let mut timeline = Timeline::new();
        let _ = timeline.schedule(Duration::from_millis(20), "late");
        let _ = timeline.schedule(Duration::from_millis(10), "first");
        let _ = timeline.schedule(Duration::from_millis(10), "second");

        let until = Duration::from_millis(30);
        let fired: Vec<_> = std::iter::from_fn(|| timeline.pop_due(until))
            .map(|(_, payload)| payload)
            .collect();

        assert_eq!(fired, vec!["first", "second", "late"]);
        assert_eq!(timeline.now(), Duration::from_millis(20));
    }

    #[test]
    fn nothing_fires_before_it_is_due() {
        let mut timeline = Timeline::new();
        let _ = timeline.schedule(Duration::from_millis(800), ());

        assert!(timeline.pop_due(Duration::from_millis(799)).is_none());
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.next_due(), Some(Duration::from_millis(800)));
    }

    #[test]
    fn cancel_all_drains_the_registry() {
        let mut timeline = Timeline::new();
        let _ = timeline.schedule(Duration::from_millis(5), 1);
        let _ = timeline.schedule(Duration::from_millis(6), 2);

        assert_eq!(timeline.cancel_all(), 2);
        assert!(timeline.is_empty());
        assert!(timeline.pop_due(Duration::MAX).is_none());
    }
}
