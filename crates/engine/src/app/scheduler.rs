use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Delayed actions keyed by simulation time.
///
/// Nothing fires on its own: the owner advances the clock with [`Scheduler::pop_due`]
/// and dispatches each returned event before asking for the next one, so actions
/// scheduled while dispatching can still fire within the same advance.
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<ScheduledEntry<E>>,
}

#[derive(Debug)]
struct ScheduledEntry<E> {
    fire_at: Duration,
    seq: u64,
    event: E,
}

impl<E> PartialEq for ScheduledEntry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl<E> Eq for ScheduledEntry<E> {}

impl<E> PartialOrd for ScheduledEntry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for ScheduledEntry<E> {
    // BinaryHeap is a max-heap; earliest fire time (then earliest insertion) wins.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_fire_time(&self) -> Option<Duration> {
        self.queue.peek().map(|entry| entry.fire_at)
    }

    pub fn schedule_in(&mut self, delay: Duration, event: E) -> Duration {
        let fire_at = self.now.saturating_add(delay);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.queue.push(ScheduledEntry {
            fire_at,
            seq,
            event,
        });
        fire_at
    }

    /// Pops the earliest event due at or before `until`, moving the clock to its fire time.
    pub fn pop_due(&mut self, until: Duration) -> Option<E> {
        if self.queue.peek()?.fire_at > until {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.fire_at);
        Some(entry.event)
    }

    pub fn finish_advance(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Drops every pending action. The clock keeps its current time.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_until(scheduler: &mut Scheduler<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(event) = scheduler.pop_due(until) {
            fired.push(event);
        }
        scheduler.finish_advance(until);
        fired
    }

    #[test]
    fn events_fire_in_time_then_insertion_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(Duration::from_millis(30), "late");
        scheduler.schedule_in(Duration::from_millis(10), "early_a");
        scheduler.schedule_in(Duration::from_millis(10), "early_b");

        let fired = drain_until(&mut scheduler, Duration::from_millis(50));

        assert_eq!(fired, vec!["early_a", "early_b", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(50));
    }

    #[test]
    fn events_after_horizon_stay_pending() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(Duration::from_millis(250), "strike");
        scheduler.schedule_in(Duration::from_millis(1000), "cooldown");

        assert_eq!(
            drain_until(&mut scheduler, Duration::from_millis(250)),
            vec!["strike"]
        );
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(
            scheduler.next_fire_time(),
            Some(Duration::from_millis(1000))
        );
    }

    #[test]
    fn pop_moves_clock_to_fire_time_for_chained_scheduling() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(Duration::from_millis(100), "step_1");

        let first = scheduler.pop_due(Duration::from_millis(250));
        assert_eq!(first, Some("step_1"));
        assert_eq!(scheduler.now(), Duration::from_millis(100));

        let chained_at = scheduler.schedule_in(Duration::from_millis(100), "step_2");
        assert_eq!(chained_at, Duration::from_millis(200));
        assert_eq!(scheduler.pop_due(Duration::from_millis(250)), Some("step_2"));
        assert_eq!(scheduler.pop_due(Duration::from_millis(250)), None);
    }

    #[test]
    fn clear_drops_pending_but_keeps_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(Duration::from_millis(5), "a");
        scheduler.finish_advance(Duration::from_millis(40));
        scheduler.clear();

        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.now(), Duration::from_millis(40));
    }
}
