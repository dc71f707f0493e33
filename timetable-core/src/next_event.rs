//! Tracking the next event that has not ended yet.
//!
//! The tracker only stores a position into the event list it was last given;
//! the owner passes the same list back in on every call. It does not read
//! the wall clock: the host drives [`NextEventTracker::tick`] from whatever
//! timer it has and stops the tracker when its view is not shown.

use chrono::{DateTime, Duration, Utc};

use crate::event::Event;

/// How often, in seconds, the next event is recomputed while the tracker
/// is active.
pub const DEFAULT_REFRESH_SECS: i64 = 60;

/// Position of the soonest-starting event with `end > now`.
///
/// Ties on `start` go to the event that comes first in `events`.
pub fn next_event_index(events: &[Event], now: DateTime<Utc>) -> Option<usize> {
    events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_upcoming(now))
        // min_by_key keeps the first of equal keys
        .min_by_key(|(_, e)| e.start)
        .map(|(i, _)| i)
}

pub fn next_event(events: &[Event], now: DateTime<Utc>) -> Option<&Event> {
    next_event_index(events, now).map(|i| &events[i])
}

#[derive(Debug, Clone)]
pub struct NextEventTracker {
    interval: Duration,
    active: bool,
    /// Set when the events changed while inactive
    stale: bool,
    last_run: Option<DateTime<Utc>>,
    current: Option<usize>,
}

impl Default for NextEventTracker {
    fn default() -> Self {
        NextEventTracker::new(Duration::seconds(DEFAULT_REFRESH_SECS))
    }
}

impl NextEventTracker {
    pub fn new(interval: Duration) -> Self {
        NextEventTracker {
            interval,
            active: false,
            stale: true,
            last_run: None,
            current: None,
        }
    }

    /// Position of the current next event in the list last passed in.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current<'a>(&self, events: &'a [Event]) -> Option<&'a Event> {
        self.current.and_then(|i| events.get(i))
    }

    /// Begin periodic refreshes and recompute immediately.
    pub fn start(&mut self, events: &[Event], now: DateTime<Utc>) {
        self.active = true;
        self.recompute(events, now);
    }

    /// Stop periodic refreshes. The last computed value stays readable.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Periodic refresh. Recomputes when active and the interval has
    /// elapsed since the last run; returns whether the next event changed.
    pub fn tick(&mut self, events: &[Event], now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        let due = match self.last_run {
            Some(last) => now - last >= self.interval || now < last,
            None => true,
        };
        if !due {
            return false;
        }
        self.recompute(events, now)
    }

    /// The event list was replaced. Recomputes at once when active;
    /// otherwise the next `start` picks it up.
    pub fn events_replaced(&mut self, events: &[Event], now: DateTime<Utc>) -> bool {
        if self.active {
            self.recompute(events, now)
        } else {
            self.stale = true;
            // The old position no longer points into the new list
            self.current = None;
            false
        }
    }

    /// Time until the next tick is due, `None` when stopped. Hosts sleep for
    /// this long between ticks.
    pub fn due_in(&self, now: DateTime<Utc>) -> Option<Duration> {
        if !self.active {
            return None;
        }
        let due_at = self.last_run.map(|last| last + self.interval)?;
        Some((due_at - now).max(Duration::zero()))
    }

    fn recompute(&mut self, events: &[Event], now: DateTime<Utc>) -> bool {
        let next = next_event_index(events, now);
        let changed = self.stale || next != self.current;

        self.current = next;
        self.last_run = Some(now);
        self.stale = false;

        if changed {
            tracing::debug!(
                next = ?self.current(events).map(|e| e.id.as_str()),
                "next event changed"
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, hour, minute, 0).unwrap()
    }

    fn event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event::new(id, start, end, id, None, None)
    }

    fn sample() -> Vec<Event> {
        vec![
            event("lunch", at(12, 0), at(13, 0)),
            event("morning", at(9, 0), at(10, 0)),
            event("mid", at(11, 0), at(12, 0)),
        ]
    }

    #[test]
    fn test_before_everything_returns_earliest() {
        let events = sample();
        assert_eq!(next_event(&events, at(7, 0)).map(|e| e.id.as_str()), Some("morning"));
    }

    #[test]
    fn test_after_everything_returns_none() {
        let events = sample();
        assert_eq!(next_event(&events, at(13, 0)), None);
        assert_eq!(next_event(&[], at(13, 0)), None);
    }

    #[test]
    fn test_ongoing_event_counts_as_next() {
        let events = sample();
        assert_eq!(next_event(&events, at(9, 30)).map(|e| e.id.as_str()), Some("morning"));
        assert_eq!(next_event(&events, at(10, 0)).map(|e| e.id.as_str()), Some("mid"));
    }

    #[test]
    fn test_ties_go_to_input_order() {
        let events = vec![
            event("listed-first", at(9, 0), at(9, 30)),
            event("other", at(9, 0), at(10, 0)),
        ];
        assert_eq!(next_event_index(&events, at(8, 0)), Some(0));
    }

    #[test]
    fn test_tick_respects_interval_and_lifecycle() {
        let events = sample();
        let mut tracker = NextEventTracker::default();

        // Stopped trackers ignore ticks
        assert!(!tracker.tick(&events, at(8, 0)));
        assert_eq!(tracker.due_in(at(8, 0)), None);

        tracker.start(&events, at(8, 0));
        assert_eq!(tracker.current(&events).map(|e| e.id.as_str()), Some("morning"));
        assert_eq!(tracker.due_in(at(8, 0)), Some(Duration::seconds(60)));

        // Not due yet
        assert!(!tracker.tick(&events, at(8, 0) + Duration::seconds(30)));

        assert!(tracker.tick(&events, at(10, 0)));
        assert_eq!(tracker.current(&events).map(|e| e.id.as_str()), Some("mid"));

        tracker.stop();
        assert!(!tracker.tick(&events, at(12, 30)));
        assert_eq!(tracker.current(&events).map(|e| e.id.as_str()), Some("mid"));
    }

    #[test]
    fn test_events_replaced_while_stopped_recomputes_on_start() {
        let events = sample();
        let mut tracker = NextEventTracker::default();
        tracker.start(&events, at(8, 0));
        tracker.stop();

        let replaced = vec![event("evening", at(18, 0), at(19, 0))];
        assert!(!tracker.events_replaced(&replaced, at(8, 0)));
        assert_eq!(tracker.current(&replaced), None);

        tracker.start(&replaced, at(8, 0));
        assert_eq!(tracker.current(&replaced).map(|e| e.id.as_str()), Some("evening"));
    }

    #[test]
    fn test_events_replaced_while_active_recomputes_at_once() {
        let events = sample();
        let mut tracker = NextEventTracker::default();
        tracker.start(&events, at(8, 0));

        let replaced = vec![event("evening", at(18, 0), at(19, 0))];
        assert!(tracker.events_replaced(&replaced, at(8, 0) + Duration::seconds(5)));
        assert_eq!(tracker.current_index(), Some(0));
    }
}
