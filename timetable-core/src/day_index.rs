//! Events grouped by day.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use chrono::{DateTime, Utc};

use crate::day_clock::{DayClock, DayKey, Direction};
use crate::event::Event;

/// How far nearest-day searches look before giving up.
pub const DEFAULT_MAX_SEARCH_DAYS: u32 = 365;

/// Events keyed by the day they start on.
///
/// The index is a pure function of the events and clock it was built from,
/// so two builds from the same input compare equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayIndex {
    clock: DayClock,
    days: BTreeMap<DayKey, Vec<Event>>,
}

impl DayIndex {
    /// Group `events` by start day. Each day's events are sorted by start;
    /// equal starts keep their input order.
    pub fn build(events: &[Event], clock: DayClock) -> Self {
        let mut days: BTreeMap<DayKey, Vec<Event>> = BTreeMap::new();
        for event in events {
            days.entry(clock.key_of(event.start))
                .or_default()
                .push(event.clone());
        }
        for day_events in days.values_mut() {
            day_events.sort_by_key(|e| e.start);
        }

        DayIndex { clock, days }
    }

    pub fn clock(&self) -> &DayClock {
        &self.clock
    }

    pub fn key_of(&self, instant: DateTime<Utc>) -> DayKey {
        self.clock.key_of(instant)
    }

    /// Events starting on `day`, earliest first. Empty if none.
    pub fn events_on(&self, day: DayKey) -> &[Event] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_events(&self, day: DayKey) -> bool {
        self.days.contains_key(&day)
    }

    /// The closest day strictly before or after `from` that has events, if
    /// one exists within `max_search_days` days.
    pub fn nearest_day_with_events(
        &self,
        from: DayKey,
        direction: Direction,
        max_search_days: u32,
    ) -> Option<DayKey> {
        let candidate = match direction {
            Direction::Forward => self.days.range((Excluded(from), Unbounded)).next(),
            Direction::Backward => self.days.range(..from).next_back(),
        }
        .map(|(day, _)| *day)?;

        let distance = from.days_until(candidate).unsigned_abs();
        (distance <= u64::from(max_search_days)).then_some(candidate)
    }

    /// Days with events, in ascending order.
    pub fn days(&self) -> impl Iterator<Item = DayKey> + '_ {
        self.days.keys().copied()
    }

    pub fn first_day(&self) -> Option<DayKey> {
        self.days.keys().next().copied()
    }

    pub fn last_day(&self) -> Option<DayKey> {
        self.days.keys().next_back().copied()
    }

    pub fn first_day_on_or_after(&self, day: DayKey) -> Option<DayKey> {
        self.days.range(day..).next().map(|(day, _)| *day)
    }

    /// Number of days with events.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn event(id: &str, day: u32, hour: u32, minutes: i64) -> Event {
        let start = Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap();
        Event::new(
            id,
            start,
            start + chrono::Duration::minutes(minutes),
            id,
            None,
            None,
        )
    }

    fn key(day: u32) -> DayKey {
        DayKey::new(NaiveDate::from_ymd_opt(2025, 3, day).unwrap())
    }

    fn sample() -> Vec<Event> {
        vec![
            event("c", 10, 14, 60),
            event("a", 3, 11, 60),
            event("b", 3, 9, 60),
            event("d", 20, 8, 30),
            event("late", 3, 23, 120),
        ]
    }

    #[test]
    fn test_events_on_matches_start_day_sorted() {
        let events = sample();
        let index = DayIndex::build(&events, DayClock::utc());

        for day in index.days() {
            let mut expected: Vec<&Event> = events
                .iter()
                .filter(|e| index.key_of(e.start) == day)
                .collect();
            expected.sort_by_key(|e| e.start);

            let actual: Vec<&Event> = index.events_on(day).iter().collect();
            assert_eq!(actual, expected, "day {}", day);
        }

        let ids: Vec<&str> = index.events_on(key(3)).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "late"]);
        assert_eq!(index.event_count(), events.len());
    }

    #[test]
    fn test_spanning_midnight_is_keyed_by_start_day() {
        let index = DayIndex::build(&sample(), DayClock::utc());

        assert!(index.events_on(key(3)).iter().any(|e| e.id == "late"));
        assert!(!index.has_events(key(4)));
    }

    #[test]
    fn test_equal_starts_keep_input_order() {
        let events = vec![event("first", 5, 9, 60), event("second", 5, 9, 30)];
        let index = DayIndex::build(&events, DayClock::utc());

        let ids: Vec<&str> = index.events_on(key(5)).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let events = sample();
        assert_eq!(
            DayIndex::build(&events, DayClock::utc()),
            DayIndex::build(&events, DayClock::utc())
        );
    }

    #[test]
    fn test_empty_day_lookup() {
        let index = DayIndex::build(&sample(), DayClock::utc());

        assert!(index.events_on(key(4)).is_empty());
        assert!(!index.has_events(key(4)));
    }

    #[test]
    fn test_nearest_day_skips_empty_days_and_never_returns_from() {
        let index = DayIndex::build(&sample(), DayClock::utc());

        assert_eq!(
            index.nearest_day_with_events(key(3), Direction::Forward, DEFAULT_MAX_SEARCH_DAYS),
            Some(key(10))
        );
        assert_eq!(
            index.nearest_day_with_events(key(10), Direction::Backward, DEFAULT_MAX_SEARCH_DAYS),
            Some(key(3))
        );
        assert_eq!(
            index.nearest_day_with_events(key(15), Direction::Forward, DEFAULT_MAX_SEARCH_DAYS),
            Some(key(20))
        );
        assert_eq!(
            index.nearest_day_with_events(key(20), Direction::Forward, DEFAULT_MAX_SEARCH_DAYS),
            None
        );
        assert_eq!(
            index.nearest_day_with_events(key(3), Direction::Backward, DEFAULT_MAX_SEARCH_DAYS),
            None
        );

        for day in index.days() {
            for direction in [Direction::Forward, Direction::Backward] {
                assert_ne!(
                    index.nearest_day_with_events(day, direction, DEFAULT_MAX_SEARCH_DAYS),
                    Some(day)
                );
            }
        }
    }

    #[test]
    fn test_nearest_day_respects_search_bound() {
        let index = DayIndex::build(&sample(), DayClock::utc());

        assert_eq!(
            index.nearest_day_with_events(key(3), Direction::Forward, 6),
            None
        );
        assert_eq!(
            index.nearest_day_with_events(key(3), Direction::Forward, 7),
            Some(key(10))
        );
    }

    #[test]
    fn test_empty_index_finds_nothing() {
        let index = DayIndex::build(&[], DayClock::utc());

        assert!(index.is_empty());
        assert_eq!(index.first_day(), None);
        for direction in [Direction::Forward, Direction::Backward] {
            assert_eq!(
                index.nearest_day_with_events(key(3), direction, DEFAULT_MAX_SEARCH_DAYS),
                None
            );
        }
    }

    #[test]
    fn test_day_listing_helpers() {
        let index = DayIndex::build(&sample(), DayClock::utc());

        assert_eq!(index.len(), 3);
        assert_eq!(index.first_day(), Some(key(3)));
        assert_eq!(index.last_day(), Some(key(20)));
        assert_eq!(index.first_day_on_or_after(key(10)), Some(key(10)));
        assert_eq!(index.first_day_on_or_after(key(11)), Some(key(20)));
        assert_eq!(index.first_day_on_or_after(key(21)), None);
    }
}
