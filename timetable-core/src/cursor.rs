//! The day currently being viewed.

use chrono::{DateTime, Utc};

use crate::day_clock::{DayKey, Direction};
use crate::day_index::DayIndex;
use crate::event::Event;
use crate::next_event::next_event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationCursor {
    current_day: DayKey,
}

impl NavigationCursor {
    /// Pick the most relevant day to open on:
    ///
    /// 1. the day of the soonest event that has not ended,
    /// 2. else the first day with events from today on,
    /// 3. else the last day with events,
    /// 4. else today.
    pub fn initialize(events: &[Event], index: &DayIndex, now: DateTime<Utc>) -> Self {
        let today = index.clock().today(now);

        let current_day = next_event(events, now)
            .map(|event| index.key_of(event.start))
            .or_else(|| index.first_day_on_or_after(today))
            .or_else(|| index.last_day())
            .unwrap_or(today);

        NavigationCursor { current_day }
    }

    pub fn at(day: DayKey) -> Self {
        NavigationCursor { current_day: day }
    }

    pub fn current_day(&self) -> DayKey {
        self.current_day
    }

    pub fn jump_to(&mut self, day: DayKey) {
        self.current_day = day;
    }

    /// Move to the next day with events. Returns false (and stays put) if
    /// there is none within `max_search_days`.
    pub fn move_next(&mut self, index: &DayIndex, max_search_days: u32) -> bool {
        self.step(index, Direction::Forward, max_search_days)
    }

    pub fn move_prev(&mut self, index: &DayIndex, max_search_days: u32) -> bool {
        self.step(index, Direction::Backward, max_search_days)
    }

    pub fn can_move_next(&self, index: &DayIndex, max_search_days: u32) -> bool {
        self.target(index, Direction::Forward, max_search_days).is_some()
    }

    pub fn can_move_prev(&self, index: &DayIndex, max_search_days: u32) -> bool {
        self.target(index, Direction::Backward, max_search_days).is_some()
    }

    fn step(&mut self, index: &DayIndex, direction: Direction, max_search_days: u32) -> bool {
        match self.target(index, direction, max_search_days) {
            Some(day) => {
                self.current_day = day;
                true
            }
            None => false,
        }
    }

    fn target(
        &self,
        index: &DayIndex,
        direction: Direction,
        max_search_days: u32,
    ) -> Option<DayKey> {
        index
            .nearest_day_with_events(self.current_day, direction, max_search_days)
            .filter(|day| *day != self.current_day)
    }
}
