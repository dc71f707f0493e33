//! The timetable engine: everything a day view needs, in one owned value.
//!
//! Nothing in here performs I/O or reads the clock. Loading a feed is split
//! into [`Timetable::begin_refresh`] and [`Timetable::finish_refresh`] so the
//! host can await the download in between while the previous events stay
//! queryable. Each fetch gets a sequence number; a result that comes back
//! for anything but the latest sequence is thrown away.

use chrono::{DateTime, Utc};

use crate::config::{CursorPolicy, Settings};
use crate::cursor::NavigationCursor;
use crate::day_clock::{DayClock, DayKey};
use crate::day_index::DayIndex;
use crate::error::{TimetableError, TimetableResult};
use crate::event::Event;
use crate::fetch::normalize_url;
use crate::ics::parse_feed;
use crate::next_event::NextEventTracker;

/// Load state shown alongside the day view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// No calendar URL configured yet.
    Unconfigured,
    /// A URL is set but nothing has loaded yet.
    Pending,
    Ready { loaded_at: DateTime<Utc> },
    /// The last load failed; the events from `last_success` (if any) are
    /// still shown.
    Failed {
        error: String,
        last_success: Option<DateTime<Utc>>,
    },
}

/// Permission to run one fetch, handed out by [`Timetable::begin_refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New events were swapped in.
    Applied { events: usize, days: usize },
    /// The load failed and the previous timetable was kept.
    Failed(String),
    /// A newer fetch was started (or this one abandoned) in the meantime.
    Stale,
}

pub struct Timetable {
    clock: DayClock,
    settings: Settings,
    url: Option<String>,
    events: Vec<Event>,
    index: DayIndex,
    cursor: Option<NavigationCursor>,
    tracker: NextEventTracker,
    status: FeedStatus,
    fetch_seq: u64,
    in_flight: Option<u64>,
    refresh_queued: bool,
    /// Pick a fresh day on the next successful load
    reinit_cursor: bool,
    expanded: Option<String>,
}

impl Timetable {
    pub fn new(settings: Settings) -> TimetableResult<Self> {
        let clock = settings.day_clock()?;
        let tracker = NextEventTracker::new(settings.refresh_interval());

        Ok(Timetable {
            clock,
            settings,
            url: None,
            events: Vec::new(),
            index: DayIndex::build(&[], clock),
            cursor: None,
            tracker,
            status: FeedStatus::Unconfigured,
            fetch_seq: 0,
            in_flight: None,
            refresh_queued: false,
            reinit_cursor: true,
            expanded: None,
        })
    }

    // =========================================================================
    // Feed loading
    // =========================================================================

    /// Point the timetable at a new feed. Any fetch still running for the
    /// old URL is abandoned; the old events stay until the new feed loads,
    /// and a different URL re-picks the viewed day when it does.
    pub fn set_calendar_url(&mut self, url: &str) -> TimetableResult<()> {
        normalize_url(url)?;
        let url = url.trim().to_string();
        if self.url.as_ref() != Some(&url) {
            self.reinit_cursor = true;
        }
        self.url = Some(url);
        self.abandon_refresh();
        self.refresh_queued = false;
        if self.last_success().is_none() {
            self.status = FeedStatus::Pending;
        }
        Ok(())
    }

    pub fn calendar_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Start a fetch. Returns `Ok(None)` when one is already running; the
    /// request is then remembered and reported by `take_queued_refresh`.
    pub fn begin_refresh(&mut self) -> TimetableResult<Option<FetchTicket>> {
        let url = self.url.clone().ok_or(TimetableError::EmptyCalendarUrl)?;

        if self.in_flight.is_some() {
            tracing::debug!("fetch already in flight, queueing refresh");
            self.refresh_queued = true;
            return Ok(None);
        }

        self.fetch_seq += 1;
        self.in_flight = Some(self.fetch_seq);
        Ok(Some(FetchTicket {
            seq: self.fetch_seq,
            url,
        }))
    }

    /// Apply the result of the fetch started with `ticket`.
    pub fn finish_refresh(
        &mut self,
        ticket: &FetchTicket,
        fetched: TimetableResult<String>,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        if self.in_flight == Some(ticket.seq) {
            self.in_flight = None;
        }
        if ticket.seq != self.fetch_seq {
            tracing::debug!(seq = ticket.seq, latest = self.fetch_seq, "discarding stale fetch");
            return RefreshOutcome::Stale;
        }

        match fetched.and_then(|text| parse_feed(&text, &self.clock)) {
            Ok(events) => {
                let count = events.len();
                self.replace_events(events, now);
                self.status = FeedStatus::Ready { loaded_at: now };
                RefreshOutcome::Applied {
                    events: count,
                    days: self.index.len(),
                }
            }
            Err(err) => {
                tracing::warn!(
                    url = %ticket.url,
                    error = %err,
                    "calendar load failed, keeping previous timetable"
                );
                self.status = FeedStatus::Failed {
                    error: err.to_string(),
                    last_success: self.last_success(),
                };
                RefreshOutcome::Failed(err.to_string())
            }
        }
    }

    /// Whether a refresh was requested while another was in flight. Clears
    /// the flag.
    pub fn take_queued_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh_queued)
    }

    /// Forget the running fetch; its result will be discarded when it lands.
    pub fn abandon_refresh(&mut self) {
        if self.in_flight.take().is_some() {
            tracing::debug!(seq = self.fetch_seq, "abandoning in-flight fetch");
        }
        // Bumping the sequence invalidates any ticket handed out so far
        self.fetch_seq += 1;
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Swap in a freshly parsed event set.
    pub fn replace_events(&mut self, events: Vec<Event>, now: DateTime<Utc>) {
        self.index = DayIndex::build(&events, self.clock);
        self.events = events;

        let reinit = std::mem::take(&mut self.reinit_cursor)
            || self.cursor.is_none()
            || self.settings.cursor_on_refresh == CursorPolicy::Reset;
        if reinit {
            self.cursor = Some(NavigationCursor::initialize(&self.events, &self.index, now));
        }

        let expanded_gone = self
            .expanded
            .as_ref()
            .is_some_and(|id| !self.events.iter().any(|e| &e.id == id));
        if expanded_gone {
            self.expanded = None;
        }

        self.tracker.events_replaced(&self.events, now);
        tracing::debug!(
            events = self.events.len(),
            days = self.index.len(),
            "timetable rebuilt"
        );
    }

    fn last_success(&self) -> Option<DateTime<Utc>> {
        match &self.status {
            FeedStatus::Ready { loaded_at } => Some(*loaded_at),
            FeedStatus::Failed { last_success, .. } => *last_success,
            FeedStatus::Unconfigured | FeedStatus::Pending => None,
        }
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    // =========================================================================
    // Day navigation
    // =========================================================================

    /// Day being viewed. `None` until the first successful load.
    pub fn current_day(&self) -> Option<DayKey> {
        self.cursor.map(|c| c.current_day())
    }

    pub fn current_day_events(&self) -> &[Event] {
        match self.cursor {
            Some(cursor) => self.index.events_on(cursor.current_day()),
            None => &[],
        }
    }

    pub fn can_move_next(&self) -> bool {
        self.cursor
            .is_some_and(|c| c.can_move_next(&self.index, self.settings.max_search_days))
    }

    pub fn can_move_prev(&self) -> bool {
        self.cursor
            .is_some_and(|c| c.can_move_prev(&self.index, self.settings.max_search_days))
    }

    pub fn move_next(&mut self) -> bool {
        let max = self.settings.max_search_days;
        match self.cursor.as_mut() {
            Some(cursor) => cursor.move_next(&self.index, max),
            None => false,
        }
    }

    pub fn move_prev(&mut self) -> bool {
        let max = self.settings.max_search_days;
        match self.cursor.as_mut() {
            Some(cursor) => cursor.move_prev(&self.index, max),
            None => false,
        }
    }

    /// Show an arbitrary day, with or without events.
    pub fn jump_to(&mut self, day: DayKey) {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.jump_to(day),
            None => self.cursor = Some(NavigationCursor::at(day)),
        }
    }

    // =========================================================================
    // Next event
    // =========================================================================

    /// The view became visible: start periodic next-event refreshes.
    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.tracker.start(&self.events, now);
    }

    pub fn deactivate(&mut self) {
        self.tracker.stop();
    }

    /// Host timer callback. Returns whether the next event changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        self.tracker.tick(&self.events, now)
    }

    pub fn next_event(&self) -> Option<&Event> {
        self.tracker.current(&self.events)
    }

    pub fn is_next(&self, event: &Event) -> bool {
        self.next_event().is_some_and(|next| next.id == event.id)
    }

    pub fn tracker(&self) -> &NextEventTracker {
        &self.tracker
    }

    // =========================================================================
    // Expanded event
    // =========================================================================

    /// Expand an event's details, or collapse it if it is already expanded.
    /// Only one event is expanded at a time.
    pub fn toggle_expanded(&mut self, id: &str) {
        if self.expanded.as_deref() == Some(id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id.to_string());
        }
    }

    pub fn expanded_id(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn is_expanded(&self, event: &Event) -> bool {
        self.expanded.as_deref() == Some(event.id.as_str())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn index(&self) -> &DayIndex {
        &self.index
    }

    pub fn clock(&self) -> &DayClock {
        &self.clock
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
