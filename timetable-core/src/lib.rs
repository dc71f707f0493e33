//! Core of timetable: load an iCalendar feed, group its events by day and
//! navigate between days.
//!
//! - [`ics::parse_feed`] turns feed text into [`Event`]s
//! - [`DayIndex`] groups them by [`DayKey`] under one [`DayClock`]
//! - [`NavigationCursor`] moves between days that have events
//! - [`NextEventTracker`] follows the next event that has not ended
//! - [`Timetable`] owns all of the above; [`TimetableService`] adds the
//!   feed download and URL storage around it

pub mod config;
pub mod course;
pub mod cursor;
pub mod day_clock;
pub mod day_index;
pub mod error;
pub mod event;
pub mod fetch;
pub mod ics;
pub mod next_event;
pub mod service;
pub mod store;
pub mod timetable;

pub use config::{CursorPolicy, Settings};
pub use cursor::NavigationCursor;
pub use day_clock::{DayClock, DayKey, Direction};
pub use day_index::{DEFAULT_MAX_SEARCH_DAYS, DayIndex};
pub use error::{TimetableError, TimetableResult};
pub use event::Event;
pub use fetch::{FeedFetcher, HttpFeedFetcher};
pub use next_event::NextEventTracker;
pub use service::TimetableService;
pub use store::{ConfigStore, MemoryStore, TomlFileStore};
pub use timetable::{FeedStatus, FetchTicket, RefreshOutcome, Timetable};
