//! Timetable event type.
//!
//! Events are produced once per feed load by [`crate::ics::parse_feed`] and
//! never mutated afterwards; a refetch replaces the whole set.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::course::derive_course;

/// One scheduled occurrence from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// UID from the feed, stable across refetches
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Derived from the first line of the description
    pub course_code: String,
    /// Derived from the second line of the description
    pub course_name: Option<String>,
    /// DTSTART was a plain date
    pub all_day: bool,
}

impl Event {
    /// Build an event, deriving the course fields from `description`.
    pub fn new(
        id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: impl Into<String>,
        location: Option<String>,
        description: Option<String>,
    ) -> Self {
        let course = derive_course(description.as_deref().unwrap_or_default());
        Event {
            id: id.into(),
            start,
            end,
            summary: summary.into(),
            location,
            description,
            course_code: course.code,
            course_name: course.name,
            all_day: false,
        }
    }

    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Whether the event is still relevant at `now` (has not ended).
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.end > now
    }

    /// Whether `now` falls inside the event.
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.summary.is_empty() {
            write!(f, "(No title)")
        } else {
            write!(f, "{}", self.summary)
        }
    }
}
