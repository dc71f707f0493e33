//! Error types for timetable.

use thiserror::Error;

/// Errors that can occur while loading or navigating a timetable.
#[derive(Error, Debug)]
pub enum TimetableError {
    /// Fetch failed: offline, DNS, timeout or a non-2xx response.
    #[error("Network error: {0}")]
    Network(String),

    /// Text was retrieved but is not calendar data.
    #[error("Malformed feed: {0}")]
    MalformedFeed(String),

    #[error("No calendar URL configured")]
    EmptyCalendarUrl,

    #[error("Invalid calendar URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TimetableError {
    /// Errors that leave the previously loaded timetable in place.
    pub fn is_feed_failure(&self) -> bool {
        matches!(
            self,
            TimetableError::Network(_) | TimetableError::MalformedFeed(_)
        )
    }
}

impl From<reqwest::Error> for TimetableError {
    fn from(err: reqwest::Error) -> Self {
        TimetableError::Network(err.to_string())
    }
}

/// Result type alias for timetable operations.
pub type TimetableResult<T> = Result<T, TimetableError>;
