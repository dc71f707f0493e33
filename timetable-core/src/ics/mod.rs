//! ICS feed handling.

mod parse;

pub use parse::parse_feed;
