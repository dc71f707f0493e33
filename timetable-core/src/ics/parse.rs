//! Feed parsing using the icalendar crate's parser.

use chrono::{DateTime, Duration, Utc};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use crate::day_clock::{DayClock, resolve_in};
use crate::error::{TimetableError, TimetableResult};
use crate::event::Event;

/// Parse a whole calendar feed into events, in source order.
///
/// Fails with [`TimetableError::MalformedFeed`] when the text is not a
/// calendar at all. Individual VEVENTs that cannot be turned into an
/// [`Event`] (no UID, unreadable times, `start >= end`) are dropped with a
/// warning instead of failing the feed.
pub fn parse_feed(content: &str, clock: &DayClock) -> TimetableResult<Vec<Event>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if !content.to_ascii_uppercase().contains("BEGIN:VCALENDAR") {
        return Err(TimetableError::MalformedFeed(
            "missing BEGIN:VCALENDAR".to_string(),
        ));
    }

    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(TimetableError::MalformedFeed)?;

    let mut vevents = Vec::new();
    for component in &calendar.components {
        collect_vevents(component, &mut vevents);
    }

    let events: Vec<Event> = vevents
        .into_iter()
        .enumerate()
        .filter_map(|(position, vevent)| match parse_vevent(vevent, clock) {
            Ok(event) => Some(event),
            Err(reason) => {
                tracing::warn!(position, %reason, "dropping malformed VEVENT");
                None
            }
        })
        .collect();

    tracing::debug!(count = events.len(), "parsed feed");
    Ok(events)
}

/// Depth-first walk so VEVENTs nested under VCALENDAR are found either way.
fn collect_vevents<'a>(component: &'a Component<'a>, out: &mut Vec<&'a Component<'a>>) {
    if component.name == "VEVENT" {
        out.push(component);
        return;
    }
    for child in &component.components {
        collect_vevents(child, out);
    }
}

fn parse_vevent(vevent: &Component<'_>, clock: &DayClock) -> Result<Event, String> {
    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .filter(|uid| !uid.trim().is_empty())
        .ok_or("missing UID")?;

    let dtstart = vevent
        .find_prop("DTSTART")
        .ok_or_else(|| format!("{uid}: missing DTSTART"))?;
    let dtstart = DatePerhapsTime::try_from(dtstart)
        .map_err(|_| format!("{uid}: unreadable DTSTART"))?;
    let all_day = matches!(dtstart, DatePerhapsTime::Date(_));
    let start = to_instant(dtstart, clock);

    let end = match vevent.find_prop("DTEND") {
        Some(dtend) => DatePerhapsTime::try_from(dtend)
            .map(|d| to_instant(d, clock))
            .map_err(|_| format!("{uid}: unreadable DTEND"))?,
        None => match vevent.find_prop("DURATION") {
            Some(duration) => start + parse_duration(duration.val.as_ref())
                .ok_or_else(|| format!("{uid}: unreadable DURATION"))?,
            // RFC 5545: a date-only event without DTEND lasts one day
            None if all_day => start + Duration::days(1),
            None => start,
        },
    };

    if start >= end {
        return Err(format!("{uid}: start {start} is not before end {end}"));
    }

    let summary = text_prop(vevent, "SUMMARY").unwrap_or_default();
    let location = text_prop(vevent, "LOCATION").filter(|s| !s.is_empty());
    let description = text_prop(vevent, "DESCRIPTION").filter(|s| !s.is_empty());

    Ok(Event::new(uid, start, end, summary, location, description).with_all_day(all_day))
}

fn text_prop(component: &Component<'_>, name: &str) -> Option<String> {
    component
        .find_prop(name)
        .map(|p: &Property<'_>| p.val.to_string())
}

/// Resolve a feed time to an absolute instant.
///
/// UTC and TZID times keep the zone the feed gave them; floating times and
/// plain dates have no zone and are read in the clock's zone.
fn to_instant(dpt: DatePerhapsTime, clock: &DayClock) -> DateTime<Utc> {
    match dpt {
        DatePerhapsTime::Date(d) => clock.resolve_local(d.and_time(chrono::NaiveTime::MIN)),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => dt,
            CalendarDateTime::Floating(naive) => clock.resolve_local(naive),
            CalendarDateTime::WithTimezone { date_time, tzid } => {
                match tzid.parse::<chrono_tz::Tz>() {
                    Ok(tz) => resolve_in(&tz, date_time),
                    Err(_) => {
                        tracing::warn!(%tzid, "unknown TZID, reading time in the configured zone");
                        clock.resolve_local(date_time)
                    }
                }
            }
        },
    }
}

/// Parse an ISO 8601 DURATION value (`PT1H30M`, `P1D`). Negative durations
/// are rejected.
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.starts_with('-') {
        return None;
    }
    let duration = iso8601::duration(value.trim_start_matches('+')).ok()?;
    let std_duration: std::time::Duration = duration.into();
    Duration::from_std(std_duration).ok()
}
