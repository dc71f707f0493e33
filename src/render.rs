//! Colored terminal rendering for timetable types.

use chrono::{DateTime, Datelike, Utc};
use owo_colors::OwoColorize;
use timetable_core::{DayClock, DayKey, Event, FeedStatus, Timetable};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DayKey {
    /// e.g. "Monday, 17th March"
    fn render(&self) -> String {
        let date = self.date();
        format!(
            "{}, {} {}",
            date.format("%A"),
            ordinal(date.day()),
            date.format("%B")
        )
    }
}

impl Render for FeedStatus {
    fn render(&self) -> String {
        match self {
            FeedStatus::Unconfigured => "No timetable link set".yellow().to_string(),
            FeedStatus::Pending => "Loading…".dimmed().to_string(),
            FeedStatus::Ready { loaded_at } => {
                format!("Updated {}", loaded_at.format("%H:%M UTC"))
                    .dimmed()
                    .to_string()
            }
            FeedStatus::Failed {
                error,
                last_success: Some(at),
            } => format!(
                "Showing timetable from {} (reload failed: {})",
                at.format("%Y-%m-%d %H:%M UTC"),
                error
            )
            .red()
            .to_string(),
            FeedStatus::Failed {
                error,
                last_success: None,
            } => error.red().to_string(),
        }
    }
}

/// "1st", "2nd", "3rd", "4th", ... with the teens as "th".
fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

fn format_time(clock: &DayClock, instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&clock.timezone())
        .format("%H:%M")
        .to_string()
}

/// Time column for an event, e.g. "09:00-10:00" or "all-day".
pub fn render_time_range(clock: &DayClock, event: &Event) -> String {
    if event.all_day {
        return format!("{:<11}", "all-day");
    }
    format!(
        "{}-{}",
        format_time(clock, event.start),
        format_time(clock, event.end)
    )
}

/// One event row plus its detail lines.
pub fn render_event(timetable: &Timetable, event: &Event) -> Vec<String> {
    let clock = timetable.clock();
    let is_next = timetable.is_next(event);

    let time = render_time_range(clock, event);
    let title = event.to_string();
    let marker = if is_next { "▶" } else { " " };

    let mut lines = vec![if is_next {
        format!("{} {} {}", marker.green(), time.green(), title.green().bold())
    } else {
        format!("{} {} {}", marker, time, title.bold())
    }];

    let subtitle = match (&event.location, event.course_code.is_empty()) {
        (Some(location), false) => format!("{} | {}", event.course_code, location),
        (Some(location), true) => location.clone(),
        (None, false) => event.course_code.clone(),
        (None, true) => String::new(),
    };
    if !subtitle.is_empty() {
        lines.push(format!("              {}", subtitle.dimmed()));
    }

    if timetable.is_expanded(event) {
        if let Some(name) = &event.course_name {
            lines.push(format!("              {}", name.italic()));
        }
        if let Some(description) = &event.description {
            for line in description.lines() {
                lines.push(format!("              {}", line.dimmed()));
            }
        }
        lines.push(format!("              {}", format!("id: {}", event.id).dimmed()));
    }

    lines
}

/// The whole day view: header with navigation arrows, events, status line.
pub fn render_day(timetable: &Timetable) -> String {
    let Some(day) = timetable.current_day() else {
        return timetable.status().render();
    };

    let prev = if timetable.can_move_prev() {
        "◀".to_string()
    } else {
        "◀".dimmed().to_string()
    };
    let next = if timetable.can_move_next() {
        "▶".to_string()
    } else {
        "▶".dimmed().to_string()
    };

    let mut lines = vec![format!("{} {} {}", prev, day.render().bold(), next)];

    let events = timetable.current_day_events();
    if events.is_empty() {
        lines.push(format!("  {}", "Nothing scheduled".dimmed()));
    }
    for event in events {
        lines.extend(render_event(timetable, event));
    }

    if !matches!(timetable.status(), FeedStatus::Ready { .. }) {
        lines.push(String::new());
        lines.push(timetable.status().render());
    }

    lines.join("\n")
}
