use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;

use super::open_and_load;
use crate::render::{Render, render_event};

pub async fn run(json: bool) -> Result<()> {
    let Some(mut service) = open_and_load().await? else {
        return Ok(());
    };

    let now = Utc::now();
    let timetable = service.timetable_mut();
    timetable.activate(now);

    match timetable.next_event() {
        Some(event) if json => println!("{}", serde_json::to_string_pretty(event)?),
        Some(event) => {
            let day = timetable.clock().key_of(event.start);
            let label = if event.is_ongoing(now) { "Now" } else { "Next" };
            println!("{} {}", label.bold(), day.render().dimmed());
            println!("{}", render_event(timetable, event).join("\n"));
        }
        None if json => println!("null"),
        None => println!("{}", "No upcoming events".dimmed()),
    }

    timetable.deactivate();
    Ok(())
}
