use anyhow::Result;
use owo_colors::OwoColorize;

use super::open_and_load;
use crate::render::Render;

pub async fn run() -> Result<()> {
    let Some(service) = open_and_load().await? else {
        return Ok(());
    };

    let index = service.timetable().index();
    if index.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for day in index.days() {
        let count = index.events_on(day).len();
        let label = format!("({} {})", count, if count == 1 { "event" } else { "events" });
        println!("{}  {}  {}", day, day.render(), label.dimmed());
    }

    println!();
    println!(
        "{}",
        format!("{} events on {} days", index.event_count(), index.len()).dimmed()
    );

    Ok(())
}
