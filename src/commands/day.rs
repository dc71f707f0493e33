use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use timetable_core::DayKey;

use super::open_and_load;
use crate::render::render_day;

pub struct DayOptions {
    pub date: Option<String>,
    pub forward: u32,
    pub back: u32,
    pub expand: Option<String>,
    pub json: bool,
}

pub async fn run(options: DayOptions) -> Result<()> {
    let Some(mut service) = open_and_load().await? else {
        return Ok(());
    };

    let now = Utc::now();
    let timetable = service.timetable_mut();
    timetable.activate(now);

    if let Some(date) = &options.date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date))?;
        timetable.jump_to(DayKey::new(date));
    }

    for _ in 0..options.forward {
        if !timetable.move_next() {
            break;
        }
    }
    for _ in 0..options.back {
        if !timetable.move_prev() {
            break;
        }
    }

    if let Some(id) = &options.expand {
        timetable.toggle_expanded(id);
    }

    if options.json {
        let next_id = timetable.next_event().map(|e| e.id.clone());
        let view = json!({
            "day": timetable.current_day().map(|d| d.to_string()),
            "timezone": timetable.clock().timezone().to_string(),
            "can_move_prev": timetable.can_move_prev(),
            "can_move_next": timetable.can_move_next(),
            "next_event_id": next_id,
            "events": timetable.current_day_events(),
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", render_day(timetable));
    }

    timetable.deactivate();
    Ok(())
}
