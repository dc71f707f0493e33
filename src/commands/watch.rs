use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};

use super::{Service, open_and_load};
use crate::render::render_day;

pub async fn run() -> Result<()> {
    let Some(mut service) = open_and_load().await? else {
        return Ok(());
    };

    let feed_period = service.timetable().settings().feed_refresh_interval();
    let mut reloads = interval_at(Instant::now() + feed_period, feed_period);
    reloads.set_missed_tick_behavior(MissedTickBehavior::Skip);

    service.timetable_mut().activate(Utc::now());
    redraw(&service);

    loop {
        let until_tick = service
            .timetable()
            .tracker()
            .due_in(Utc::now())
            .and_then(|d| d.to_std().ok())
            .unwrap_or(Duration::from_secs(1));

        tokio::select! {
            _ = sleep(until_tick) => {
                if service.timetable_mut().tick(Utc::now()) {
                    redraw(&service);
                }
            }
            _ = reloads.tick() => {
                let outcome = service.refresh(Utc::now()).await?;
                tracing::info!(?outcome, "periodic reload finished");
                redraw(&service);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    service.timetable_mut().deactivate();
    println!();
    println!("{}", "Stopped watching".dimmed());
    Ok(())
}

fn redraw(service: &Service) {
    println!();
    println!("{}", render_day(service.timetable()));
}
