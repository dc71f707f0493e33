use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use timetable_core::RefreshOutcome;

use super::{UNCONFIGURED_MESSAGE, open_service};
use crate::utils::tui::create_spinner;

pub async fn run(url: Option<String>) -> Result<()> {
    let mut service = open_service()?;

    let Some(url) = url else {
        match service.calendar_url()? {
            Some(url) => println!("{}", url),
            None => println!("{}", UNCONFIGURED_MESSAGE.yellow()),
        }
        return Ok(());
    };

    let spinner = create_spinner("Checking timetable link");
    let outcome = service.set_calendar_url(&url, Utc::now()).await;
    spinner.finish_and_clear();

    match outcome? {
        RefreshOutcome::Applied { events, days } => {
            println!(
                "{} Loaded {} events on {} days",
                "✓".green(),
                events,
                days
            );
        }
        RefreshOutcome::Failed(error) => {
            // The link is saved anyway; the feed may just be down
            println!("{} Saved link, but loading failed: {}", "!".yellow(), error.red());
        }
        RefreshOutcome::Stale => {}
    }

    Ok(())
}
