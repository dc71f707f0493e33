pub mod day;
pub mod days;
pub mod next;
pub mod url;
pub mod watch;

use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use timetable_core::{
    HttpFeedFetcher, RefreshOutcome, Settings, TimetableService, TomlFileStore,
};

use crate::utils::tui::create_spinner;

pub type Service = TimetableService<HttpFeedFetcher, TomlFileStore>;

pub const UNCONFIGURED_MESSAGE: &str =
    "You haven't set a link to your timetable yet! Run `timetable url <URL>`";

/// Build a service from the user's settings and stored URL.
pub fn open_service() -> Result<Service> {
    let settings = Settings::load()?;
    let fetcher = HttpFeedFetcher::new(settings.fetch_timeout())?;
    let store = TomlFileStore::open_default()?;
    Ok(TimetableService::new(settings, fetcher, store)?)
}

/// Open the service and load the stored feed behind a spinner.
///
/// Returns `None` (after telling the user) when no URL is configured.
pub async fn open_and_load() -> Result<Option<Service>> {
    let mut service = open_service()?;

    let spinner = create_spinner("Loading timetable");
    let outcome = service.load(Utc::now()).await;
    spinner.finish_and_clear();

    match outcome? {
        None => {
            println!("{}", UNCONFIGURED_MESSAGE.yellow());
            Ok(None)
        }
        Some(RefreshOutcome::Failed(error)) => {
            println!("{}", format!("Could not load timetable: {}", error).red());
            Ok(Some(service))
        }
        Some(_) => Ok(Some(service)),
    }
}
