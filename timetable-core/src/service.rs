//! Async façade tying the engine to a feed source and a URL store.

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::day_clock::DayKey;
use crate::error::TimetableResult;
use crate::event::Event;
use crate::fetch::FeedFetcher;
use crate::store::{CALENDAR_URL_KEY, ConfigStore};
use crate::timetable::{FeedStatus, RefreshOutcome, Timetable};

pub struct TimetableService<F, S> {
    timetable: Timetable,
    fetcher: F,
    store: S,
}

impl<F: FeedFetcher, S: ConfigStore> TimetableService<F, S> {
    pub fn new(settings: Settings, fetcher: F, store: S) -> TimetableResult<Self> {
        Ok(TimetableService {
            timetable: Timetable::new(settings)?,
            fetcher,
            store,
        })
    }

    /// Read the stored URL and load it.
    ///
    /// Returns `Ok(None)` when no URL has been stored yet; the status is
    /// then [`FeedStatus::Unconfigured`].
    pub async fn load(&mut self, now: DateTime<Utc>) -> TimetableResult<Option<RefreshOutcome>> {
        let stored = self
            .store
            .get(CALENDAR_URL_KEY)?
            .filter(|url| !url.trim().is_empty());

        let Some(url) = stored else {
            tracing::debug!("no calendar URL stored");
            return Ok(None);
        };

        self.timetable.set_calendar_url(&url)?;
        self.refresh(now).await.map(Some)
    }

    /// Persist a new calendar URL and load it.
    pub async fn set_calendar_url(
        &mut self,
        url: &str,
        now: DateTime<Utc>,
    ) -> TimetableResult<RefreshOutcome> {
        self.timetable.set_calendar_url(url)?;
        self.store.set(CALENDAR_URL_KEY, url.trim())?;
        self.refresh(now).await
    }

    /// Fetch and apply the configured feed.
    ///
    /// Feed failures are not errors here: they come back as
    /// [`RefreshOutcome::Failed`] with the previous timetable still in place.
    /// Only a missing URL is reported as `Err`.
    ///
    /// Queueing happens in the engine. If a fetch started through
    /// [`Self::timetable_mut`] still holds the slot, this returns
    /// [`RefreshOutcome::Stale`] without fetching and the request stays
    /// queued for whoever finishes that fetch.
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> TimetableResult<RefreshOutcome> {
        let Some(ticket) = self.timetable.begin_refresh()? else {
            return Ok(RefreshOutcome::Stale);
        };

        let fetched = self.fetcher.fetch(&ticket.url).await;
        Ok(self.timetable.finish_refresh(&ticket, fetched, now))
    }

    pub fn calendar_url(&self) -> TimetableResult<Option<String>> {
        self.store.get(CALENDAR_URL_KEY)
    }

    pub fn status(&self) -> &FeedStatus {
        self.timetable.status()
    }

    pub fn current_day(&self) -> Option<DayKey> {
        self.timetable.current_day()
    }

    pub fn current_day_events(&self) -> &[Event] {
        self.timetable.current_day_events()
    }

    pub fn can_move_prev(&self) -> bool {
        self.timetable.can_move_prev()
    }

    pub fn can_move_next(&self) -> bool {
        self.timetable.can_move_next()
    }

    pub fn move_prev(&mut self) -> bool {
        self.timetable.move_prev()
    }

    pub fn move_next(&mut self) -> bool {
        self.timetable.move_next()
    }

    pub fn next_event(&self) -> Option<&Event> {
        self.timetable.next_event()
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    pub fn timetable_mut(&mut self) -> &mut Timetable {
        &mut self.timetable
    }
}

