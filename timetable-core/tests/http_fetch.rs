use std::time::Duration;

use chrono::{TimeZone, Utc};
use timetable_core::{
    FeedFetcher, HttpFeedFetcher, MemoryStore, RefreshOutcome, Settings, TimetableError,
    TimetableService,
};

const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:seminar@uni\r\n\
SUMMARY:Seminar\r\n\
DTSTART:20250320T100000Z\r\n\
DTEND:20250320T110000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

fn fetcher() -> HttpFeedFetcher {
    HttpFeedFetcher::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/cal.ics")
        .with_status(200)
        .with_header("content-type", "text/calendar")
        .with_body(FEED)
        .create_async()
        .await;

    let body = fetcher()
        .fetch(&format!("{}/cal.ics", server.url()))
        .await
        .unwrap();

    assert_eq!(body, FEED);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_network_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/cal.ics")
        .with_status(404)
        .create_async()
        .await;

    let err = fetcher()
        .fetch(&format!("{}/cal.ics", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, TimetableError::Network(ref msg) if msg.contains("404")));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Port 9 (discard) on localhost is not expected to be listening
    let err = fetcher()
        .fetch("http://127.0.0.1:9/cal.ics")
        .await
        .unwrap_err();

    assert!(err.is_feed_failure());
}

#[tokio::test]
async fn test_service_loads_over_http() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/feeds/me.ics")
        .with_status(200)
        .with_body(FEED)
        .create_async()
        .await;

    let mut service =
        TimetableService::new(Settings::default(), fetcher(), MemoryStore::new()).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 20, 8, 0, 0).unwrap();

    let outcome = service
        .set_calendar_url(&format!("{}/feeds/me.ics", server.url()), now)
        .await
        .unwrap();

    assert_eq!(outcome, RefreshOutcome::Applied { events: 1, days: 1 });
    assert_eq!(service.current_day_events()[0].summary, "Seminar");
}
