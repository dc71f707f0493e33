//! Downloading calendar feeds.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::error::{TimetableError, TimetableResult};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw calendar text.
pub trait FeedFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = TimetableResult<String>> + Send;
}

/// Validate a calendar URL, rewriting `webcal://` subscriptions to `https://`.
pub fn normalize_url(raw: &str) -> TimetableResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TimetableError::EmptyCalendarUrl);
    }

    let rewritten = match trimmed.get(..9) {
        Some(prefix) if prefix.eq_ignore_ascii_case("webcal://") => {
            format!("https://{}", &trimmed[9..])
        }
        _ => trimmed.to_string(),
    };

    let url = Url::parse(&rewritten).map_err(|e| TimetableError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TimetableError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Fetches feeds over HTTP(S) with reqwest.
#[derive(Clone)]
pub struct HttpFeedFetcher {
    http: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> TimetableResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("timetable/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpFeedFetcher { http })
    }
}

impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> TimetableResult<String> {
        let url = normalize_url(url)?;
        tracing::debug!(%url, "fetching calendar feed");

        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TimetableError::Network(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }

        let body = response.text().await?;
        tracing::debug!(bytes = body.len(), "feed downloaded");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webcal_is_rewritten_to_https() {
        let url = normalize_url("  webcal://example.edu/timetable.ics ").unwrap();
        assert_eq!(url.as_str(), "https://example.edu/timetable.ics");

        let url = normalize_url("WEBCAL://example.edu/t.ics").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_http_urls_pass_through() {
        let url = normalize_url("http://localhost:8080/cal.ics?token=abc").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/cal.ics?token=abc");
    }

    #[test]
    fn test_rejects_empty_and_unsupported() {
        assert!(matches!(
            normalize_url("   "),
            Err(TimetableError::EmptyCalendarUrl)
        ));
        assert!(matches!(
            normalize_url("ftp://example.edu/cal.ics"),
            Err(TimetableError::InvalidUrl { .. })
        ));
        assert!(matches!(
            normalize_url("not a url"),
            Err(TimetableError::InvalidUrl { .. })
        ));
    }
}
