//! Testing utilities: a mock fetcher and HTML fixtures.
//!
//! ```rust,ignore
//! use job_scraper::testing::{stepstone_card, stepstone_page, MockFetcher};
//!
//! let url = Portal::StepStone.search_url("firmware", 1);
//! let fetcher = MockFetcher::new()
//!     .with_html(url, stepstone_page(&[stepstone_card(1, "Firmware Engineer", "Acme", "Berlin")], None));
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchOptions, FetchedPage, PageFetcher, RequestKind};
use crate::types::portal::Portal;

/// Mock fetcher serving canned pages by exact URL.
///
/// Unknown URLs answer 404 with an empty body, like a portal would.
#[derive(Default, Clone)]
pub struct MockFetcher {
    /// Predefined (status, body) by URL
    pages: Arc<RwLock<HashMap<String, (u16, String)>>>,

    /// URLs that fail with a transport error
    fail_urls: Arc<RwLock<Vec<String>>>,

    /// URLs that fail as rate limited
    rate_limited_urls: Arc<RwLock<Vec<String>>>,

    /// Call tracking
    calls: Arc<RwLock<Vec<MockFetchCall>>>,
}

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFetchCall {
    pub url: String,
    pub kind: RequestKind,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with `status` for `url`.
    pub fn with_page(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), (status, body.into()));
        self
    }

    /// Serve `html` with status 200 for `url`.
    pub fn with_html(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.with_page(url, 200, html)
    }

    /// Mark a URL as failing with a transport error.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().push(url.into());
        self
    }

    /// Mark a URL as rate limited.
    pub fn rate_limit_url(self, url: impl Into<String>) -> Self {
        self.rate_limited_urls.write().unwrap().push(url.into());
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockFetchCall> {
        self.calls.read().unwrap().clone()
    }

    /// Calls of one request kind.
    pub fn calls_of(&self, kind: RequestKind) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == kind)
            .map(|call| call.url)
            .collect()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(MockFetchCall {
            url: url.to_string(),
            kind: options.kind,
        });

        if self.rate_limited_urls.read().unwrap().iter().any(|u| u == url) {
            return Err(FetchError::RateLimited {
                url: url.to_string(),
            });
        }

        if self.fail_urls.read().unwrap().iter().any(|u| u == url) {
            return Err(FetchError::Http {
                url: url.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "Mock connection refused",
                )),
            });
        }

        let (status, html) = self
            .pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or((404, String::new()));
        Ok(FetchedPage::new(url, status, html))
    }
}

/// Absolute URL of the StepStone posting used by [`stepstone_card`].
pub fn stepstone_job_url(id: u32) -> String {
    format!("{}/stellenangebote--job-{}-inline.html", Portal::StepStone.origin(), id)
}

/// A StepStone results card.
pub fn stepstone_card(id: u32, title: &str, company: &str, location: &str) -> String {
    format!(
        r#"<article data-testid="job-item">
             <h2><a href="/stellenangebote--job-{id}-inline.html">{title}</a></h2>
             <span data-testid="job-company">{company}</span>
             <span data-testid="job-location">{location}</span>
           </article>"#
    )
}

/// A StepStone results page. `next` adds a next-page control, enabled or disabled.
pub fn stepstone_page(cards: &[String], next: Option<bool>) -> String {
    let control = match next {
        Some(true) => r#"<a class="btn-next" href="?page=next">Weiter</a>"#,
        Some(false) => r#"<a class="btn-next disabled">Weiter</a>"#,
        None => "",
    };
    format!(
        "<html><body><main>{}</main><nav>{}</nav></body></html>",
        cards.join("\n"),
        control
    )
}

/// A posting page with description and qualifications sections.
pub fn detail_page(description: &str, qualifications: &str) -> String {
    format!(
        r#"<html><body>
             <div data-testid="job-description">{description}</div>
             <div data-testid="job-qualifications">{qualifications}</div>
           </body></html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fetcher_records_calls() {
        let fetcher = MockFetcher::new()
            .with_html("https://x/a", "<p>a</p>")
            .fail_url("https://x/b")
            .rate_limit_url("https://x/c");

        let page = fetcher
            .fetch("https://x/a", &FetchOptions::listing_page())
            .await
            .unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.html, "<p>a</p>");

        let missing = fetcher
            .fetch("https://x/missing", &FetchOptions::detail_page())
            .await
            .unwrap();
        assert_eq!(missing.status, 404);
        assert!(!missing.is_success());

        assert!(matches!(
            fetcher.fetch("https://x/b", &FetchOptions::detail_page()).await,
            Err(FetchError::Http { .. })
        ));
        assert!(fetcher
            .fetch("https://x/c", &FetchOptions::listing_page())
            .await
            .unwrap_err()
            .is_rate_limited());

        assert_eq!(fetcher.calls().len(), 4);
        assert_eq!(
            fetcher.calls_of(RequestKind::ListingPage),
            vec!["https://x/a", "https://x/c"]
        );
    }

    #[test]
    fn test_fixture_urls_match_cards() {
        let card = stepstone_card(7, "Firmware Engineer", "Acme", "Berlin");
        assert!(card.contains("/stellenangebote--job-7-inline.html"));
        assert_eq!(
            stepstone_job_url(7),
            "https://www.stepstone.de/stellenangebote--job-7-inline.html"
        );
    }
}
