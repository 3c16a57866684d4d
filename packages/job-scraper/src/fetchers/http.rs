//! HTTP fetcher that behaves like a desktop browser.
//!
//! Listing-page requests are paced with a random delay and get one retry with
//! a reduced header set after a 403. Detail-page requests go out directly.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchOptions, FetchedPage, PageFetcher, RequestKind};
use crate::types::config::{FetchConfig, DEFAULT_USER_AGENTS};

/// User-Agent sent on the retry after a 403.
const FALLBACK_USER_AGENT: &str = DEFAULT_USER_AGENTS[0];

/// reqwest-based page fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        config
            .validate()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a fetcher around a preconfigured client.
    pub fn with_client(client: reqwest::Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Pick a User-Agent from the pool.
    fn random_user_agent(&self) -> &str {
        self.config
            .user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(FALLBACK_USER_AGENT)
    }

    /// Random delay in the configured range.
    fn random_delay(&self) -> Duration {
        let min = self.config.page_delay_min_ms;
        let max = self.config.page_delay_max_ms.max(min);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    /// Full browser header set for first attempts.
    fn browser_headers(user_agent: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(header::USER_AGENT, value);
        }
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(header::DNT, HeaderValue::from_static("1"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert(header::REFERER, HeaderValue::from_static("https://www.google.com/"));
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("document"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("navigate"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("cross-site"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-user"),
            HeaderValue::from_static("?1"),
        );
        headers
    }

    /// Reduced header set for the retry after a 403.
    fn fallback_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(FALLBACK_USER_AGENT));
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("de-DE,de;q=0.9,en;q=0.8"),
        );
        headers
    }

    /// Header set for detail pages.
    fn detail_headers(user_agent: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(header::USER_AGENT, value);
        }
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,de;q=0.8"),
        );
        headers
    }

    async fn send(&self, url: &str, headers: HeaderMap, timeout: Duration) -> FetchResult<FetchedPage> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        if status >= 500 {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let html = response.text().await.map_err(|e| classify(url, e))?;
        debug!(url = %final_url, status, bytes = html.len(), "Fetched page");
        Ok(FetchedPage::new(final_url, status, html))
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_builder() {
        FetchError::InvalidUrl {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: Box::new(error),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResult<FetchedPage> {
        if url::Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        let user_agent = self.random_user_agent().to_string();

        if options.kind == RequestKind::DetailPage {
            return self
                .send(url, Self::detail_headers(&user_agent), self.config.request_timeout())
                .await;
        }

        let delay = self.random_delay();
        debug!(url = %url, delay_ms = delay.as_millis() as u64, "Pacing listing request");
        tokio::time::sleep(delay).await;

        let page = self
            .send(url, Self::browser_headers(&user_agent), self.config.request_timeout())
            .await?;
        if page.status != 403 {
            return Ok(page);
        }

        let backoff = self.config.rate_limit_backoff();
        warn!(
            url = %url,
            backoff_secs = backoff.as_secs(),
            "Portal answered 403, backing off before retry"
        );
        tokio::time::sleep(backoff).await;

        let retry = self
            .send(url, Self::fallback_headers(), self.config.retry_timeout())
            .await?;
        if retry.status == 403 {
            warn!(url = %url, "Still rate limited after retry");
            return Err(FetchError::RateLimited {
                url: url.to_string(),
            });
        }
        Ok(retry)
    }
}
