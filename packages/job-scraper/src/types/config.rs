//! Configuration for fetching and scanning.
//!
//! Every pacing constant and heuristic threshold lives here so deployments can
//! tune them without code changes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ScanError, ScanResult};

/// Default User-Agent pool: current desktop Chrome and Firefox builds.
pub const DEFAULT_USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
];

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Lower bound of the random delay before each listing-page request.
    ///
    /// Default: 3000 ms.
    pub page_delay_min_ms: u64,

    /// Upper bound of the random delay before each listing-page request.
    ///
    /// Default: 8000 ms.
    pub page_delay_max_ms: u64,

    /// Wait after a 403 before the single retry. Default: 30 s.
    pub rate_limit_backoff_ms: u64,

    /// Timeout of the first attempt. Default: 30 s.
    pub request_timeout_ms: u64,

    /// Timeout of the retry after a 403. Default: 20 s.
    pub retry_timeout_ms: u64,

    /// Maximum redirects followed per request. Default: 5.
    pub max_redirects: usize,

    /// User-Agent strings rotated across requests.
    #[serde(default)]
    pub user_agents: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_delay_min_ms: 3_000,
            page_delay_max_ms: 8_000,
            rate_limit_backoff_ms: 30_000,
            request_timeout_ms: 30_000,
            retry_timeout_ms: 20_000,
            max_redirects: 5,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the random pre-request delay range.
    pub fn with_page_delay(mut self, min: Duration, max: Duration) -> Self {
        self.page_delay_min_ms = min.as_millis() as u64;
        self.page_delay_max_ms = max.as_millis() as u64;
        self
    }

    pub fn with_rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff_ms = backoff.as_millis() as u64;
        self
    }

    pub fn with_user_agents(mut self, user_agents: Vec<String>) -> Self {
        self.user_agents = user_agents;
        self
    }

    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_millis(self.rate_limit_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_timeout_ms)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.page_delay_min_ms > self.page_delay_max_ms {
            return Err(ScanError::Config(format!(
                "page delay min ({} ms) exceeds max ({} ms)",
                self.page_delay_min_ms, self.page_delay_max_ms
            )));
        }
        if self.user_agents.is_empty() {
            return Err(ScanError::Config("user agent pool is empty".into()));
        }
        Ok(())
    }
}

/// Configuration for a scan over roles and portals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Listings whose detail pages are fetched concurrently. Default: 5.
    pub batch_size: usize,

    /// Pause between detail batches. Default: 1000 ms.
    pub batch_pause_ms: u64,

    /// Pause between listing pages of one portal. Default: 1000 ms.
    pub page_pause_ms: u64,

    /// Hard cap on pages per (role, portal). Default: 20.
    pub max_pages: u32,

    /// Page cap used when a page carries no pagination signal. Default: 10.
    pub soft_page_cap: u32,

    /// Listings scoring below this are flagged as filtered. Default: 2.
    pub min_relevance_score: i32,

    /// Skip persisting listings the relevance scorer flagged.
    ///
    /// Default: false (filtered listings are stored with their reason).
    pub drop_filtered: bool,

    /// Log progress stats every this many pages. Default: 5.
    pub stats_every_pages: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_pause_ms: 1_000,
            page_pause_ms: 1_000,
            max_pages: 20,
            soft_page_cap: 10,
            min_relevance_score: 2,
            drop_filtered: false,
            stats_every_pages: 5,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_soft_page_cap(mut self, soft_page_cap: u32) -> Self {
        self.soft_page_cap = soft_page_cap;
        self
    }

    pub fn with_min_relevance_score(mut self, score: i32) -> Self {
        self.min_relevance_score = score;
        self
    }

    pub fn with_drop_filtered(mut self, drop_filtered: bool) -> Self {
        self.drop_filtered = drop_filtered;
        self
    }

    /// Set both pauses to zero. Used by tests and dry runs.
    pub fn without_pauses(mut self) -> Self {
        self.batch_pause_ms = 0;
        self.page_pause_ms = 0;
        self
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    pub fn page_pause(&self) -> Duration {
        Duration::from_millis(self.page_pause_ms)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.batch_size == 0 {
            return Err(ScanError::Config("batch_size must be > 0".into()));
        }
        if self.max_pages == 0 {
            return Err(ScanError::Config("max_pages must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let fetch = FetchConfig::default();
        assert_eq!(fetch.page_delay_min_ms, 3_000);
        assert_eq!(fetch.page_delay_max_ms, 8_000);
        assert_eq!(fetch.rate_limit_backoff(), Duration::from_secs(30));
        assert_eq!(fetch.user_agents.len(), 5);
        assert!(fetch.validate().is_ok());

        let scan = ScanConfig::default();
        assert_eq!(scan.batch_size, 5);
        assert_eq!(scan.max_pages, 20);
        assert_eq!(scan.soft_page_cap, 10);
        assert_eq!(scan.min_relevance_score, 2);
        assert!(scan.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(ScanConfig::new().with_batch_size(0).validate().is_err());
        assert!(ScanConfig::new().with_max_pages(0).validate().is_err());

        let inverted = FetchConfig::new()
            .with_page_delay(Duration::from_secs(8), Duration::from_secs(3));
        assert!(inverted.validate().is_err());
        assert!(FetchConfig::new().with_user_agents(vec![]).validate().is_err());
    }

    #[test]
    fn test_without_pauses() {
        let config = ScanConfig::new().without_pauses();
        assert_eq!(config.batch_pause(), Duration::ZERO);
        assert_eq!(config.page_pause(), Duration::ZERO);
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: ScanConfig = serde_json::from_str(
            r#"{"batch_size":3,"batch_pause_ms":0,"page_pause_ms":0,"max_pages":4,
                "soft_page_cap":2,"min_relevance_score":1,"drop_filtered":true,
                "stats_every_pages":1}"#,
        )
        .unwrap();
        assert_eq!(config.batch_size, 3);
        assert!(config.drop_filtered);
    }
}
