//! Page fetching abstraction.

use async_trait::async_trait;

use crate::error::FetchResult;

/// What a request is for. Listing pages are paced and retried on 403,
/// detail pages are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    ListingPage,
    DetailPage,
}

/// Per-request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub kind: RequestKind,
}

impl FetchOptions {
    pub fn listing_page() -> Self {
        Self {
            kind: RequestKind::ListingPage,
        }
    }

    pub fn detail_page() -> Self {
        Self {
            kind: RequestKind::DetailPage,
        }
    }
}

/// A fetched HTML document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub html: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, status: u16, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            html: html.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches HTML pages from a portal.
///
/// Implementations return any status below 500 as a page so callers can
/// still parse soft error pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResult<FetchedPage>;
}
