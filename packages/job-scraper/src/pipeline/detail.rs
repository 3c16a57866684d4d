//! Detail page enrichment.
//!
//! New listings get their description and qualifications from the posting
//! page. Pages are fetched in small concurrent batches with a pause between
//! batches; a failed page leaves its listing's fields empty.

use futures::future::join_all;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

use super::strategy::{compile, element_text};
use crate::error::DetailFetchError;
use crate::traits::fetcher::{FetchOptions, PageFetcher};
use crate::types::listing::Listing;

const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"[data-testid="job-description"]"#,
    ".job-description",
    r#"[class*="description"]"#,
    r#"[class*="job-content"]"#,
    r#"section[class*="description"]"#,
    ".at-section-text",
];

const QUALIFICATION_SELECTORS: &[&str] = &[
    r#"[data-testid="job-qualifications"]"#,
    r#"[data-testid="job-requirements"]"#,
    ".qualifications",
    ".requirements",
    r#"[class*="qualification"]"#,
    r#"[class*="requirement"]"#,
    r#"section[class*="qualification"]"#,
];

const GENERIC_SELECTORS: &[&str] = &["section", r#"div[class*="content"]"#, r#"div[class*="text"]"#];

const DESCRIPTION_MARKERS: &[&str] = &["description", "über", "aufgaben"];
const QUALIFICATION_MARKERS: &[&str] = &["qualification", "anforderungen", "voraussetzungen"];

/// Minimum lengths (in characters) for accepting extracted text.
#[derive(Debug, Clone, Copy)]
pub struct DetailThresholds {
    pub description: usize,
    pub qualifications: usize,
    pub generic_description: usize,
    pub generic_qualifications: usize,
}

impl Default for DetailThresholds {
    fn default() -> Self {
        Self {
            description: 50,
            qualifications: 20,
            generic_description: 200,
            generic_qualifications: 100,
        }
    }
}

/// Description and qualifications read from a posting page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingDetails {
    pub description: String,
    pub qualifications: String,
}

/// Reads description and qualifications from posting HTML.
pub struct DetailExtractor {
    description: Vec<Selector>,
    qualifications: Vec<Selector>,
    generic: Vec<Selector>,
    thresholds: DetailThresholds,
}

impl Default for DetailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailExtractor {
    pub fn new() -> Self {
        Self {
            description: compile(DESCRIPTION_SELECTORS),
            qualifications: compile(QUALIFICATION_SELECTORS),
            generic: compile(GENERIC_SELECTORS),
            thresholds: DetailThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: DetailThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn extract(&self, html: &str) -> ListingDetails {
        let document = Html::parse_document(html);

        let description = first_longer_than(&document, &self.description, self.thresholds.description)
            .or_else(|| {
                generic_section(
                    &document,
                    &self.generic,
                    self.thresholds.generic_description,
                    DESCRIPTION_MARKERS,
                )
            })
            .unwrap_or_default();

        let qualifications =
            first_longer_than(&document, &self.qualifications, self.thresholds.qualifications)
                .or_else(|| {
                    generic_section(
                        &document,
                        &self.generic,
                        self.thresholds.generic_qualifications,
                        QUALIFICATION_MARKERS,
                    )
                })
                .unwrap_or_default();

        ListingDetails {
            description,
            qualifications,
        }
    }
}

/// First selector whose first match has more than `min_chars` of text.
fn first_longer_than(document: &Html, selectors: &[Selector], min_chars: usize) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .map(element_text)
            .filter(|text| text.chars().count() > min_chars)
    })
}

/// First generic container that is long enough and mentions a marker.
fn generic_section(
    document: &Html,
    selectors: &[Selector],
    min_chars: usize,
    markers: &[&str],
) -> Option<String> {
    selectors
        .iter()
        .flat_map(|selector| document.select(selector))
        .map(element_text)
        .find(|text| {
            let lower = text.to_lowercase();
            text.chars().count() > min_chars && markers.iter().any(|marker| lower.contains(marker))
        })
}

/// Counts from one enrichment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailReport {
    pub attempted: usize,
    pub fetched: usize,
    pub errors: usize,
}

/// Fetches posting pages in concurrent batches.
pub struct DetailFetcher<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    extractor: DetailExtractor,
    batch_size: usize,
    batch_pause: Duration,
}

impl<'a, F: PageFetcher + ?Sized> DetailFetcher<'a, F> {
    pub fn new(fetcher: &'a F, batch_size: usize, batch_pause: Duration) -> Self {
        Self {
            fetcher,
            extractor: DetailExtractor::new(),
            batch_size: batch_size.max(1),
            batch_pause,
        }
    }

    /// Fill description and qualifications of each listing in place.
    pub async fn enrich(&self, listings: &mut [Listing]) -> DetailReport {
        let mut report = DetailReport {
            attempted: listings.len(),
            ..DetailReport::default()
        };
        let batches = listings.len().div_ceil(self.batch_size);

        for (index, batch) in listings.chunks_mut(self.batch_size).enumerate() {
            debug!(batch = index + 1, of = batches, size = batch.len(), "Fetching detail batch");

            let futures: Vec<_> = batch.iter().map(|l| self.fetch_details(&l.url)).collect();
            let results = join_all(futures).await;

            for (listing, result) in batch.iter_mut().zip(results) {
                match result {
                    Ok(details) => {
                        listing.description = details.description;
                        listing.qualifications = details.qualifications;
                        report.fetched += 1;
                    }
                    Err(e) => {
                        warn!(url = %listing.url, error = %e, "Failed to fetch listing details");
                        report.errors += 1;
                    }
                }
            }

            if index + 1 < batches && !self.batch_pause.is_zero() {
                tokio::time::sleep(self.batch_pause).await;
            }
        }

        report
    }

    async fn fetch_details(&self, url: &str) -> Result<ListingDetails, DetailFetchError> {
        let page = self.fetcher.fetch(url, &FetchOptions::detail_page()).await?;
        if !page.is_success() {
            return Err(DetailFetchError::Status {
                url: url.to_string(),
                status: page.status,
            });
        }
        Ok(self.extractor.extract(&page.html))
    }
}
