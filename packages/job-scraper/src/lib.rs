//! Job listing ingestion for StepStone and Glassdoor.
//!
//! Scans the search results of each portal for a role, extracts listings
//! with cascading selector fallbacks, drops listings already stored (by URL
//! or by title, company and location), enriches the rest from their posting
//! pages, scores their relevance, and stores them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use job_scraper::{FetchConfig, HttpFetcher, Portal, ScanConfig, Scanner, SqliteStore};
//!
//! let store = SqliteStore::new("sqlite://jobs.db?mode=rwc").await?;
//! let fetcher = HttpFetcher::new(FetchConfig::default())?;
//! let scanner = Scanner::new(fetcher, store, ScanConfig::default())?;
//!
//! let summary = scanner.scan("Embedded Software Engineer", &Portal::ALL).await?;
//! println!("{} new listings", summary.inserted());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - I/O seams (PageFetcher, ListingStore, ListingReader)
//! - [`types`] - Listings, portals, config and reports
//! - [`pipeline`] - Extraction, dedup, enrichment, scoring and the scan loop
//! - [`fetchers`] - HTTP fetcher with pacing and rate-limit retry
//! - [`stores`] - Storage implementations (MemoryStore, SqliteStore)
//! - [`testing`] - Mock fetcher and HTML fixtures

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{DetailFetchError, FetchError, ScanError, StoreError};
pub use traits::{
    fetcher::{FetchOptions, FetchedPage, PageFetcher, RequestKind},
    store::{ListingReader, ListingStore},
};
pub use types::{
    config::{FetchConfig, ScanConfig},
    listing::{
        ContentKey, DailyCount, InsertOutcome, Listing, ListingQuery, StoreStats, StoredListing,
        UNKNOWN,
    },
    portal::Portal,
    report::{PortalReport, ScanSummary, StopReason},
    role::slugify,
};

// Re-export pipeline components
pub use pipeline::{
    DetailExtractor, DetailFetcher, ListingExtractor, PageAnalysis, RelevanceScorer, Scanner,
};

pub use fetchers::HttpFetcher;

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

// Re-export testing utilities
pub use testing::MockFetcher;
