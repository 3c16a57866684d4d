//! Ingestion pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Listing extraction with per-portal selector cascades
//! - Title cleanup for leaked stylesheet fragments
//! - Duplicate filtering by URL and by (title, company, location)
//! - Batched detail page enrichment
//! - Keyword relevance scoring
//! - Pagination and the per-portal page loop

pub mod company;
pub mod dedup;
pub mod detail;
pub mod extract;
pub mod paginate;
pub mod profile;
pub mod relevance;
pub mod scan;
pub mod strategy;
pub mod title;

pub use company::{company_from_profile_url, normalize_company_slug};
pub use dedup::{partition, DedupOutcome};
pub use detail::{DetailExtractor, DetailFetcher, DetailReport, DetailThresholds, ListingDetails};
pub use extract::{ListingExtractor, PageAnalysis};
pub use paginate::{decide, parse_indicator, PageDecision, PaginationProbe, PaginationSignal};
pub use profile::PortalProfile;
pub use relevance::{FilterReason, Relevance, RelevanceScorer};
pub use scan::Scanner;
pub use strategy::{Cascade, FieldStrategy};
pub use title::{resolve_title, strip_css};
