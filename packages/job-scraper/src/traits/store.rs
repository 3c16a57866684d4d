//! Storage traits for listings.
//!
//! The write side used by the pipeline and the read side used by reporting
//! are separate traits:
//! - `ListingStore`: batched existence checks and idempotent inserts
//! - `ListingReader`: filtered reads and aggregate stats

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::error::StoreResult;
use crate::types::listing::{ContentKey, InsertOutcome, Listing, ListingQuery, StoredListing, StoreStats};

/// Persistence used by the ingestion pipeline.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Return the subset of `urls` that is already stored, in one query.
    async fn existing_urls(&self, urls: &[String]) -> StoreResult<HashSet<String>>;

    /// Return the stored subset of `keys`, in one query.
    ///
    /// Results use the concatenated `title|company|location` form of
    /// [`ContentKey::key`].
    async fn existing_content_keys(&self, keys: &[ContentKey]) -> StoreResult<HashSet<String>>;

    /// Insert a listing unless its URL is already stored.
    async fn insert_if_absent(&self, listing: &Listing) -> InsertOutcome;
}

/// Read access to stored listings.
#[async_trait]
pub trait ListingReader: Send + Sync {
    /// Listings matching the query, newest first.
    async fn list(&self, query: &ListingQuery) -> StoreResult<Vec<StoredListing>>;

    /// Totals, the last 24 hours, and per-day counts for the last 7 days.
    async fn stats(&self, now: DateTime<Utc>) -> StoreResult<StoreStats>;
}
