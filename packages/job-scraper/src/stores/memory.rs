//! In-memory listing store for testing and development.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{ListingReader, ListingStore};
use crate::types::listing::{
    ContentKey, DailyCount, InsertOutcome, Listing, ListingQuery, StoreStats, StoredListing,
};

/// In-memory storage for listings.
///
/// Not suitable for production as data is lost on restart.
pub struct MemoryStore {
    rows: RwLock<Vec<StoredListing>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Create a store pre-populated with listings.
    pub fn with_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let store = Self::new();
        let now = Utc::now();
        for listing in listings {
            store.insert_at(&listing, now);
        }
        store
    }

    /// Number of stored listings.
    pub fn len(&self) -> usize {
        self.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all stored listings in insertion order.
    pub fn listings(&self) -> Vec<Listing> {
        self.read()
            .map(|rows| rows.iter().map(|row| row.listing.clone()).collect())
            .unwrap_or_default()
    }

    /// Insert with an explicit creation time.
    pub fn insert_at(&self, listing: &Listing, created_at: DateTime<Utc>) -> InsertOutcome {
        let mut rows = match self.write() {
            Ok(rows) => rows,
            Err(e) => return InsertOutcome::Failed(e.to_string()),
        };

        if rows.iter().any(|row| row.listing.url == listing.url) {
            return InsertOutcome::AlreadyExists;
        }

        let id = rows.len() as i64 + 1;
        rows.push(StoredListing {
            id,
            listing: listing.clone(),
            favorite: false,
            created_at,
        });
        InsertOutcome::Inserted
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<StoredListing>>> {
        self.rows.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<StoredListing>>> {
        self.rows.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn existing_urls(&self, urls: &[String]) -> StoreResult<HashSet<String>> {
        let rows = self.read()?;
        Ok(urls
            .iter()
            .filter(|url| rows.iter().any(|row| &row.listing.url == *url))
            .cloned()
            .collect())
    }

    async fn existing_content_keys(&self, keys: &[ContentKey]) -> StoreResult<HashSet<String>> {
        let rows = self.read()?;
        let stored: HashSet<ContentKey> = rows.iter().map(|row| row.listing.content_key()).collect();
        Ok(keys
            .iter()
            .filter(|key| stored.contains(*key))
            .map(ContentKey::key)
            .collect())
    }

    async fn insert_if_absent(&self, listing: &Listing) -> InsertOutcome {
        self.insert_at(listing, Utc::now())
    }
}

#[async_trait]
impl ListingReader for MemoryStore {
    async fn list(&self, query: &ListingQuery) -> StoreResult<Vec<StoredListing>> {
        let rows = self.read()?;
        let mut matching: Vec<StoredListing> = rows
            .iter()
            .filter(|row| query.matches(&row.listing))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matching.truncate(query.limit);
        Ok(matching)
    }

    async fn stats(&self, now: DateTime<Utc>) -> StoreResult<StoreStats> {
        let rows = self.read()?;
        let day_ago = now - Duration::hours(24);
        let week_ago = now - Duration::days(7);

        let mut daily: BTreeMap<String, u64> = BTreeMap::new();
        for row in rows.iter().filter(|row| row.created_at > week_ago) {
            *daily
                .entry(row.created_at.format("%Y-%m-%d").to_string())
                .or_default() += 1;
        }

        Ok(StoreStats {
            total: rows.len() as u64,
            last_24h: rows.iter().filter(|row| row.created_at > day_ago).count() as u64,
            daily: daily
                .into_iter()
                .map(|(date, count)| DailyCount { date, count })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::portal::Portal;

    fn listing(url: &str, title: &str) -> Listing {
        Listing::new(Portal::StepStone, title, url)
            .with_company("Acme")
            .with_location("Berlin")
            .with_role_slug("firmware")
    }

    #[tokio::test]
    async fn test_insert_if_absent() {
        let store = MemoryStore::new();
        let a = listing("https://x/job/1", "Firmware Engineer");

        assert_eq!(store.insert_if_absent(&a).await, InsertOutcome::Inserted);
        assert_eq!(store.insert_if_absent(&a).await, InsertOutcome::AlreadyExists);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_urls_and_content() {
        let store = MemoryStore::with_listings(vec![listing("https://x/job/1", "Firmware Engineer")]);

        let urls = vec!["https://x/job/1".to_string(), "https://x/job/2".to_string()];
        let existing = store.existing_urls(&urls).await.unwrap();
        assert_eq!(existing.len(), 1);
        assert!(existing.contains("https://x/job/1"));

        let keys = vec![
            ContentKey::new("Firmware Engineer", "Acme", "Berlin"),
            ContentKey::new("Firmware Engineer", "Acme", "Munich"),
        ];
        let existing = store.existing_content_keys(&keys).await.unwrap();
        assert_eq!(existing.len(), 1);
        assert!(existing.contains("Firmware Engineer|Acme|Berlin"));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_at(&listing("https://x/job/1", "Old"), now - Duration::hours(2));
        store.insert_at(&listing("https://x/job/2", "New"), now);
        store.insert_at(
            &Listing::new(Portal::Glassdoor, "Other", "https://y/job/3").with_role_slug("fpga"),
            now,
        );

        let firmware = store.list(&ListingQuery::new().for_role("firmware")).await.unwrap();
        assert_eq!(firmware.len(), 2);
        assert_eq!(firmware[0].listing.title, "New");

        let glassdoor = store
            .list(&ListingQuery::new().from_source(Portal::Glassdoor))
            .await
            .unwrap();
        assert_eq!(glassdoor.len(), 1);

        let limited = store.list(&ListingQuery::new().with_limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_at(&listing("https://x/job/1", "A"), now - Duration::days(10));
        store.insert_at(&listing("https://x/job/2", "B"), now - Duration::days(2));
        store.insert_at(&listing("https://x/job/3", "C"), now - Duration::hours(1));

        let stats = store.stats(now).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.last_24h, 1);
        assert_eq!(stats.daily.iter().map(|d| d.count).sum::<u64>(), 2);
    }
}
