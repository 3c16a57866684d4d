//! SQLite listing store.
//!
//! The production backend. The `url` column is unique, so inserts are
//! idempotent; a `content_hash` column indexes the (title, company, location)
//! identity for the content duplicate check.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::collections::HashSet;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{ListingReader, ListingStore};
use crate::types::listing::{
    ContentKey, DailyCount, InsertOutcome, Listing, ListingQuery, StoreStats, StoredListing,
};
use crate::types::portal::Portal;

/// SQLite-based listing store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://jobs.db?mode=rwc` - File-based, created if missing
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// Limited to one connection: every new connection to `sqlite::memory:`
    /// opens a separate, empty database.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                location TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                posted_at TEXT NOT NULL,
                role_slug TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                qualifications TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL,
                relevance_score INTEGER NOT NULL DEFAULT 0,
                matched_keywords TEXT NOT NULL DEFAULT '[]',
                filtered_reason TEXT,
                content_hash TEXT NOT NULL,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_listings_role_slug ON listings(role_slug);
            CREATE INDEX IF NOT EXISTS idx_listings_source ON listings(source);
            CREATE INDEX IF NOT EXISTS idx_listings_created_at ON listings(created_at);
            CREATE INDEX IF NOT EXISTS idx_listings_content_hash ON listings(content_hash);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(Box::new(e)))?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert(&self, listing: &Listing, created_at: DateTime<Utc>) -> StoreResult<bool> {
        let matched_keywords = serde_json::to_string(&listing.matched_keywords)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO listings (
                title, company, location, url, posted_at, role_slug, description,
                qualifications, source, relevance_score, matched_keywords,
                filtered_reason, content_hash, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(&listing.title)
        .bind(&listing.company)
        .bind(&listing.location)
        .bind(&listing.url)
        .bind(&listing.posted_at)
        .bind(&listing.role_slug)
        .bind(&listing.description)
        .bind(&listing.qualifications)
        .bind(listing.source.as_str())
        .bind(listing.relevance_score)
        .bind(matched_keywords)
        .bind(&listing.filtered_reason)
        .bind(listing.content_key().digest())
        .bind(timestamp(created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(Box::new(e)))?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert with an explicit creation time.
    pub async fn insert_at(&self, listing: &Listing, created_at: DateTime<Utc>) -> InsertOutcome {
        match self.insert(listing, created_at).await {
            Ok(true) => InsertOutcome::Inserted,
            Ok(false) => InsertOutcome::AlreadyExists,
            Err(e) => InsertOutcome::Failed(e.to_string()),
        }
    }
}

/// Fixed-width RFC 3339 so that text comparison orders by time.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

// Row types for sqlx queries
#[derive(Debug, FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    company: String,
    location: String,
    url: String,
    posted_at: String,
    role_slug: String,
    description: String,
    qualifications: String,
    source: String,
    relevance_score: i32,
    matched_keywords: String,
    filtered_reason: Option<String>,
    is_favorite: bool,
    created_at: String,
}

impl ListingRow {
    fn into_stored_listing(self) -> StoreResult<StoredListing> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StoreError::Serialization(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        let source: Portal = self.source.parse().map_err(StoreError::Serialization)?;

        let matched_keywords: Vec<String> = serde_json::from_str(&self.matched_keywords)
            .map_err(|e| StoreError::Serialization(format!("Invalid keywords JSON: {}", e)))?;

        Ok(StoredListing {
            id: self.id,
            listing: Listing {
                title: self.title,
                company: self.company,
                location: self.location,
                url: self.url,
                posted_at: self.posted_at,
                description: self.description,
                qualifications: self.qualifications,
                source,
                role_slug: self.role_slug,
                relevance_score: self.relevance_score,
                matched_keywords,
                filtered_reason: self.filtered_reason,
            },
            favorite: self.is_favorite,
            created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ContentRow {
    title: String,
    company: String,
    location: String,
}

#[derive(Debug, FromRow)]
struct DailyRow {
    date: String,
    count: i64,
}

#[async_trait]
impl ListingStore for SqliteStore {
    async fn existing_urls(&self, urls: &[String]) -> StoreResult<HashSet<String>> {
        if urls.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT url FROM listings WHERE url IN ({})",
            placeholders(urls.len())
        );
        let mut query = sqlx::query_scalar::<_, String>(&sql);
        for url in urls {
            query = query.bind(url);
        }

        let found = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;

        Ok(found.into_iter().collect())
    }

    async fn existing_content_keys(&self, keys: &[ContentKey]) -> StoreResult<HashSet<String>> {
        if keys.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT title, company, location FROM listings WHERE content_hash IN ({})",
            placeholders(keys.len())
        );
        let mut query = sqlx::query_as::<_, ContentRow>(&sql);
        for key in keys {
            query = query.bind(key.digest());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;

        // Compare the full triple so a digest collision cannot drop a listing
        let requested: HashSet<&ContentKey> = keys.iter().collect();
        Ok(rows
            .into_iter()
            .map(|row| ContentKey::new(&row.title, &row.company, &row.location))
            .filter(|key| requested.contains(key))
            .map(|key| key.key())
            .collect())
    }

    async fn insert_if_absent(&self, listing: &Listing) -> InsertOutcome {
        self.insert_at(listing, Utc::now()).await
    }
}

#[async_trait]
impl ListingReader for SqliteStore {
    async fn list(&self, query: &ListingQuery) -> StoreResult<Vec<StoredListing>> {
        let mut sql = String::from(
            "SELECT id, title, company, location, url, posted_at, role_slug, description, \
             qualifications, source, relevance_score, matched_keywords, filtered_reason, \
             is_favorite, created_at FROM listings WHERE 1 = 1",
        );
        if query.role_slug.is_some() {
            sql.push_str(" AND role_slug = ?");
        }
        if query.source.is_some() {
            sql.push_str(" AND source = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");

        let mut q = sqlx::query_as::<_, ListingRow>(&sql);
        if let Some(role_slug) = &query.role_slug {
            q = q.bind(role_slug);
        }
        if let Some(source) = query.source {
            q = q.bind(source.as_str());
        }
        q = q.bind(query.limit as i64);

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;

        rows.into_iter().map(ListingRow::into_stored_listing).collect()
    }

    async fn stats(&self, now: DateTime<Utc>) -> StoreResult<StoreStats> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;

        let day_ago = timestamp(now - Duration::hours(24));
        let last_24h: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings WHERE created_at > ?")
            .bind(day_ago)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;

        let week_ago = timestamp(now - Duration::days(7));
        let daily = sqlx::query_as::<_, DailyRow>(
            r#"
            SELECT substr(created_at, 1, 10) AS date, COUNT(*) AS count
            FROM listings
            WHERE created_at > ?
            GROUP BY date
            ORDER BY date ASC
            "#,
        )
        .bind(week_ago)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(Box::new(e)))?;

        Ok(StoreStats {
            total: total as u64,
            last_24h: last_24h as u64,
            daily: daily
                .into_iter()
                .map(|row| DailyCount {
                    date: row.date,
                    count: row.count as u64,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(url: &str, title: &str) -> Listing {
        Listing::new(Portal::StepStone, title, url)
            .with_company("Acme GmbH")
            .with_location("Berlin")
            .with_posted_at("vor 2 Stunden")
            .with_role_slug("firmware")
    }

    #[tokio::test]
    async fn test_insert_if_absent_is_idempotent() {
        let store = SqliteStore::in_memory().await.unwrap();
        let a = listing("https://www.stepstone.de/stellenangebote--a-1.html", "Firmware Engineer");

        assert_eq!(store.insert_if_absent(&a).await, InsertOutcome::Inserted);
        assert_eq!(store.insert_if_absent(&a).await, InsertOutcome::AlreadyExists);

        let rows = store.list(&ListingQuery::new()).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_existence_queries() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .insert_if_absent(&listing("https://x/job/1", "Firmware Engineer"))
            .await;

        let urls = vec!["https://x/job/1".to_string(), "https://x/job/9".to_string()];
        let existing = store.existing_urls(&urls).await.unwrap();
        assert_eq!(existing, HashSet::from(["https://x/job/1".to_string()]));

        let keys = vec![
            ContentKey::new("Firmware Engineer", "Acme GmbH", "Berlin"),
            ContentKey::new("FPGA Engineer", "Acme GmbH", "Berlin"),
        ];
        let existing = store.existing_content_keys(&keys).await.unwrap();
        assert_eq!(
            existing,
            HashSet::from(["Firmware Engineer|Acme GmbH|Berlin".to_string()])
        );

        assert!(store.existing_urls(&[]).await.unwrap().is_empty());
        assert!(store.existing_content_keys(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trips_relevance_fields() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut a = listing("https://x/job/1", "Firmware Engineer");
        a.relevance_score = 4;
        a.matched_keywords = vec!["firmware engineer".into(), "firmware engineer (title)".into()];
        a.filtered_reason = None;
        store.insert_if_absent(&a).await;

        let rows = store.list(&ListingQuery::new().for_role("firmware")).await.unwrap();
        assert_eq!(rows[0].listing, a);
        assert!(!rows[0].favorite);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = SqliteStore::in_memory().await.unwrap();
        let now = Utc::now();
        store.insert_at(&listing("https://x/job/1", "Old"), now - Duration::hours(3)).await;
        store.insert_at(&listing("https://x/job/2", "New"), now).await;
        store
            .insert_at(
                &Listing::new(Portal::Glassdoor, "Other", "https://y/job/3").with_role_slug("fpga"),
                now,
            )
            .await;

        let firmware = store.list(&ListingQuery::new().for_role("firmware")).await.unwrap();
        assert_eq!(firmware.len(), 2);
        assert_eq!(firmware[0].listing.title, "New");

        let glassdoor = store
            .list(&ListingQuery::new().from_source(Portal::Glassdoor))
            .await
            .unwrap();
        assert_eq!(glassdoor.len(), 1);
        assert_eq!(glassdoor[0].listing.role_slug, "fpga");

        let limited = store.list(&ListingQuery::new().with_limit(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = SqliteStore::in_memory().await.unwrap();
        let now = Utc::now();
        store.insert_at(&listing("https://x/job/1", "A"), now - Duration::days(10)).await;
        store.insert_at(&listing("https://x/job/2", "B"), now - Duration::days(2)).await;
        store.insert_at(&listing("https://x/job/3", "C"), now - Duration::hours(1)).await;

        let stats = store.stats(now).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.last_24h, 1);
        assert_eq!(stats.daily.iter().map(|d| d.count).sum::<u64>(), 2);
    }
}
