//! Job listing types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::portal::Portal;

/// Sentinel for a company or location that could not be extracted.
pub const UNKNOWN: &str = "Unknown";

/// A single job posting scraped from a portal.
///
/// `url` is the identity of a listing. Two listings with the same
/// (title, company, location) are also treated as the same posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub company: String,
    pub location: String,

    /// Absolute URL of the posting
    pub url: String,

    /// Posting date as shown by the portal (free-form), or the capture time
    pub posted_at: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub qualifications: String,

    pub source: Portal,

    /// Slug of the role this listing was found for
    pub role_slug: String,

    #[serde(default)]
    pub relevance_score: i32,

    #[serde(default)]
    pub matched_keywords: Vec<String>,

    #[serde(default)]
    pub filtered_reason: Option<String>,
}

impl Listing {
    /// Create a listing with unknown company and location.
    pub fn new(source: Portal, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: UNKNOWN.to_string(),
            location: UNKNOWN.to_string(),
            url: url.into(),
            posted_at: String::new(),
            description: String::new(),
            qualifications: String::new(),
            source,
            role_slug: String::new(),
            relevance_score: 0,
            matched_keywords: Vec::new(),
            filtered_reason: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_posted_at(mut self, posted_at: impl Into<String>) -> Self {
        self.posted_at = posted_at.into();
        self
    }

    pub fn with_role_slug(mut self, role_slug: impl Into<String>) -> Self {
        self.role_slug = role_slug.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Identity of the posting independent of its URL.
    pub fn content_key(&self) -> ContentKey {
        ContentKey::new(&self.title, &self.company, &self.location)
    }

    /// Whether company or location fell back to the sentinel.
    pub fn has_extraction_gap(&self) -> bool {
        self.company == UNKNOWN || self.location == UNKNOWN
    }

    /// Whether the relevance scorer flagged this listing.
    pub fn is_filtered(&self) -> bool {
        self.filtered_reason.is_some()
    }
}

/// (title, company, location) triple identifying a posting across URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentKey {
    pub title: String,
    pub company: String,
    pub location: String,
}

impl ContentKey {
    pub fn new(title: &str, company: &str, location: &str) -> Self {
        Self {
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
        }
    }

    /// Concatenated form `title|company|location`, as returned by stores.
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.title, self.company, self.location)
    }

    /// SHA-256 of the concatenated key, used as an index column.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.key().as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A listing as read back from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredListing {
    pub id: i64,

    #[serde(flatten)]
    pub listing: Listing,

    /// Toggled by the dashboard, never by the pipeline
    pub favorite: bool,

    pub created_at: DateTime<Utc>,
}

/// Filter for reading stored listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingQuery {
    pub role_slug: Option<String>,
    pub source: Option<Portal>,
    pub limit: usize,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            role_slug: None,
            source: None,
            limit: 1000,
        }
    }
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_role(mut self, role_slug: impl Into<String>) -> Self {
        self.role_slug = Some(role_slug.into());
        self
    }

    pub fn from_source(mut self, source: Portal) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether a listing passes the role and source filters.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.role_slug
            .as_ref()
            .map_or(true, |slug| &listing.role_slug == slug)
            && self.source.map_or(true, |source| listing.source == source)
    }
}

/// Aggregate counts over a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total: u64,
    pub last_24h: u64,

    /// Insertions per day over the last week, oldest first
    pub daily: Vec<DailyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCount {
    /// `YYYY-MM-DD`
    pub date: String,
    pub count: u64,
}

/// Result of an insert, returned as data rather than raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A listing with the same URL is already stored
    AlreadyExists,
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_listing_uses_sentinels() {
        let listing = Listing::new(Portal::StepStone, "Firmware Engineer", "https://x/job/1");
        assert_eq!(listing.company, UNKNOWN);
        assert_eq!(listing.location, UNKNOWN);
        assert!(listing.has_extraction_gap());
        assert!(!listing.is_filtered());

        let complete = listing.with_company("Acme").with_location("Berlin");
        assert!(!complete.has_extraction_gap());
    }

    #[test]
    fn test_content_key() {
        let listing = Listing::new(Portal::Glassdoor, "Engineer", "https://x/1")
            .with_company("Acme")
            .with_location("Berlin");
        let key = listing.content_key();
        assert_eq!(key.key(), "Engineer|Acme|Berlin");
        assert_eq!(key.digest().len(), 64);
        assert_eq!(key.digest(), ContentKey::new("Engineer", "Acme", "Berlin").digest());
        assert_ne!(key.digest(), ContentKey::new("Engineer", "Acme", "Munich").digest());
    }

    #[test]
    fn test_query_matches() {
        let listing = Listing::new(Portal::Glassdoor, "Engineer", "https://x/1")
            .with_role_slug("embedded-engineer");

        assert!(ListingQuery::new().matches(&listing));
        assert!(ListingQuery::new().for_role("embedded-engineer").matches(&listing));
        assert!(!ListingQuery::new().for_role("firmware").matches(&listing));
        assert!(!ListingQuery::new().from_source(Portal::StepStone).matches(&listing));
    }
}
