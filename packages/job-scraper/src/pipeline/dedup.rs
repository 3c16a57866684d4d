//! Duplicate filtering against the store.
//!
//! Candidates are checked in two batched stages, by URL and then by
//! (title, company, location), so a page costs at most two store queries.

use std::collections::HashSet;
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::store::ListingStore;
use crate::types::listing::{ContentKey, Listing};

/// Candidates that survived both stages, with per-stage counts.
#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub fresh: Vec<Listing>,
    pub url_duplicates: usize,
    pub content_duplicates: usize,
}

impl DedupOutcome {
    pub fn duplicates(&self) -> usize {
        self.url_duplicates + self.content_duplicates
    }
}

/// Split candidates into new listings and duplicates.
///
/// Repeats within the batch count as duplicates of the first occurrence.
pub async fn partition<S: ListingStore + ?Sized>(
    candidates: Vec<Listing>,
    store: &S,
) -> StoreResult<DedupOutcome> {
    let mut outcome = DedupOutcome::default();

    // Stage 1: URL identity
    let mut seen_urls = HashSet::new();
    let mut unique = Vec::with_capacity(candidates.len());
    for listing in candidates {
        if seen_urls.insert(listing.url.clone()) {
            unique.push(listing);
        } else {
            outcome.url_duplicates += 1;
        }
    }

    let urls: Vec<String> = unique.iter().map(|l| l.url.clone()).collect();
    let stored_urls = if urls.is_empty() {
        HashSet::new()
    } else {
        store.existing_urls(&urls).await?
    };
    let before = unique.len();
    unique.retain(|l| !stored_urls.contains(&l.url));
    outcome.url_duplicates += before - unique.len();

    // Stage 2: content identity
    let mut seen_keys = HashSet::new();
    let mut by_content = Vec::with_capacity(unique.len());
    for listing in unique {
        if seen_keys.insert(listing.content_key()) {
            by_content.push(listing);
        } else {
            outcome.content_duplicates += 1;
        }
    }

    let keys: Vec<ContentKey> = by_content.iter().map(Listing::content_key).collect();
    let stored_keys = if keys.is_empty() {
        HashSet::new()
    } else {
        store.existing_content_keys(&keys).await?
    };
    let before = by_content.len();
    by_content.retain(|l| !stored_keys.contains(&l.content_key().key()));
    outcome.content_duplicates += before - by_content.len();

    debug!(
        fresh = by_content.len(),
        url_duplicates = outcome.url_duplicates,
        content_duplicates = outcome.content_duplicates,
        "Deduplicated candidates"
    );

    outcome.fresh = by_content;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::types::portal::Portal;
    use proptest::prelude::*;

    fn listing(url: &str, title: &str, company: &str) -> Listing {
        Listing::new(Portal::StepStone, title, url)
            .with_company(company)
            .with_location("Berlin")
    }

    #[tokio::test]
    async fn test_url_duplicates_removed() {
        let store = MemoryStore::with_listings(vec![listing("https://x/job/1", "A Engineer", "Acme")]);
        let candidates = vec![
            listing("https://x/job/1", "A Engineer", "Acme"),
            listing("https://x/job/2", "B Engineer", "Acme"),
        ];

        let outcome = partition(candidates, &store).await.unwrap();
        assert_eq!(outcome.fresh.len(), 1);
        assert_eq!(outcome.fresh[0].url, "https://x/job/2");
        assert_eq!(outcome.url_duplicates, 1);
        assert_eq!(outcome.content_duplicates, 0);
    }

    #[tokio::test]
    async fn test_content_duplicates_removed_across_urls() {
        let store = MemoryStore::with_listings(vec![listing("https://x/job/1", "A Engineer", "Acme")]);
        // Same posting re-listed under a new URL
        let candidates = vec![listing("https://x/job/99", "A Engineer", "Acme")];

        let outcome = partition(candidates, &store).await.unwrap();
        assert!(outcome.fresh.is_empty());
        assert_eq!(outcome.url_duplicates, 0);
        assert_eq!(outcome.content_duplicates, 1);
        assert_eq!(outcome.duplicates(), 1);
    }

    #[tokio::test]
    async fn test_in_batch_repeats() {
        let store = MemoryStore::new();
        let candidates = vec![
            listing("https://x/job/1", "A Engineer", "Acme"),
            listing("https://x/job/1", "A Engineer", "Acme"),
            listing("https://x/job/2", "A Engineer", "Acme"),
            listing("https://x/job/3", "C Engineer", "Acme"),
        ];

        let outcome = partition(candidates, &store).await.unwrap();
        let urls: Vec<_> = outcome.fresh.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/job/1", "https://x/job/3"]);
        assert_eq!(outcome.url_duplicates, 1);
        assert_eq!(outcome.content_duplicates, 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let outcome = partition(Vec::new(), &MemoryStore::new()).await.unwrap();
        assert!(outcome.fresh.is_empty());
        assert_eq!(outcome.duplicates(), 0);
    }

    proptest! {
        #[test]
        fn output_urls_are_unique(ids in proptest::collection::vec(0u8..8, 0..20)) {
            let candidates: Vec<Listing> = ids
                .iter()
                .enumerate()
                .map(|(i, id)| listing(&format!("https://x/job/{}", id), &format!("Title {}", i), "Acme"))
                .collect();
            let total = candidates.len();

            let outcome = tokio_test::block_on(partition(candidates, &MemoryStore::new())).unwrap();
            let unique: HashSet<_> = outcome.fresh.iter().map(|l| l.url.clone()).collect();
            prop_assert_eq!(unique.len(), outcome.fresh.len());
            prop_assert_eq!(outcome.fresh.len() + outcome.duplicates(), total);
        }
    }
}
