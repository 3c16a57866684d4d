//! Scan orchestration: the page loop per (role, portal).
//!
//! ```text
//! fetch page → extract → dedup → detail batches → score → insert → paginate
//! ```
//!
//! Roles and portals are processed strictly one after another. A portal that
//! fails (fetch error, rate limit, store failure) ends with a failure
//! [`StopReason`] in its report; listings already inserted are kept and the
//! remaining portals and roles still run.

use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::dedup;
use super::detail::DetailFetcher;
use super::extract::ListingExtractor;
use super::paginate::{decide, PageDecision};
use super::relevance::RelevanceScorer;
use crate::error::{ScanError, ScanResult};
use crate::traits::fetcher::{FetchOptions, PageFetcher};
use crate::traits::store::ListingStore;
use crate::types::config::ScanConfig;
use crate::types::listing::{InsertOutcome, Listing};
use crate::types::portal::Portal;
use crate::types::report::{PortalReport, ScanSummary, StopReason};
use crate::types::role::slugify;

/// Runs scans with an injected fetcher and store.
pub struct Scanner<F: PageFetcher, S: ListingStore> {
    fetcher: F,
    store: S,
    config: ScanConfig,
    scorer: RelevanceScorer,
}

impl<F: PageFetcher, S: ListingStore> Scanner<F, S> {
    pub fn new(fetcher: F, store: S, config: ScanConfig) -> ScanResult<Self> {
        config.validate()?;
        let scorer = RelevanceScorer::new(config.min_relevance_score);
        Ok(Self {
            fetcher,
            store,
            config,
            scorer,
        })
    }

    pub fn with_scorer(mut self, scorer: RelevanceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan every portal for one role.
    pub async fn scan(&self, role: &str, portals: &[Portal]) -> ScanResult<ScanSummary> {
        let role_slug = slugify(role);
        if role_slug.is_empty() {
            return Err(ScanError::Config(format!(
                "role {:?} has no usable characters",
                role
            )));
        }

        info!(role = %role, role_slug = %role_slug, portals = portals.len(), "Starting scan");

        let mut reports = Vec::with_capacity(portals.len());
        for &portal in portals {
            reports.push(self.scan_portal(role, &role_slug, portal).await);
        }

        let summary = ScanSummary {
            role: role.to_string(),
            role_slug,
            reports,
        };
        info!(role = %role, inserted = summary.inserted(), "Scan finished");
        Ok(summary)
    }

    /// Scan several roles, one after another.
    ///
    /// A role that cannot be slugified is skipped with a warning.
    pub async fn scan_roles(&self, roles: &[String], portals: &[Portal]) -> Vec<ScanSummary> {
        let mut summaries = Vec::with_capacity(roles.len());
        for role in roles {
            match self.scan(role, portals).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!(role = %role, error = %e, "Skipping role"),
            }
        }
        summaries
    }

    async fn scan_portal(&self, role: &str, role_slug: &str, portal: Portal) -> PortalReport {
        let started = Instant::now();
        let mut report = PortalReport::new(portal, role_slug);
        let extractor = ListingExtractor::for_portal(portal);
        let details = DetailFetcher::new(
            &self.fetcher,
            self.config.batch_size,
            self.config.batch_pause(),
        );

        let mut page = 1;
        loop {
            let decision = self
                .scan_page(&extractor, &details, role, page, &mut report)
                .await;
            report.elapsed = started.elapsed();

            let every = self.config.stats_every_pages;
            if every > 0 && page % every == 0 {
                info!(
                    portal = %portal,
                    role_slug = %role_slug,
                    pages = report.pages_scanned,
                    found = report.listings_found,
                    inserted = report.inserted,
                    duplicate_rate = %format!("{:.1}%", report.duplicate_rate()),
                    listings_per_sec = %format!("{:.2}", report.listings_per_second()),
                    "Scan progress"
                );
            }

            match decision {
                PageDecision::Continue => {
                    page += 1;
                    if !self.config.page_pause().is_zero() {
                        tokio::time::sleep(self.config.page_pause()).await;
                    }
                }
                PageDecision::Stop(reason) => {
                    report.stop_reason = Some(reason);
                    break;
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            portal = %portal,
            role_slug = %role_slug,
            pages = report.pages_scanned,
            found = report.listings_found,
            inserted = report.inserted,
            duplicates = report.duplicates(),
            duplicate_rate = %format!("{:.1}%", report.duplicate_rate()),
            filtered = report.filtered,
            errors = report.errors(),
            stop_reason = ?report.stop_reason,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Portal scan finished"
        );
        report
    }

    /// Process one results page and decide whether to fetch the next.
    async fn scan_page(
        &self,
        extractor: &ListingExtractor,
        details: &DetailFetcher<'_, F>,
        role: &str,
        page: u32,
        report: &mut PortalReport,
    ) -> PageDecision {
        let portal = extractor.portal();
        let url = portal.search_url(&report.role_slug, page);

        debug!(portal = %portal, page, url = %url, "Fetching listing page");
        let fetched = match self.fetcher.fetch(&url, &FetchOptions::listing_page()).await {
            Ok(fetched) => fetched,
            Err(e) if e.is_rate_limited() => {
                warn!(portal = %portal, page, "Rate limited, stopping portal");
                return PageDecision::Stop(StopReason::RateLimited);
            }
            Err(e) => {
                warn!(portal = %portal, page, error = %e, "Failed to fetch listing page");
                return PageDecision::Stop(StopReason::FetchFailed(e.to_string()));
            }
        };
        report.pages_scanned += 1;

        let analysis = extractor.analyze(&fetched.html, Utc::now());
        if analysis.listings.is_empty() {
            info!(portal = %portal, page, status = fetched.status, "No listings on page");
            return PageDecision::Stop(StopReason::EmptyPage);
        }
        let pagination = analysis.pagination;

        info!(portal = %portal, page, found = analysis.listings.len(), "Extracted listings");
        report.listings_found += analysis.listings.len();

        let candidates: Vec<Listing> = analysis
            .listings
            .into_iter()
            .map(|listing| listing.with_role_slug(report.role_slug.clone()))
            .collect();

        let outcome = match dedup::partition(candidates, &self.store).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(portal = %portal, page, error = %e, "Duplicate check failed");
                return PageDecision::Stop(StopReason::StoreFailed(e.to_string()));
            }
        };
        report.url_duplicates += outcome.url_duplicates;
        report.content_duplicates += outcome.content_duplicates;

        let mut fresh = outcome.fresh;
        let enriched = details.enrich(&mut fresh).await;
        report.detail_fetches += enriched.attempted;
        report.detail_errors += enriched.errors;

        for mut listing in fresh {
            if self.scorer.annotate(&mut listing, role) {
                report.filtered += 1;
                if self.config.drop_filtered {
                    debug!(
                        url = %listing.url,
                        reason = listing.filtered_reason.as_deref().unwrap_or_default(),
                        "Dropping filtered listing"
                    );
                    continue;
                }
            }

            match self.store.insert_if_absent(&listing).await {
                InsertOutcome::Inserted => {
                    report.inserted += 1;
                    if listing.has_extraction_gap() {
                        report.extraction_gaps += 1;
                    }
                    debug!(url = %listing.url, score = listing.relevance_score, "Inserted listing");
                }
                InsertOutcome::AlreadyExists => {
                    report.already_present += 1;
                    debug!(url = %listing.url, "Listing appeared concurrently");
                }
                InsertOutcome::Failed(e) => {
                    report.insert_failures += 1;
                    warn!(url = %listing.url, error = %e, "Failed to insert listing");
                }
            }
        }

        decide(pagination, page, &self.config)
    }
}
