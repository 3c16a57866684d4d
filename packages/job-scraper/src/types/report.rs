//! Scan reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::portal::Portal;

/// Why the page loop of a (role, portal) scan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum StopReason {
    /// A page yielded no listings
    EmptyPage,
    /// The page said it was the last one
    LastPage,
    /// No pagination signal and the soft page cap was reached
    SoftCap,
    /// The hard page cap was reached
    PageCap,
    /// The portal kept answering 403
    RateLimited,
    FetchFailed(String),
    StoreFailed(String),
}

impl StopReason {
    /// Whether the scan ended because something went wrong.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StopReason::RateLimited | StopReason::FetchFailed(_) | StopReason::StoreFailed(_)
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyPage => f.write_str("empty page"),
            StopReason::LastPage => f.write_str("last page"),
            StopReason::SoftCap => f.write_str("soft page cap"),
            StopReason::PageCap => f.write_str("hard page cap"),
            StopReason::RateLimited => f.write_str("rate limited"),
            StopReason::FetchFailed(e) => write!(f, "fetch failed: {}", e),
            StopReason::StoreFailed(e) => write!(f, "store failed: {}", e),
        }
    }
}

/// Counters for one (role, portal) scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalReport {
    pub portal: Portal,
    pub role_slug: String,
    pub pages_scanned: u32,
    pub listings_found: usize,
    pub url_duplicates: usize,
    pub content_duplicates: usize,
    pub detail_fetches: usize,
    pub detail_errors: usize,
    /// Listings stored with an "Unknown" company or location
    pub extraction_gaps: usize,
    pub filtered: usize,
    pub inserted: usize,
    pub already_present: usize,
    pub insert_failures: usize,
    pub stop_reason: Option<StopReason>,
    pub elapsed: Duration,
}

impl PortalReport {
    pub fn new(portal: Portal, role_slug: impl Into<String>) -> Self {
        Self {
            portal,
            role_slug: role_slug.into(),
            pages_scanned: 0,
            listings_found: 0,
            url_duplicates: 0,
            content_duplicates: 0,
            detail_fetches: 0,
            detail_errors: 0,
            extraction_gaps: 0,
            filtered: 0,
            inserted: 0,
            already_present: 0,
            insert_failures: 0,
            stop_reason: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn duplicates(&self) -> usize {
        self.url_duplicates + self.content_duplicates
    }

    /// Share of found listings that were duplicates, in percent.
    pub fn duplicate_rate(&self) -> f64 {
        if self.listings_found == 0 {
            return 0.0;
        }
        self.duplicates() as f64 / self.listings_found as f64 * 100.0
    }

    pub fn listings_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.listings_found as f64 / secs
    }

    /// Errors of any kind counted during the scan.
    pub fn errors(&self) -> usize {
        let stop_error = self
            .stop_reason
            .as_ref()
            .map_or(0, |reason| usize::from(reason.is_failure()));
        self.detail_errors + self.insert_failures + stop_error
    }
}

/// Outcome of scanning one role across portals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub role: String,
    pub role_slug: String,
    pub reports: Vec<PortalReport>,
}

impl ScanSummary {
    /// Number of new listings persisted across all portals.
    pub fn inserted(&self) -> usize {
        self.reports.iter().map(|r| r.inserted).sum()
    }

    pub fn report_for(&self, portal: Portal) -> Option<&PortalReport> {
        self.reports.iter().find(|r| r.portal == portal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_rate() {
        let mut report = PortalReport::new(Portal::StepStone, "firmware");
        assert_eq!(report.duplicate_rate(), 0.0);

        report.listings_found = 10;
        report.url_duplicates = 2;
        report.content_duplicates = 3;
        assert_eq!(report.duplicates(), 5);
        assert!((report.duplicate_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_errors_include_failed_stop() {
        let mut report = PortalReport::new(Portal::Glassdoor, "firmware");
        report.detail_errors = 2;
        report.stop_reason = Some(StopReason::EmptyPage);
        assert_eq!(report.errors(), 2);

        report.stop_reason = Some(StopReason::RateLimited);
        assert_eq!(report.errors(), 3);
    }

    #[test]
    fn test_summary_sums_inserted() {
        let mut a = PortalReport::new(Portal::StepStone, "x");
        a.inserted = 3;
        let mut b = PortalReport::new(Portal::Glassdoor, "x");
        b.inserted = 4;
        let summary = ScanSummary {
            role: "X".into(),
            role_slug: "x".into(),
            reports: vec![a, b],
        };
        assert_eq!(summary.inserted(), 7);
        assert_eq!(summary.report_for(Portal::Glassdoor).map(|r| r.inserted), Some(4));
    }
}
