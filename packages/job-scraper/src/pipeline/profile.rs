//! Per-portal selector profiles.
//!
//! Selectors are listed most specific first. They are plain data so a markup
//! change on a portal only touches this file.

use crate::types::portal::Portal;

/// Selectors describing a portal's search results markup.
#[derive(Debug, Clone)]
pub struct PortalProfile {
    pub portal: Portal,

    /// Candidate listing-card selectors; the first with any match wins
    pub containers: &'static [&'static str],

    pub title: &'static [&'static str],
    pub company: &'static [&'static str],
    pub location: &'static [&'static str],
    pub links: &'static [&'static str],
    pub posted_at: &'static [&'static str],

    /// Enclosing container searched when a field is missing from the card
    pub card_ancestor: &'static str,
    pub company_in_ancestor: &'static str,
    pub location_in_ancestor: &'static str,

    /// Links to company profile pages, used for the company name fallback
    pub company_links: &'static str,

    /// Job links scanned when no card selector matches
    pub fallback_anchors: &'static str,
    pub fallback_ancestor: &'static str,

    /// Containers holding "page X of Y" text
    pub pagination: &'static [&'static str],
    pub next_control: &'static [&'static str],
}

impl PortalProfile {
    pub fn for_portal(portal: Portal) -> Self {
        match portal {
            Portal::StepStone => Self::stepstone(),
            Portal::Glassdoor => Self::glassdoor(),
        }
    }

    pub fn stepstone() -> Self {
        Self {
            portal: Portal::StepStone,
            containers: &[
                r#"article[data-testid="job-item"]"#,
                r#"article[class*="job"]"#,
                ".job-item",
                ".job-card",
                r#"[class*="JobCard"]"#,
                r#"[data-testid*="job"]"#,
            ],
            title: &[
                r#"[data-testid="job-title"]"#,
                "h2",
                "h3",
                ".job-title",
                r#"a[class*="title"]"#,
                r#"[class*="JobTitle"]"#,
            ],
            company: &[
                r#"[data-testid="job-company"]"#,
                ".company",
                ".employer",
                r#"[class*="company"]"#,
                r#"[class*="Company"]"#,
                r#"[class*="employer"]"#,
                r#"[class*="Employer"]"#,
            ],
            location: &[
                r#"[data-testid="job-location"]"#,
                ".location",
                r#"[class*="location"]"#,
                r#"[class*="Location"]"#,
                r#"[class*="city"]"#,
                r#"[class*="City"]"#,
                r#"[class*="place"]"#,
                r#"[class*="Place"]"#,
            ],
            links: &[
                r#"a[href*="/stellenangebote"]"#,
                r#"a[href*="/job/"]"#,
                r#"a[href*="/jobs/"]"#,
                "a[href]",
            ],
            posted_at: &[
                r#"[data-testid="job-date"]"#,
                ".date",
                r#"[class*="date"]"#,
                "time",
            ],
            card_ancestor: r#"article, div[class*="job"], li[class*="job"], tr[class*="job"]"#,
            company_in_ancestor: r#"[class*="company"], [class*="employer"]"#,
            location_in_ancestor: r#"[class*="location"], [class*="city"], [class*="place"]"#,
            company_links: r#"a[href*="/cmp/"]"#,
            fallback_anchors: r#"a[href*="/stellenangebote"], a[href*="/job/"]"#,
            fallback_ancestor: r#"article, div[class*="job"], div[class*="listing"]"#,
            pagination: &[r#"[class*="pagination"]"#, r#"[class*="Pagination"]"#],
            next_control: &[
                r#"a[class*="next"]"#,
                r#"[aria-label*="next"]"#,
                r#"[aria-label*="Next"]"#,
                r#"[aria-label*="Nächste"]"#,
            ],
        }
    }

    pub fn glassdoor() -> Self {
        Self {
            portal: Portal::Glassdoor,
            containers: &[
                r#"[data-test="job-listing"]"#,
                ".react-job-listing",
                r#"[class*="JobCard"]"#,
                r#"[class*="jobContainer"]"#,
            ],
            title: &[
                r#"[data-test="job-title"]"#,
                "h2",
                "h3",
                r#"a[class*="jobTitle"]"#,
                r#"[class*="JobTitle"]"#,
            ],
            company: &[
                r#"[data-test="employer-name"]"#,
                r#"[class*="employerName"]"#,
                r#"[class*="EmployerProfile"]"#,
                r#"[class*="company"]"#,
            ],
            location: &[
                r#"[data-test="job-location"]"#,
                r#"[class*="location"]"#,
                r#"[class*="jobLocation"]"#,
                r#"[class*="Location"]"#,
            ],
            links: &[r#"a[href*="/Job/"]"#, r#"a[href*="/job/"]"#, r#"a[href*="/partner/"]"#, "a[href]"],
            posted_at: &[r#"[data-test="job-age"]"#, r#"[class*="jobAge"]"#, r#"[class*="date"]"#],
            card_ancestor: r#"li, article, div[class*="job"]"#,
            company_in_ancestor: r#"[class*="employer"], [class*="company"]"#,
            location_in_ancestor: r#"[class*="location"], [class*="Location"]"#,
            company_links: r#"a[href*="/Overview/"]"#,
            fallback_anchors: r#"a[href*="/Job/"], a[href*="/job/"]"#,
            fallback_ancestor: r#"[class*="job"], [class*="listing"], article"#,
            pagination: &[r#"[class*="pagination"]"#, r#"[class*="Pagination"]"#, r#"[data-test="page-x-of-y"]"#],
            next_control: &[
                r#"button[aria-label*="Next"]"#,
                r#"a[aria-label*="Next"]"#,
                r#"[class*="nextButton"]"#,
            ],
        }
    }
}
