//! The job portals the pipeline knows how to scan.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A job portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Portal {
    StepStone,
    Glassdoor,
}

impl Portal {
    /// All supported portals, in scan order.
    pub const ALL: [Portal; 2] = [Portal::StepStone, Portal::Glassdoor];

    /// Stable lowercase name, as stored in the `source` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Portal::StepStone => "stepstone",
            Portal::Glassdoor => "glassdoor",
        }
    }

    /// Scheme and host that relative links are resolved against.
    pub fn origin(&self) -> &'static str {
        match self {
            Portal::StepStone => "https://www.stepstone.de",
            Portal::Glassdoor => "https://www.glassdoor.de",
        }
    }

    /// Search results URL for a role slug and a 1-based page number.
    ///
    /// Both portals are queried for full-time positions posted within the
    /// last day, newest first.
    pub fn search_url(&self, role_slug: &str, page: u32) -> String {
        match self {
            Portal::StepStone => {
                let base = format!(
                    "{}/jobs/vollzeit/{}?sort=1&action=facet_selected%3bworktypes%3b80001&ag=age_1",
                    self.origin(),
                    role_slug
                );
                if page > 1 {
                    format!("{}&page={}", base, page)
                } else {
                    base
                }
            }
            Portal::Glassdoor => {
                let base = format!(
                    "{}/Job/deutschland-{}-jobs-SRCH_IL.0,11_IN96_KO12,38.htm?fromAge=1",
                    self.origin(),
                    role_slug
                );
                if page > 1 {
                    format!("{}&p={}", base, page)
                } else {
                    base
                }
            }
        }
    }

    /// Path fragment that marks a company profile page rather than a posting.
    pub fn company_profile_marker(&self) -> &'static str {
        match self {
            Portal::StepStone => "/cmp/",
            Portal::Glassdoor => "/Overview/",
        }
    }

    /// Whether a URL points at a company profile page.
    pub fn is_company_profile(&self, url: &str) -> bool {
        url.contains(self.company_profile_marker())
    }
}

impl fmt::Display for Portal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Portal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stepstone" => Ok(Portal::StepStone),
            "glassdoor" => Ok(Portal::Glassdoor),
            other => Err(format!("unknown portal: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepstone_search_urls() {
        let first = Portal::StepStone.search_url("embedded-engineer", 1);
        assert_eq!(
            first,
            "https://www.stepstone.de/jobs/vollzeit/embedded-engineer?sort=1&action=facet_selected%3bworktypes%3b80001&ag=age_1"
        );

        let third = Portal::StepStone.search_url("embedded-engineer", 3);
        assert!(third.ends_with("&ag=age_1&page=3"));
    }

    #[test]
    fn test_glassdoor_search_urls() {
        let first = Portal::Glassdoor.search_url("firmware", 1);
        assert_eq!(
            first,
            "https://www.glassdoor.de/Job/deutschland-firmware-jobs-SRCH_IL.0,11_IN96_KO12,38.htm?fromAge=1"
        );
        assert!(Portal::Glassdoor.search_url("firmware", 2).ends_with("?fromAge=1&p=2"));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("StepStone".parse::<Portal>(), Ok(Portal::StepStone));
        assert_eq!(" glassdoor ".parse::<Portal>(), Ok(Portal::Glassdoor));
        assert!("indeed".parse::<Portal>().is_err());
        assert_eq!(Portal::Glassdoor.to_string(), "glassdoor");
    }

    #[test]
    fn test_company_profile_detection() {
        assert!(Portal::StepStone.is_company_profile("https://www.stepstone.de/cmp/de/acme-gmbh-123/jobs"));
        assert!(!Portal::StepStone.is_company_profile("https://www.stepstone.de/stellenangebote--x-123-inline.html"));
        assert!(Portal::Glassdoor.is_company_profile("https://www.glassdoor.de/Overview/Working-at-Acme-EI_IE1.11,15.htm"));
    }
}
