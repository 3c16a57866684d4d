//! Pagination signals and the continue/stop decision.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::profile::PortalProfile;
use super::strategy::{collapse_whitespace, compile};
use crate::types::config::ScanConfig;
use crate::types::report::StopReason;

lazy_static! {
    static ref PAGE_OF_TOTAL: Regex = Regex::new(r"(?i)(\d+)\s*(?:of|von|/)\s*(\d+)").unwrap();
}

/// What a results page says about further pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationSignal {
    /// Explicit "X of Y" indicator
    Indicator { current: u32, total: u32 },
    /// A next-page control exists
    NextControl { enabled: bool },
    /// Nothing to go on
    Unknown,
}

/// Whether to fetch another page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDecision {
    Continue,
    Stop(StopReason),
}

/// Parse "2 of 5", "Seite 2 von 5" or "2 / 5".
pub fn parse_indicator(text: &str) -> Option<(u32, u32)> {
    let caps = PAGE_OF_TOTAL.captures(text)?;
    let current = caps.get(1)?.as_str().parse().ok()?;
    let total = caps.get(2)?.as_str().parse().ok()?;
    Some((current, total))
}

/// Reads pagination signals from a results page.
pub struct PaginationProbe {
    containers: Vec<Selector>,
    next_controls: Vec<Selector>,
}

impl PaginationProbe {
    pub fn new(profile: &PortalProfile) -> Self {
        Self {
            containers: compile(profile.pagination),
            next_controls: compile(profile.next_control),
        }
    }

    pub fn probe(&self, document: &Html) -> PaginationSignal {
        let text = self
            .containers
            .iter()
            .flat_map(|selector| document.select(selector))
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join(" ");

        if let Some((current, total)) = parse_indicator(&collapse_whitespace(&text)) {
            return PaginationSignal::Indicator { current, total };
        }

        self.next_controls
            .iter()
            .find_map(|selector| document.select(selector).next())
            .map(|control| PaginationSignal::NextControl {
                enabled: !is_disabled(control),
            })
            .unwrap_or(PaginationSignal::Unknown)
    }
}

fn is_disabled(control: ElementRef<'_>) -> bool {
    let element = control.value();
    element.classes().any(|class| class.contains("disabled"))
        || element.attr("disabled").is_some()
        || element.attr("aria-disabled") == Some("true")
}

/// Decide whether to fetch the page after `page` (1-based).
pub fn decide(signal: PaginationSignal, page: u32, config: &ScanConfig) -> PageDecision {
    let decision = match signal {
        PaginationSignal::Indicator { current, total } if current >= total => {
            PageDecision::Stop(StopReason::LastPage)
        }
        PaginationSignal::Indicator { .. } => PageDecision::Continue,
        PaginationSignal::NextControl { enabled: true } => PageDecision::Continue,
        PaginationSignal::NextControl { enabled: false } => PageDecision::Stop(StopReason::LastPage),
        PaginationSignal::Unknown if page >= config.soft_page_cap => {
            PageDecision::Stop(StopReason::SoftCap)
        }
        PaginationSignal::Unknown => PageDecision::Continue,
    };

    match decision {
        PageDecision::Continue if page >= config.max_pages => PageDecision::Stop(StopReason::PageCap),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(html: &str) -> PaginationSignal {
        PaginationProbe::new(&PortalProfile::stepstone()).probe(&Html::parse_document(html))
    }

    #[test]
    fn test_parse_indicator_variants() {
        assert_eq!(parse_indicator("Seite 2 von 5"), Some((2, 5)));
        assert_eq!(parse_indicator("Page 3 OF 3"), Some((3, 3)));
        assert_eq!(parse_indicator("1 / 12"), Some((1, 12)));
        assert_eq!(parse_indicator("Weiter"), None);
    }

    #[test]
    fn test_probe_indicator() {
        let html = r#"<nav class="pagination-wrapper"><span>Seite</span> <span>4</span> von <span>4</span></nav>"#;
        assert_eq!(probe(html), PaginationSignal::Indicator { current: 4, total: 4 });
    }

    #[test]
    fn test_probe_next_control() {
        let enabled = r#"<div><a class="btn-next" href="?page=2">Weiter</a></div>"#;
        assert_eq!(probe(enabled), PaginationSignal::NextControl { enabled: true });

        let disabled = r#"<div><a class="btn-next disabled">Weiter</a></div>"#;
        assert_eq!(probe(disabled), PaginationSignal::NextControl { enabled: false });

        let aria = r#"<div><button aria-label="Next page" aria-disabled="true">›</button></div>"#;
        assert_eq!(probe(aria), PaginationSignal::NextControl { enabled: false });
    }

    #[test]
    fn test_probe_unknown() {
        assert_eq!(probe("<div><p>no pagination here</p></div>"), PaginationSignal::Unknown);
    }

    #[test]
    fn test_decide() {
        let config = ScanConfig::default();

        assert_eq!(
            decide(PaginationSignal::Indicator { current: 2, total: 5 }, 2, &config),
            PageDecision::Continue
        );
        assert_eq!(
            decide(PaginationSignal::Indicator { current: 5, total: 5 }, 5, &config),
            PageDecision::Stop(StopReason::LastPage)
        );
        assert_eq!(
            decide(PaginationSignal::NextControl { enabled: false }, 1, &config),
            PageDecision::Stop(StopReason::LastPage)
        );
        assert_eq!(decide(PaginationSignal::Unknown, 9, &config), PageDecision::Continue);
        assert_eq!(
            decide(PaginationSignal::Unknown, 10, &config),
            PageDecision::Stop(StopReason::SoftCap)
        );
    }

    #[test]
    fn test_hard_cap_overrides_continue() {
        let config = ScanConfig::default();
        assert_eq!(
            decide(PaginationSignal::NextControl { enabled: true }, 20, &config),
            PageDecision::Stop(StopReason::PageCap)
        );
        assert_eq!(
            decide(PaginationSignal::Indicator { current: 20, total: 99 }, 20, &config),
            PageDecision::Stop(StopReason::PageCap)
        );
    }
}
