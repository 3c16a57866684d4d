//! Listing extraction from search results pages.
//!
//! Extraction is pure: it maps page HTML to listing candidates without I/O.
//! Missing company or location is not an error; the field falls back to
//! [`UNKNOWN`].

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use super::company::company_from_profile_url;
use super::paginate::{PaginationProbe, PaginationSignal};
use super::profile::PortalProfile;
use super::strategy::{
    compile, element_lines, element_text, AncestorText, Cascade, SelectorAttr, SelectorText,
};
use super::title::{looks_like_css, resolve_title, strip_css};
use crate::types::listing::{Listing, UNKNOWN};
use crate::types::portal::Portal;

/// Anchor-fallback titles must be longer than this.
const MIN_FALLBACK_TITLE_CHARS: usize = 10;

/// Listings and pagination signal read from one results page.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub listings: Vec<Listing>,
    pub pagination: PaginationSignal,
}

/// Extracts listing candidates for one portal.
pub struct ListingExtractor {
    portal: Portal,
    origin: Option<Url>,
    containers: Vec<Selector>,
    title: Cascade,
    company: Cascade,
    location: Cascade,
    links: Cascade,
    posted_at: Cascade,
    first_anchor: Option<Selector>,
    company_links: Option<Selector>,
    fallback_anchors: Option<Selector>,
    fallback_company: Cascade,
    fallback_location: Cascade,
    pagination: PaginationProbe,
}

impl ListingExtractor {
    pub fn for_portal(portal: Portal) -> Self {
        Self::from_profile(&PortalProfile::for_portal(portal))
    }

    pub fn from_profile(profile: &PortalProfile) -> Self {
        let card_ancestor = Selector::parse(profile.card_ancestor).ok();
        let fallback_ancestor = Selector::parse(profile.fallback_ancestor).ok();
        let company_inner = Selector::parse(profile.company_in_ancestor).ok();
        let location_inner = Selector::parse(profile.location_in_ancestor).ok();

        let ancestor_text = |ancestor: &Option<Selector>, inner: &Option<Selector>| match (ancestor, inner) {
            (Some(ancestor), Some(inner)) => {
                Cascade::new().then(AncestorText::new(ancestor.clone(), inner.clone()))
            }
            _ => Cascade::new(),
        };

        let mut company = Cascade::texts(profile.company);
        if let (Some(ancestor), Some(inner)) = (&card_ancestor, &company_inner) {
            company = company.then(AncestorText::new(ancestor.clone(), inner.clone()));
        }

        let mut location = Cascade::texts(profile.location);
        if let (Some(ancestor), Some(inner)) = (&card_ancestor, &location_inner) {
            location = location.then(AncestorText::new(ancestor.clone(), inner.clone()));
        }

        let mut posted_at = Cascade::new();
        if let Ok(time) = Selector::parse("time[datetime]") {
            posted_at = posted_at.then(SelectorAttr::new(time, "datetime"));
        }
        for selector in compile(profile.posted_at) {
            posted_at = posted_at.then(SelectorText::new(selector));
        }

        Self {
            portal: profile.portal,
            origin: Url::parse(profile.portal.origin()).ok(),
            containers: compile(profile.containers),
            title: Cascade::texts(profile.title),
            company,
            location,
            links: Cascade::links(profile.links, profile.portal.company_profile_marker()),
            posted_at,
            first_anchor: Selector::parse("a").ok(),
            company_links: Selector::parse(profile.company_links).ok(),
            fallback_anchors: Selector::parse(profile.fallback_anchors).ok(),
            fallback_company: ancestor_text(&fallback_ancestor, &company_inner),
            fallback_location: ancestor_text(&fallback_ancestor, &location_inner),
            pagination: PaginationProbe::new(profile),
        }
    }

    pub fn portal(&self) -> Portal {
        self.portal
    }

    /// Extract listings and the pagination signal from a results page.
    pub fn analyze(&self, html: &str, captured_at: DateTime<Utc>) -> PageAnalysis {
        let document = Html::parse_document(html);
        PageAnalysis {
            listings: self.extract_document(&document, captured_at),
            pagination: self.pagination.probe(&document),
        }
    }

    /// Extract listings from a results page.
    pub fn extract(&self, html: &str, captured_at: DateTime<Utc>) -> Vec<Listing> {
        self.extract_document(&Html::parse_document(html), captured_at)
    }

    fn extract_document(&self, document: &Html, captured_at: DateTime<Utc>) -> Vec<Listing> {
        let captured = captured_at.to_rfc3339();

        match self.find_cards(document) {
            Some(cards) => {
                let listings: Vec<Listing> = cards
                    .into_iter()
                    .filter_map(|card| self.extract_card(card, &captured))
                    .collect();
                debug!(portal = %self.portal, count = listings.len(), "Extracted listing cards");
                listings
            }
            None => {
                let listings = self.extract_from_anchors(document, &captured);
                debug!(portal = %self.portal, count = listings.len(), "No cards matched, used job links");
                listings
            }
        }
    }

    /// Cards from the first container selector with any match, outermost only.
    fn find_cards<'a>(&self, document: &'a Html) -> Option<Vec<ElementRef<'a>>> {
        self.containers.iter().find_map(|selector| {
            let matched: Vec<ElementRef<'a>> = document.select(selector).collect();
            if matched.is_empty() {
                return None;
            }
            let ids: HashSet<_> = matched.iter().map(|el| el.id()).collect();
            Some(
                matched
                    .into_iter()
                    .filter(|el| !el.ancestors().any(|ancestor| ids.contains(&ancestor.id())))
                    .collect(),
            )
        })
    }

    fn extract_card(&self, card: ElementRef<'_>, captured: &str) -> Option<Listing> {
        let href = self.links.resolve(card)?;
        let url = self.absolute_url(&href)?;
        if self.portal.is_company_profile(&url) {
            return None;
        }

        let raw_title = self.title.resolve(card).unwrap_or_default();
        let anchor_text = self
            .first_anchor
            .as_ref()
            .and_then(|selector| card.select(selector).next())
            .map(element_text);
        let title = resolve_title(&raw_title, || element_lines(card), anchor_text.as_deref())?;

        let company = self
            .company
            .resolve(card)
            .or_else(|| self.company_from_links(card))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let location = self
            .location
            .resolve(card)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let posted_at = self
            .posted_at
            .resolve(card)
            .unwrap_or_else(|| captured.to_string());

        Some(
            Listing::new(self.portal, title, url)
                .with_company(company)
                .with_location(location)
                .with_posted_at(posted_at),
        )
    }

    /// Listings built from bare job links when no card selector matches.
    fn extract_from_anchors(&self, document: &Html, captured: &str) -> Vec<Listing> {
        let Some(anchors) = &self.fallback_anchors else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut listings = Vec::new();
        for anchor in document.select(anchors) {
            let Some(url) = anchor
                .value()
                .attr("href")
                .and_then(|href| self.absolute_url(href))
            else {
                continue;
            };
            if self.portal.is_company_profile(&url) || seen.contains(&url) {
                continue;
            }

            let mut title = element_text(anchor);
            if looks_like_css(&title) {
                title = strip_css(&title);
            }
            if title.contains('{') || title.chars().count() <= MIN_FALLBACK_TITLE_CHARS {
                continue;
            }

            let company = self
                .fallback_company
                .resolve(anchor)
                .unwrap_or_else(|| UNKNOWN.to_string());
            let location = self
                .fallback_location
                .resolve(anchor)
                .unwrap_or_else(|| UNKNOWN.to_string());

            seen.insert(url.clone());
            listings.push(
                Listing::new(self.portal, title, url)
                    .with_company(company)
                    .with_location(location)
                    .with_posted_at(captured),
            );
        }
        listings
    }

    /// Company name decoded from a profile link inside the card.
    fn company_from_links(&self, card: ElementRef<'_>) -> Option<String> {
        let selector = self.company_links.as_ref()?;
        card.select(selector)
            .filter_map(|link| link.value().attr("href"))
            .find_map(|href| company_from_profile_url(self.portal, href))
    }

    fn absolute_url(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return None;
        }
        let url = match &self.origin {
            Some(origin) => origin.join(href).ok()?,
            None => Url::parse(href).ok()?,
        };
        matches!(url.scheme(), "http" | "https").then(|| url.to_string())
    }
}
