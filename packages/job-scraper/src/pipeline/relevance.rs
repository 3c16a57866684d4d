//! Keyword relevance scoring.
//!
//! The score is advisory: it is stored with the listing and callers decide
//! whether a filtered listing is persisted.

use std::fmt;

use crate::types::listing::Listing;

/// Embedded and hardware vocabulary.
pub const POSITIVE_KEYWORDS: &[&str] = &[
    "embedded systems",
    "embedded software",
    "embedded firmware",
    "embedded development",
    "firmware development",
    "firmware engineer",
    "driver development",
    "bootloader",
    "microcontroller",
    "microprocessor",
    "arm",
    "cortex",
    "stm32",
    "avr",
    "pic",
    "ti",
    "arduino",
    "raspberry pi",
    "esp32",
    "esp8266",
    "beaglebone",
    "nrf",
    "nordic",
    "c/c++",
    "assembly language",
    "real-time",
    "rtos",
    "bare metal",
    "hal",
    "system programming",
    "low level programming",
    "cross compilation",
    "toolchain",
    "spi",
    "i2c",
    "uart",
    "can bus",
    "ethernet",
    "usb",
    "gpio",
    "pwm",
    "adc",
    "dac",
    "hardware interface",
    "peripheral driver",
    "register programming",
    "real-time systems",
    "deterministic",
    "memory management",
    "interrupt handling",
    "power management",
    "hardware abstraction",
    "board support package",
    "bsp",
    "iot",
    "edge computing",
    "sensor fusion",
    "motor control",
    "power electronics",
    "pcb",
    "electronics",
    "semiconductor",
    "asic",
    "fpga",
    "verilog",
    "vhdl",
    "automotive",
    "automotive embedded",
    "medical devices",
    "industrial control",
    "aerospace",
    "telecommunications",
    "consumer electronics",
];

/// Web, mobile, ML and cloud vocabulary that suggests an unrelated role.
pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "web development",
    "web developer",
    "frontend",
    "backend",
    "full stack",
    "javascript",
    "react",
    "angular",
    "vue",
    "node.js",
    "python web",
    "django",
    "mobile app",
    "ios development",
    "android development",
    "app store",
    "ui/ux",
    "user interface",
    "data science",
    "machine learning",
    "ai",
    "cloud",
    "aws",
    "azure",
    "docker",
    "kubernetes",
    "devops",
    "website",
    "e-commerce",
    "wordpress",
    "shopify",
    "web design",
    "social media",
    "marketing technology",
    "fintech",
    "blockchain",
];

const TITLE_WEIGHT: i32 = 1;
const BODY_WEIGHT: i32 = 1;
const NEGATIVE_PENALTY: i32 = 2;
const ROLE_BONUS: i32 = 3;

/// Why a listing scored below the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    IrrelevantTerms,
    NoRelevantKeywords,
    LowScore,
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            FilterReason::IrrelevantTerms => "contains irrelevant terms",
            FilterReason::NoRelevantKeywords => "no relevant keywords found",
            FilterReason::LowScore => "low relevance score",
        };
        f.write_str(reason)
    }
}

/// Result of scoring one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relevance {
    pub score: i32,
    /// Positive keywords in match order; title hits are repeated as `"<kw> (title)"`
    pub matched_keywords: Vec<String>,
    pub filtered_reason: Option<FilterReason>,
}

impl Relevance {
    pub fn is_filtered(&self) -> bool {
        self.filtered_reason.is_some()
    }

    pub fn apply_to(self, listing: &mut Listing) {
        listing.relevance_score = self.score;
        listing.matched_keywords = self.matched_keywords;
        listing.filtered_reason = self.filtered_reason.map(|r| r.to_string());
    }
}

/// Scores listings by keyword overlap.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    positive: Vec<String>,
    negative: Vec<String>,
    min_score: i32,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(2)
    }
}

impl RelevanceScorer {
    pub fn new(min_score: i32) -> Self {
        Self {
            positive: POSITIVE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            negative: NEGATIVE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            min_score,
        }
    }

    /// Replace both keyword sets. Keywords are matched case-insensitively.
    pub fn with_keywords(mut self, positive: &[&str], negative: &[&str]) -> Self {
        self.positive = positive.iter().map(|k| k.to_lowercase()).collect();
        self.negative = negative.iter().map(|k| k.to_lowercase()).collect();
        self
    }

    pub fn min_score(&self) -> i32 {
        self.min_score
    }

    pub fn score(&self, title: &str, description: &str, company: &str, target_role: &str) -> Relevance {
        let text = format!("{} {} {}", title, description, company).to_lowercase();
        let title = title.to_lowercase();
        let role = target_role.to_lowercase();

        let mut score = 0;
        let mut matched_keywords = Vec::new();

        for keyword in self.positive.iter().filter(|k| text.contains(k.as_str())) {
            score += BODY_WEIGHT;
            matched_keywords.push(keyword.clone());

            if title.contains(keyword.as_str()) {
                score += TITLE_WEIGHT;
                matched_keywords.push(format!("{} (title)", keyword));
            }
        }

        let negative_hits = self
            .negative
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .count() as i32;
        score -= negative_hits * NEGATIVE_PENALTY;

        let role_in_title = !role.is_empty() && title.contains(&role);
        if role_in_title || (role.contains("embedded") && text.contains("embedded")) {
            score += ROLE_BONUS;
        }

        let filtered_reason = if score >= self.min_score {
            None
        } else if negative_hits > 0 {
            Some(FilterReason::IrrelevantTerms)
        } else if matched_keywords.is_empty() {
            Some(FilterReason::NoRelevantKeywords)
        } else {
            Some(FilterReason::LowScore)
        };

        Relevance {
            score,
            matched_keywords,
            filtered_reason,
        }
    }

    /// Score a listing against the role it was found for and store the result on it.
    pub fn annotate(&self, listing: &mut Listing, target_role: &str) -> bool {
        let relevance = self.score(
            &listing.title,
            &listing.description,
            &listing.company,
            target_role,
        );
        let filtered = relevance.is_filtered();
        relevance.apply_to(listing);
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::portal::Portal;

    #[test]
    fn test_positive_only_passes() {
        let relevance = RelevanceScorer::default().score(
            "Firmware Engineer",
            "Bare metal drivers for STM32 microcontroller using RTOS",
            "Acme",
            "accountant",
        );
        assert!(relevance.score >= 2);
        assert!(!relevance.is_filtered());
        assert!(relevance.matched_keywords.contains(&"stm32".to_string()));
        assert!(relevance.matched_keywords.contains(&"firmware engineer (title)".to_string()));
    }

    #[test]
    fn test_negative_only_is_filtered() {
        let relevance = RelevanceScorer::default().score(
            "Frontend Developer",
            "React and JavaScript web development for our website",
            "Shop GmbH",
            "accountant",
        );
        assert!(relevance.score <= 0);
        assert_eq!(relevance.filtered_reason, Some(FilterReason::IrrelevantTerms));
        assert_eq!(
            relevance.filtered_reason.map(|r| r.to_string()).as_deref(),
            Some("contains irrelevant terms")
        );
    }

    #[test]
    fn test_no_matches() {
        let relevance =
            RelevanceScorer::default().score("Office Clerk", "Filing documents", "Bureau", "accountant");
        assert_eq!(relevance.score, 0);
        assert!(relevance.matched_keywords.is_empty());
        assert_eq!(relevance.filtered_reason, Some(FilterReason::NoRelevantKeywords));
    }

    #[test]
    fn test_title_match_scores_higher_than_body_match() {
        let scorer = RelevanceScorer::default();
        let in_title = scorer.score("FPGA Engineer", "", "", "accountant");
        let in_body = scorer.score("Engineer", "FPGA team", "", "accountant");
        assert!(in_title.score > in_body.score);
        assert_eq!(in_body.filtered_reason, Some(FilterReason::LowScore));
    }

    #[test]
    fn test_role_bonus() {
        let scorer = RelevanceScorer::default();
        assert_eq!(scorer.score("Office Clerk", "", "", "office clerk").score, 3);
        assert_eq!(
            scorer.score("Developer", "embedded projects", "", "Embedded Engineer").score,
            3
        );
    }

    #[test]
    fn test_custom_keywords_and_threshold() {
        let scorer = RelevanceScorer::new(1).with_keywords(&["Kotlin"], &["Excel"]);
        let relevance = scorer.score("Kotlin Developer", "", "", "x");
        assert_eq!(relevance.score, 2);
        assert_eq!(relevance.matched_keywords, vec!["kotlin", "kotlin (title)"]);
        assert!(scorer.score("Developer", "Excel", "", "x").is_filtered());
    }

    #[test]
    fn test_annotate_listing() {
        let mut listing = Listing::new(Portal::StepStone, "Office Clerk", "https://x/job/1")
            .with_description("Filing documents");
        let filtered = RelevanceScorer::default().annotate(&mut listing, "accountant");

        assert!(filtered);
        assert_eq!(listing.relevance_score, 0);
        assert_eq!(listing.filtered_reason.as_deref(), Some("no relevant keywords found"));
    }
}
