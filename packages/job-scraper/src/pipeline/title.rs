//! Job title cleanup.
//!
//! StepStone renders some titles with inlined styled-component CSS, so the
//! text read from the title element can look like
//! `.res-1a2b3c{color:red}Embedded Software Engineer`. The CSS is stripped
//! and, when nothing usable is left, a title is recovered from the card text.

use lazy_static::lazy_static;
use regex::Regex;

use super::strategy::collapse_whitespace;

lazy_static! {
    static ref CSS_PREFIX: Regex = Regex::new(r"^[a-zA-Z0-9_-]+\{").unwrap();
    static ref MEDIA_RULE: Regex = Regex::new(r"@media[^{]*\{[^}]*\}").unwrap();
    static ref RULE_BODY: Regex = Regex::new(r"\{[^}]*\}").unwrap();
    static ref CLASS_TOKEN: Regex = Regex::new(r"(^|\s)\.[a-zA-Z_-][a-zA-Z0-9_-]*").unwrap();
    static ref RES_TOKEN: Regex = Regex::new(r"\bres-[a-zA-Z0-9_-]+").unwrap();
    static ref SLUG_LIKE: Regex = Regex::new(r"^[a-zA-Z0-9_-]*$").unwrap();

    /// Words that appear in almost every technical job title.
    static ref JOB_TITLE_WORDS: Regex = Regex::new(
        r"(?i)(Software\s+(Entwickler|Developer)|Developer|Engineer|Manager|Architect|Consultant|Analyst|Programmierer|Entwickler|Embedded|Aerospace|Hardware|Firmware|Bildverarbeitung|Angular|X\+\+|Dynamics)"
    )
    .unwrap();
}

/// Titles shorter than this are considered broken and trigger recovery.
const MIN_TITLE_CHARS: usize = 10;

/// Whether text carries leaked CSS.
pub fn looks_like_css(text: &str) -> bool {
    text.contains('{') || text.contains("res-") || CSS_PREFIX.is_match(text)
}

/// Remove CSS rules and class-name tokens, then normalize whitespace.
pub fn strip_css(text: &str) -> String {
    let without_media = MEDIA_RULE.replace_all(text, " ");
    let without_rules = RULE_BODY.replace_all(&without_media, " ");
    let without_classes = CLASS_TOKEN.replace_all(&without_rules, "$1");
    let without_res = RES_TOKEN.replace_all(&without_classes, " ");
    collapse_whitespace(&without_res.replace('}', " "))
}

fn is_slug_like(text: &str) -> bool {
    SLUG_LIKE.is_match(text)
}

/// Whether a cleaned title still needs to be replaced.
pub fn needs_recovery(title: &str) -> bool {
    title.contains('{') || title.chars().count() < MIN_TITLE_CHARS || is_slug_like(title)
}

/// Whether text reads like a job title.
pub fn mentions_job_title(text: &str) -> bool {
    JOB_TITLE_WORDS.is_match(text)
}

/// First line of the card text that reads like a job title.
pub fn recover_from_lines(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| line.chars().count() > 5 && !line.contains('{') && !line.contains("res-"))
        .find(|line| {
            mentions_job_title(line)
                && line.chars().count() > MIN_TITLE_CHARS
                && !is_slug_like(line)
        })
        .map(collapse_whitespace)
}

/// Resolve the final title of a listing card.
///
/// Only a title that carried leaked CSS is replaced: when nothing usable is
/// left after stripping, the first card line reading like a job title wins,
/// then `anchor_text` (the card's first link). `lines` is evaluated lazily.
/// A clean title is kept as is, however short.
pub fn resolve_title(
    raw: &str,
    lines: impl FnOnce() -> Vec<String>,
    anchor_text: Option<&str>,
) -> Option<String> {
    let raw = collapse_whitespace(raw);
    if !looks_like_css(&raw) {
        if !raw.is_empty() {
            return Some(raw);
        }
        return anchor_text
            .map(collapse_whitespace)
            .filter(|text| !text.is_empty() && !looks_like_css(text));
    }

    let title = strip_css(&raw);
    if needs_recovery(&title) {
        if let Some(recovered) = recover_from_lines(&lines()) {
            return Some(recovered);
        }
        let anchor = anchor_text.map(collapse_whitespace).filter(|text| {
            !text.is_empty() && !text.contains('{') && !is_slug_like(text)
        });
        if anchor.is_some() {
            return anchor;
        }
    }

    if title.is_empty() || title.contains('{') {
        None
    } else {
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_lines() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn test_strip_leading_css_rule() {
        let raw = ".res-1a2b3c{color:red}Embedded Software Engineer";
        assert!(looks_like_css(raw));
        assert_eq!(strip_css(raw), "Embedded Software Engineer");
        assert_eq!(
            resolve_title(raw, no_lines, None),
            Some("Embedded Software Engineer".to_string())
        );
    }

    #[test]
    fn test_strip_multiple_rules_and_media_queries() {
        let raw = ".res-a{box-sizing:border-box}.res-b{font-family:Arial}@media (min-width:600px){.res-c{display:none}} Firmware Entwickler (m/w/d)";
        assert_eq!(strip_css(raw), "Firmware Entwickler (m/w/d)");
    }

    #[test]
    fn test_plain_titles_untouched() {
        assert!(!looks_like_css("Senior Embedded Developer"));
        assert_eq!(
            resolve_title("  Senior   Embedded Developer ", no_lines, None),
            Some("Senior Embedded Developer".to_string())
        );
        // Dotted words inside a title are not class names
        assert_eq!(
            resolve_title("Node.js Backend Engineer", no_lines, None),
            Some("Node.js Backend Engineer".to_string())
        );
    }

    #[test]
    fn test_recovers_from_card_lines() {
        let lines = || {
            vec![
                "res-x9".to_string(),
                ".res-x9{color:red}".to_string(),
                "Acme GmbH".to_string(),
                "Hardware Engineer FPGA (m/w/d)".to_string(),
                "Software Developer".to_string(),
            ]
        };
        assert_eq!(
            resolve_title(".res-x9{color:red}", lines, None),
            Some("Hardware Engineer FPGA (m/w/d)".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_anchor_text() {
        assert_eq!(
            resolve_title("{}", no_lines, Some("Teamleitung Fertigung")),
            Some("Teamleitung Fertigung".to_string())
        );
    }

    #[test]
    fn test_short_title_kept_when_nothing_better() {
        assert_eq!(resolve_title("CTO", no_lines, None), Some("CTO".to_string()));
    }

    #[test]
    fn test_clean_titles_are_never_recovered() {
        let lines = || {
            vec![
                "Mechatroniker".to_string(),
                "Hardware Solutions GmbH".to_string(),
            ]
        };
        assert_eq!(
            resolve_title("Mechatroniker", lines, Some("Hardware Engineer Jobs")),
            Some("Mechatroniker".to_string())
        );
    }

    #[test]
    fn test_missing_title_uses_anchor_text() {
        assert_eq!(
            resolve_title("  ", no_lines, Some("Elektroniker")),
            Some("Elektroniker".to_string())
        );
    }

    #[test]
    fn test_unrecoverable_title() {
        assert_eq!(resolve_title("", no_lines, None), None);
        assert_eq!(resolve_title(".res-1{color:red}", no_lines, Some("res-1")), None);
    }

    #[test]
    fn test_recovery_skips_slug_like_lines() {
        let lines = vec![
            "embedded-engineer-jobs".to_string(),
            "Embedded Engineer".to_string(),
        ];
        assert_eq!(recover_from_lines(&lines), Some("Embedded Engineer".to_string()));
    }
}
