//! Company names recovered from company-profile links.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::portal::Portal;

lazy_static! {
    static ref STEPSTONE_PROFILE: Regex = Regex::new(r"/cmp/[a-z]{2}/([^/?#]+)").unwrap();
    static ref GLASSDOOR_PROFILE: Regex = Regex::new(r"/Overview/Working-at-(.+?)-EI_").unwrap();
}

/// Derive a display name from a company-profile URL, if it is one.
///
/// `https://www.stepstone.de/cmp/de/siegenia-gruppe-250330/jobs` yields
/// `Siegenia Gruppe`.
pub fn company_from_profile_url(portal: Portal, url: &str) -> Option<String> {
    let pattern: &Regex = match portal {
        Portal::StepStone => &STEPSTONE_PROFILE,
        Portal::Glassdoor => &GLASSDOOR_PROFILE,
    };
    let segment = pattern.captures(url)?.get(1)?.as_str();
    let name = normalize_company_slug(segment);
    (!name.is_empty()).then_some(name)
}

/// Turn a URL slug into a company name.
pub fn normalize_company_slug(segment: &str) -> String {
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let spaced = decoded.replace(['-', '_', '+'], " ");

    let mut words: Vec<&str> = spaced.split_whitespace().collect();
    while words.len() > 1 {
        let last = words[words.len() - 1];
        let is_id = last.chars().all(|c| c.is_ascii_digit());
        if is_id || last.eq_ignore_ascii_case("jobs") {
            words.pop();
        } else {
            break;
        }
    }

    let mut name = words
        .iter()
        .map(|word| normalize_word(word))
        .collect::<Vec<_>>()
        .join(" ");

    if name.contains("GmbH Co. KG") {
        name = name.replace("GmbH Co. KG", "GmbH & Co. KG");
    }
    name
}

fn normalize_word(word: &str) -> String {
    match word.to_lowercase().as_str() {
        "gmbh" => "GmbH".to_string(),
        "ag" => "AG".to_string(),
        "kg" => "KG".to_string(),
        "se" => "SE".to_string(),
        "co" | "co." => "Co.".to_string(),
        _ => capitalize(word),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepstone_profile_url() {
        assert_eq!(
            company_from_profile_url(
                Portal::StepStone,
                "https://www.stepstone.de/cmp/de/siegenia-gruppe-250330/jobs"
            ),
            Some("Siegenia Gruppe".to_string())
        );
        assert_eq!(
            company_from_profile_url(Portal::StepStone, "/cmp/de/acme-gmbh-co-kg-12345"),
            Some("Acme GmbH & Co. KG".to_string())
        );
    }

    #[test]
    fn test_glassdoor_profile_url() {
        assert_eq!(
            company_from_profile_url(
                Portal::Glassdoor,
                "https://www.glassdoor.de/Overview/Working-at-Robert-Bosch-EI_IE10131.11,23.htm"
            ),
            Some("Robert Bosch".to_string())
        );
    }

    #[test]
    fn test_non_profile_urls() {
        assert_eq!(
            company_from_profile_url(Portal::StepStone, "https://www.stepstone.de/stellenangebote--x-1.html"),
            None
        );
        assert_eq!(company_from_profile_url(Portal::StepStone, "/cmp/de/12345"), Some("12345".to_string()));
    }

    #[test]
    fn test_legal_forms_and_encoding() {
        assert_eq!(normalize_company_slug("siemens-ag"), "Siemens AG");
        assert_eq!(normalize_company_slug("m%C3%BCller-gmbh"), "Müller GmbH");
        assert_eq!(normalize_company_slug("infineon-technologies-ag-jobs"), "Infineon Technologies AG");
    }
}
