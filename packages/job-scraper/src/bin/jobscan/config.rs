use anyhow::{Context, Result};
use dotenvy::dotenv;
use job_scraper::{FetchConfig, ScanConfig};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Roles scanned when none are given on the command line
    pub roles: Vec<String>,
    pub fetch: FetchConfig,
    pub scan: ScanConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = FetchConfig::default();
        let delay_min = env_parse::<u64>("SCAN_PAGE_DELAY_MIN_SECS")?
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_millis(defaults.page_delay_min_ms));
        let delay_max = env_parse::<u64>("SCAN_PAGE_DELAY_MAX_SECS")?
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_millis(defaults.page_delay_max_ms));
        let fetch = defaults.with_page_delay(delay_min, delay_max);
        fetch
            .validate()
            .context("Invalid page delay settings")?;

        let mut scan = ScanConfig::default();
        if let Some(max_pages) = env_parse("SCAN_MAX_PAGES")? {
            scan = scan.with_max_pages(max_pages);
        }
        if let Some(batch_size) = env_parse("SCAN_BATCH_SIZE")? {
            scan = scan.with_batch_size(batch_size);
        }
        if let Some(score) = env_parse("SCAN_MIN_RELEVANCE")? {
            scan = scan.with_min_relevance_score(score);
        }
        if let Some(drop_filtered) = env_parse("SCAN_DROP_FILTERED")? {
            scan = scan.with_drop_filtered(drop_filtered);
        }
        scan.validate().context("Invalid scan settings")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://jobs.db?mode=rwc".to_string()),
            roles: env::var("SCAN_ROLES")
                .map(|roles| parse_roles(&roles))
                .unwrap_or_default(),
            fetch,
            scan,
        })
    }
}

/// Split a comma-separated role list, dropping blanks.
pub fn parse_roles(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(String::from)
        .collect()
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a valid value, got {:?}", key, value)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!(
            parse_roles(" Embedded Engineer, ,C++ Developer,"),
            vec!["Embedded Engineer", "C++ Developer"]
        );
        assert!(parse_roles("").is_empty());
    }
}
