// src/config.rs
// =============================================================================
// Run configuration: what to crawl, what to skip, and where to report.
//
// A config can come from a JSON file (--config) and individual fields can be
// overridden from the command line. Every field except `seeds` has a
// default, so the smallest useful file is:
//
//   { "seeds": ["https://example.com/"] }
//
// Secrets (Sheets access token, webhook URL) normally arrive through
// environment variables via clap rather than through the file.
// =============================================================================

use crate::crawl::UrlClassifier;
use crate::errors::ConfigError;
use crate::link::CrawlUrl;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How seed pages that do not answer with success are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Seeds are trusted entry points: a non-success answer is not recorded
    /// and whatever body came back is still parsed for links.
    #[default]
    Lenient,
    /// Seeds are handled like any other page.
    Strict,
}

/// Where broken-link rows are appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    #[serde(default = "default_sheet_range")]
    pub range: String,
    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
    /// OAuth access token; usually supplied through SHEETS_ACCESS_TOKEN.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

impl SheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            range: default_sheet_range(),
            api_base: default_sheets_api_base(),
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Crawl entry points, and the allow-list of pages that may be crawled
    /// and credited as the source of a broken link.
    pub seeds: Vec<String>,
    /// Domain used to tell internal links from external ones.
    /// Defaults to the host of the first seed.
    #[serde(default)]
    pub base_domain: Option<String>,
    /// Host substrings that are never verified.
    #[serde(default = "default_excluded_domains")]
    pub excluded_domains: Vec<String>,
    /// The crawl stops once this many broken links have been recorded.
    #[serde(default = "default_error_ceiling")]
    pub error_ceiling: usize,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Maximum number of external links probed at once for one page.
    #[serde(default = "default_probe_concurrency")]
    pub probe_concurrency: usize,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Depth 1 = only the seed pages are crawled.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Cap on the whole crawl; what was found so far is still reported.
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
    /// How many broken links are spelled out in the notification.
    #[serde(default = "default_max_listed")]
    pub max_listed: usize,
    #[serde(default)]
    pub sheets: Option<SheetsConfig>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Exit with a distinct code when neither sink nor notifier succeeded.
    #[serde(default)]
    pub fail_on_delivery_error: bool,
}

fn default_excluded_domains() -> Vec<String> {
    ["facebook.com", "twitter.com", "x.com", "instagram.com", "linkedin.com", "youtube.com"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn default_error_ceiling() -> usize {
    50
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_probe_concurrency() -> usize {
    8
}

fn default_max_redirects() -> usize {
    10
}

pub fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/115.0.0.0 Safari/537.36"
        .to_string()
}

fn default_max_listed() -> usize {
    20
}

fn default_sheet_range() -> String {
    "Sheet1!A:B".to_string()
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

impl CrawlConfig {
    /// A config with every default filled in.
    pub fn new(seeds: Vec<String>) -> Self {
        Self {
            seeds,
            base_domain: None,
            excluded_domains: default_excluded_domains(),
            error_ceiling: default_error_ceiling(),
            probe_timeout_secs: default_probe_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            probe_concurrency: default_probe_concurrency(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            seed_policy: SeedPolicy::default(),
            max_depth: None,
            run_timeout_secs: None,
            max_listed: default_max_listed(),
            sheets: None,
            webhook_url: None,
            fail_on_delivery_error: false,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seeds.is_empty() {
            return Err(ConfigError::Invalid("at least one seed URL is required".into()));
        }
        for seed in &self.seeds {
            let parsed = CrawlUrl::parse(seed)
                .map_err(|e| ConfigError::Invalid(format!("seed '{}' is not a URL: {}", seed, e)))?;
            if !parsed.is_web() {
                return Err(ConfigError::Invalid(format!("seed '{}' is not http(s)", seed)));
            }
        }
        if self.error_ceiling == 0 {
            return Err(ConfigError::Invalid("error_ceiling must be at least 1".into()));
        }
        if self.probe_concurrency == 0 {
            return Err(ConfigError::Invalid("probe_concurrency must be at least 1".into()));
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        let Some(base_domain) = self.base_domain() else {
            return Err(ConfigError::Invalid("could not determine a base domain".into()));
        };
        // Seeds are crawled, so each one has to be internal
        let classifier = UrlClassifier::new(base_domain.as_str(), &[], &[]);
        if let Some(seed) = self.seeds.iter().find(|s| !classifier.is_internal(s)) {
            return Err(ConfigError::Invalid(format!(
                "seed '{}' is outside the base domain '{}'",
                seed, base_domain
            )));
        }
        Ok(())
    }

    /// The configured base domain, or the host of the first seed.
    pub fn base_domain(&self) -> Option<String> {
        if let Some(domain) = &self.base_domain {
            return Some(domain.trim().trim_start_matches('.').to_lowercase());
        }
        let first = self.seeds.first()?;
        CrawlUrl::parse(first).ok()?.host().map(str::to_string)
    }

    /// Seeds in configuration order, normalized.
    pub fn seed_urls(&self) -> Vec<CrawlUrl> {
        self.seeds.iter().filter_map(|s| CrawlUrl::parse(s).ok()).collect()
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}
