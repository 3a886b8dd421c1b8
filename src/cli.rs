// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl: audit a site from its seed prefixes and report broken links
// - check: verify a handful of URLs right now and print the verdicts
//
// Secrets can come from the environment (`env = "..."`), so they never have
// to appear in a scheduler's command line.
//
// Rust concepts:
// - Derive macros: clap generates the parser from these types
// - Option<T>: flags the user didn't pass stay None and leave the config
//   file value alone
// =============================================================================

use crate::config::{CrawlConfig, SeedPolicy, SheetsConfig};
use crate::errors::ConfigError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "link-auditor",
    version,
    about = "Crawl a website and report its broken links",
    long_about = "link-auditor crawls a website from a set of seed prefixes, verifies every \
                  internal and outbound link, and reports the broken ones to a spreadsheet \
                  and a chat webhook."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a site and report broken links
    ///
    /// Example: link-auditor crawl --seed https://example.com/blog/ --error-ceiling 20
    Crawl(CrawlArgs),

    /// Check a list of URLs once
    ///
    /// Example: link-auditor check https://example.com/a https://example.com/b
    Check {
        /// URLs to verify
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// How many URLs are checked at the same time
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Probe timeout in seconds (full fetches get twice as long)
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed URL prefix (repeatable). Replaces the seeds from the config file
    #[arg(long = "seed")]
    pub seeds: Vec<String>,

    /// Domain treated as internal (default: host of the first seed)
    #[arg(long)]
    pub base_domain: Option<String>,

    /// Extra host substring never verified (repeatable)
    #[arg(long = "exclude")]
    pub excluded_domains: Vec<String>,

    /// Stop crawling after this many broken links
    #[arg(long)]
    pub error_ceiling: Option<usize>,

    /// Maximum crawl depth (1 = seed pages only)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Give up crawling after this many seconds and report what was found
    #[arg(long)]
    pub run_timeout: Option<u64>,

    /// Google spreadsheet to append broken links to
    #[arg(long)]
    pub spreadsheet_id: Option<String>,

    /// OAuth access token for the Sheets API
    #[arg(long, env = "SHEETS_ACCESS_TOKEN", hide_env_values = true)]
    pub sheets_token: Option<String>,

    /// Chat webhook that receives the run summary
    #[arg(long, env = "TEAMS_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// Print records as JSON when no spreadsheet is configured
    #[arg(long)]
    pub json: bool,

    /// Treat seed pages like any other page (record and skip them on 404)
    #[arg(long)]
    pub strict_seeds: bool,

    /// Exit with code 3 when neither the sink nor the notifier succeeded
    #[arg(long)]
    pub fail_on_delivery_error: bool,
}

impl CrawlArgs {
    /// Builds the run configuration: config file first, then flags.
    pub fn into_config(self) -> Result<CrawlConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_file(path)?,
            None => CrawlConfig::new(Vec::new()),
        };

        if !self.seeds.is_empty() {
            config.seeds = self.seeds;
        }
        if self.base_domain.is_some() {
            config.base_domain = self.base_domain;
        }
        config.excluded_domains.extend(self.excluded_domains);
        if let Some(ceiling) = self.error_ceiling {
            config.error_ceiling = ceiling;
        }
        if self.max_depth.is_some() {
            config.max_depth = self.max_depth;
        }
        if self.run_timeout.is_some() {
            config.run_timeout_secs = self.run_timeout;
        }
        if let Some(id) = self.spreadsheet_id {
            match config.sheets.as_mut() {
                Some(sheets) => sheets.spreadsheet_id = id,
                None => config.sheets = Some(SheetsConfig::new(id)),
            }
        }
        if let (Some(sheets), Some(token)) = (config.sheets.as_mut(), self.sheets_token) {
            sheets.access_token = Some(token);
        }
        if self.webhook_url.is_some() {
            config.webhook_url = self.webhook_url;
        }
        if self.strict_seeds {
            config.seed_policy = SeedPolicy::Strict;
        }
        if self.fail_on_delivery_error {
            config.fail_on_delivery_error = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawl_args(argv: &[&str]) -> CrawlArgs {
        let mut full = vec!["link-auditor", "crawl"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Crawl(args) => args,
            other => panic!("expected crawl, got {:?}", other),
        }
    }

    #[test]
    fn test_flags_build_a_config() {
        let config = crawl_args(&[
            "--seed",
            "https://example.com/blog/",
            "--seed",
            "https://example.com/docs/",
            "--exclude",
            "tiktok.com",
            "--error-ceiling",
            "3",
            "--spreadsheet-id",
            "abc",
            "--sheets-token",
            "tok",
            "--strict-seeds",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.seeds.len(), 2);
        assert_eq!(config.error_ceiling, 3);
        assert!(config.excluded_domains.contains(&"tiktok.com".to_string()));
        assert!(config.excluded_domains.contains(&"facebook.com".to_string()));
        assert_eq!(config.seed_policy, SeedPolicy::Strict);
        let sheets = config.sheets.unwrap();
        assert_eq!(sheets.spreadsheet_id, "abc");
        assert_eq!(sheets.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_crawl_without_seeds_is_invalid() {
        let result = crawl_args(&[]).into_config();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_check_requires_urls() {
        assert!(Cli::try_parse_from(["link-auditor", "check"]).is_err());
    }

    #[test]
    fn test_check_parses_urls_and_json() {
        let cli = Cli::try_parse_from(["link-auditor", "check", "https://a.test", "--json"]).unwrap();
        match cli.command {
            Commands::Check { urls, json, .. } => {
                assert_eq!(urls, vec!["https://a.test"]);
                assert!(json);
            }
            other => panic!("expected check, got {:?}", other),
        }
    }
}
