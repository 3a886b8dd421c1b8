// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests first (lightweight, no body download)
// - Falls back to GET when a server refuses HEAD with 403 or 405
// - Only a 404 counts as broken; network failures are "indeterminate" and
//   still reported, because a link we can't verify is worth a look
// - Runs batches of checks concurrently with a bound
//
// The network itself sits behind the `Fetcher` trait so the crawler can be
// driven by an in-memory fetcher in tests.
//
// Rust concepts:
// - async traits: `#[async_trait]` makes `dyn Fetcher` possible
// - Enums: To represent the three possible verdicts
// - Streams: For processing many checks concurrently
// =============================================================================

use crate::errors::FetchError;
use crate::link::CrawlUrl;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A page fetched with GET.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    /// Where we ended up after redirects; relative links resolve against it.
    pub final_url: Url,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The two kinds of request the auditor makes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Lightweight existence check (HEAD, redirects followed). Returns the
    /// final status code.
    async fn probe(&self, url: &Url) -> Result<u16, FetchError>;

    /// Full GET including the body.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// `Fetcher` backed by one shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    probe_timeout: Duration,
    fetch_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(
        user_agent: &str,
        max_redirects: usize,
        probe_timeout: Duration,
        fetch_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        // One client for the whole run (connection pooling); timeouts are
        // set per request because probes and fetches use different ones
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .build()?;

        Ok(Self {
            client,
            probe_timeout,
            fetch_timeout,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn probe(&self, url: &Url) -> Result<u16, FetchError> {
        let response = self
            .client
            .head(url.clone())
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        Ok(response.status().as_u16())
    }

    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| FetchError::from_reqwest(&e))?;

        Ok(FetchedPage {
            status,
            final_url,
            body,
        })
    }
}

/// What a link check concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// Anything that isn't a definitive not-found
    Healthy,
    /// Definitive not-found
    Broken { code: u16 },
    /// We never got an answer (timeout, DNS, refused, ...)
    Indeterminate { error: String },
}

impl Verdict {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Verdict::Healthy)
    }

    /// The reportable cause, if this verdict is a finding.
    pub fn cause(&self) -> Option<Cause> {
        match self {
            Verdict::Healthy => None,
            Verdict::Broken { code } => Some(Cause::HttpStatus(*code)),
            Verdict::Indeterminate { error } => Some(Cause::NetworkError(error.clone())),
        }
    }
}

/// Why a link was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Cause {
    HttpStatus(u16),
    NetworkError(String),
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::HttpStatus(code) => write!(f, "HTTP {}", code),
            Cause::NetworkError(error) => write!(f, "Error: {}", error),
        }
    }
}

// Status codes from servers that reject HEAD but answer GET properly
fn needs_full_fetch(status: u16) -> bool {
    status == StatusCode::FORBIDDEN.as_u16() || status == StatusCode::METHOD_NOT_ALLOWED.as_u16()
}

fn is_not_found(status: u16) -> bool {
    status == StatusCode::NOT_FOUND.as_u16()
}

/// Decides whether a single URL is alive.
#[derive(Clone)]
pub struct StatusVerifier {
    fetcher: Arc<dyn Fetcher>,
}

impl StatusVerifier {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// HEAD first; on 403/405 repeat with GET and only trust its 404.
    pub async fn check(&self, url: &CrawlUrl) -> Verdict {
        let status = match self.fetcher.probe(url.as_url()).await {
            Ok(status) => status,
            Err(e) => return Verdict::Indeterminate { error: e.to_string() },
        };

        if is_not_found(status) {
            return Verdict::Broken { code: status };
        }

        if needs_full_fetch(status) {
            debug!(url = %url, status, "probe refused, retrying with GET");
            return match self.fetcher.fetch(url.as_url()).await {
                Ok(page) if is_not_found(page.status) => Verdict::Broken { code: page.status },
                Ok(_) => Verdict::Healthy,
                Err(e) => Verdict::Indeterminate { error: e.to_string() },
            };
        }

        Verdict::Healthy
    }
}

// Represents the result of checking a single link (used by `check`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCheckResult {
    /// The URL that was checked
    pub url: String,
    /// The verdict, flattened into the same JSON object
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl LinkCheckResult {
    pub fn is_ok(&self) -> bool {
        self.verdict.is_healthy()
    }
}

// Checks multiple links concurrently
//
// Up to `concurrency` checks run at once; results come back in input order
// (`buffered`, not `buffer_unordered`) so the report reads like the input.
pub async fn verify_all(
    verifier: &StatusVerifier,
    urls: Vec<CrawlUrl>,
    concurrency: usize,
) -> Vec<LinkCheckResult> {
    let checks = urls.into_iter().map(|url| {
        let verifier = verifier.clone();
        async move {
            let verdict = verifier.check(&url).await;
            LinkCheckResult {
                url: url.to_string(),
                verdict,
            }
        }
    });

    stream::iter(checks)
        .buffered(concurrency.max(1))
        .collect()
        .await
}
