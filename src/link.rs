// src/link.rs
// =============================================================================
// The URL type the whole crawler passes around.
//
// A CrawlUrl is always absolute and never carries a fragment: "#section"
// never changes whether a page can be reached over the network, so two
// URLs that differ only by fragment are the same crawl target.
//
// Equality and hashing use the normalized text, which is what the visited
// set and the work queue rely on.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A normalized absolute URL with its fragment removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlUrl(Url);

impl CrawlUrl {
    /// Parses an absolute URL and strips its fragment.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self::from)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// True for http and https URLs, the only ones we can fetch.
    pub fn is_web(&self) -> bool {
        matches!(self.0.scheme(), "http" | "https")
    }
}

impl From<Url> for CrawlUrl {
    fn from(mut url: Url) -> Self {
        url.set_fragment(None);
        Self(url)
    }
}

impl fmt::Display for CrawlUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_is_stripped() {
        let url = CrawlUrl::parse("https://example.com/docs#install").unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs");
    }

    #[test]
    fn test_fragment_does_not_affect_identity() {
        let a = CrawlUrl::parse("https://example.com/a#one").unwrap();
        let b = CrawlUrl::parse("https://example.com/a#two").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_query_is_kept() {
        let url = CrawlUrl::parse("https://example.com/search?q=rust#top").unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?q=rust");
    }

    #[test]
    fn test_relative_input_is_rejected() {
        assert!(CrawlUrl::parse("/docs").is_err());
    }

    #[test]
    fn test_is_web() {
        assert!(CrawlUrl::parse("https://example.com").unwrap().is_web());
        assert!(!CrawlUrl::parse("mailto:a@example.com").unwrap().is_web());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let url = CrawlUrl::parse("https://example.com/a").unwrap();
        assert_eq!(serde_json::to_string(&url).unwrap(), "\"https://example.com/a\"");
    }
}
