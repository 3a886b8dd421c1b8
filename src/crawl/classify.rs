// src/crawl/classify.rs
// =============================================================================
// Pure URL classification: internal vs external, excluded domains, and the
// allow-list of crawlable source pages.
//
// None of these functions touch the network or any state, and none of them
// fail. Input that cannot be understood is treated as external, which means
// "don't crawl it".
// =============================================================================

use crate::link::CrawlUrl;
use url::Url;

#[derive(Debug, Clone)]
pub struct UrlClassifier {
    base_domain: String,
    excluded_domains: Vec<String>,
    allowed_prefixes: Vec<String>,
}

impl UrlClassifier {
    pub fn new(
        base_domain: impl Into<String>,
        excluded_domains: &[String],
        allowed_prefixes: &[String],
    ) -> Self {
        Self {
            base_domain: base_domain.into().to_lowercase(),
            excluded_domains: excluded_domains
                .iter()
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            // Compare prefixes in the same normalized form as crawled URLs
            // ("https://Example.com" becomes "https://example.com/").
            allowed_prefixes: allowed_prefixes
                .iter()
                .map(|p| match CrawlUrl::parse(p) {
                    Ok(url) => url.as_str().to_string(),
                    Err(_) => p.clone(),
                })
                .collect(),
        }
    }

    /// True when the URL is relative or its host is the base domain or one
    /// of its subdomains.
    pub fn is_internal(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => self.host_is_internal(host),
                // mailto:, data: and friends: nothing to crawl
                None => false,
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => true,
            Err(_) => false,
        }
    }

    /// True when the URL's host contains one of the excluded domains.
    pub fn is_excluded_domain(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_lowercase();
        self.excluded_domains.iter().any(|d| host.contains(d.as_str()))
    }

    /// True when the URL starts with one of the allow-listed prefixes.
    pub fn is_allowed_source(&self, url: &str) -> bool {
        self.allowed_prefixes.iter().any(|p| url.starts_with(p.as_str()))
    }

    fn host_is_internal(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        host == self.base_domain
            || host
                .strip_suffix(self.base_domain.as_str())
                .is_some_and(|rest| rest.ends_with('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> UrlClassifier {
        UrlClassifier::new(
            "example.com",
            &["facebook.com".to_string(), "twitter.com".to_string()],
            &["https://example.com/blog/".to_string(), "https://Example.com/docs".to_string()],
        )
    }

    #[test]
    fn test_same_domain_is_internal() {
        let c = classifier();
        assert!(c.is_internal("https://example.com/about"));
        assert!(c.is_internal("http://EXAMPLE.com/"));
    }

    #[test]
    fn test_subdomain_is_internal() {
        assert!(classifier().is_internal("https://shop.example.com/cart"));
    }

    #[test]
    fn test_lookalike_domain_is_external() {
        assert!(!classifier().is_internal("https://evil-example.com/"));
        assert!(!classifier().is_internal("https://example.com.attacker.net/"));
    }

    #[test]
    fn test_relative_reference_is_internal() {
        assert!(classifier().is_internal("/docs/intro"));
        assert!(classifier().is_internal("page.html"));
    }

    #[test]
    fn test_malformed_url_is_external() {
        assert!(!classifier().is_internal("http://"));
        assert!(!classifier().is_internal("https://[::1"));
    }

    #[test]
    fn test_hostless_scheme_is_external() {
        assert!(!classifier().is_internal("mailto:team@example.com"));
    }

    #[test]
    fn test_excluded_domain_matches_substring_of_host() {
        let c = classifier();
        assert!(c.is_excluded_domain("https://www.facebook.com/example"));
        assert!(c.is_excluded_domain("https://mobile.twitter.com/example"));
        assert!(!c.is_excluded_domain("https://github.com/example"));
    }

    #[test]
    fn test_excluded_domain_ignores_path() {
        assert!(!classifier().is_excluded_domain("https://github.com/facebook.com"));
    }

    #[test]
    fn test_allowed_source_uses_prefixes() {
        let c = classifier();
        assert!(c.is_allowed_source("https://example.com/blog/"));
        assert!(c.is_allowed_source("https://example.com/blog/post-1"));
        assert!(c.is_allowed_source("https://example.com/docs/setup"));
        assert!(!c.is_allowed_source("https://example.com/shop/"));
        assert!(!c.is_allowed_source("https://other.com/blog/"));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = classifier();
        let urls = ["https://example.com/blog/a", "https://facebook.com/", "bad url", "/x"];
        for url in urls {
            assert_eq!(c.is_internal(url), c.is_internal(url));
            assert_eq!(c.is_excluded_domain(url), c.is_excluded_domain(url));
            assert_eq!(c.is_allowed_source(url), c.is_allowed_source(url));
        }
    }
}
