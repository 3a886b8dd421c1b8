// src/checker/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, which recovers from broken markup the same way
//   browsers do, so a malformed page still yields whatever links it has
//
// We also use the `url` crate to resolve relative links against the page
// URL. Fragments are dropped on the way (see CrawlUrl).
//
// Rust concepts:
// - impl Trait in return position: callers get "some iterator" without
//   naming its type
// - move closures: the iterator owns everything it needs
// =============================================================================

use crate::link::CrawlUrl;
use scraper::{Html, Selector};
use url::Url;

// Anchor-style elements whose href points at another resource
const ANCHOR_SELECTOR: &str = "a[href], area[href]";

// Extracts all links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   base: the URL the page was served from (for resolving relative links)
//
// Returns: an iterator of absolute http(s) URLs, in document order,
// duplicates included. The document is parsed up front; each href is
// resolved only when the iterator reaches it.
//
// Example:
//   html = "<a href='/docs#intro'>Docs</a>"
//   base = "https://example.com/page"
//   result = ["https://example.com/docs"]
pub fn extract_links(html: &str, base: &Url) -> impl Iterator<Item = CrawlUrl> {
    let hrefs = collect_hrefs(html);
    let base = base.clone();

    hrefs
        .into_iter()
        .filter_map(move |href| resolve_url(&base, &href))
        .filter(CrawlUrl::is_web)
}

// Pulls every href attribute value out of the document
fn collect_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse(ANCHOR_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

// Resolves a possibly-relative URL to an absolute URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "../other" -> Some("https://example.com/other")
//   href = "https://other.com#top" -> Some("https://other.com/")
//   href = "http://[bad" -> None
fn resolve_url(base: &Url, href: &str) -> Option<CrawlUrl> {
    // Url::join handles absolute hrefs too: they simply replace the base
    base.join(href).ok().map(CrawlUrl::from)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why collect the hrefs into a Vec first?
//    - `Html` borrows nothing, but `document.select()` borrows the document
//    - An iterator that borrows a local variable can't be returned
//    - Collecting the href strings ends the borrow; the returned iterator
//      then owns the Vec and the base URL
//
// 2. What does `let ... else` do?
//    - It's pattern matching with an early exit
//    - If Selector::parse fails we return an empty list instead of panicking
//
// 3. Why does a page with only "#section" links yield the page itself?
//    - "#section" resolved against the page is the page URL plus a fragment
//    - Stripping the fragment leaves the page URL; the crawler already has
//      it in the visited set so it costs nothing
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn links(html: &str, base: &str) -> Vec<String> {
        let base = Url::parse(base).unwrap();
        extract_links(html, &base).map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        assert_eq!(links(html, "https://example.com"), vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        assert_eq!(links(html, "https://example.com/page"), vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_fragment_is_removed() {
        let html = r#"<a href="/docs#install">Docs</a>"#;
        assert_eq!(links(html, "https://example.com/"), vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_skip_mailto_and_javascript() {
        let html = r#"
            <a href="mailto:test@example.com">Email</a>
            <a href="javascript:void(0)">Menu</a>
            <a href="tel:+100">Call</a>
        "#;
        assert!(links(html, "https://example.com").is_empty());
    }

    #[test]
    fn test_document_order_and_duplicates_kept() {
        let html = r#"
            <a href="https://rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <a href="/docs">Docs again</a>
        "#;
        assert_eq!(
            links(html, "https://example.com/page/"),
            vec![
                "https://rust-lang.org/",
                "https://example.com/docs",
                "https://example.com/about",
                "https://example.com/docs",
            ]
        );
    }

    #[test]
    fn test_area_elements_are_links() {
        let html = r#"<map><area href="/region" alt="r"></map>"#;
        assert_eq!(links(html, "https://example.com/"), vec!["https://example.com/region"]);
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        let html = r#"<div><a href="/one">one<p><a href="/two">two</div></span>"#;
        assert_eq!(
            links(html, "https://example.com/"),
            vec!["https://example.com/one", "https://example.com/two"]
        );
    }

    #[test]
    fn test_non_html_input_yields_nothing() {
        assert!(links("%PDF-1.7 \u{0}\u{1} binary", "https://example.com/").is_empty());
    }

    #[test]
    fn test_anchor_without_href_is_ignored() {
        let html = r#"<a name="top">Top</a><a href="">Empty</a>"#;
        assert!(links(html, "https://example.com/").is_empty());
    }
}
