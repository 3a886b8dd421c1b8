// src/checker/mod.rs
// =============================================================================
// This module contains the per-link logic.
//
// Submodules:
// - http: Decides whether a URL is alive (HEAD probe, GET fallback)
// - html: Extracts links from HTML pages
//
// This file (mod.rs) is the module root - it re-exports the public API so
// the rest of the crate can write `checker::StatusVerifier` instead of
// `checker::http::StatusVerifier`.
// =============================================================================

mod html;
mod http;

pub use html::extract_links;
pub use http::{
    verify_all, Cause, FetchedPage, Fetcher, HttpFetcher, LinkCheckResult, StatusVerifier, Verdict,
};
