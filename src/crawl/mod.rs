// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling from the configured seed prefixes
// - Only allow-listed pages of the base domain are crawled
// - External links are verified, never crawled
// - An error budget stops the crawl once enough broken links are found
//
// Submodules:
// - classify: internal / excluded / allowed-source decisions
// - state: work queue, visited set, error budget
// - record: the broken-link record type
// - queue: the engine that ties it all together
// =============================================================================

mod classify;
mod queue;
mod record;
mod state;


pub use classify::UrlClassifier;
pub use queue::{CrawlEngine, CrawlPhase, CrawlStats, DeliveryReport};
pub use record::BrokenLinkRecord;
