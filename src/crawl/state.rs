// src/crawl/state.rs
// =============================================================================
// Per-run crawl state: the work queue, the visited set and the error budget.
//
// The queue and visited set are wrapped together in `Frontier` so that the
// queue can refuse anything already visited or already waiting. Nothing
// here is shared between tasks; the engine owns one of each per run.
//
// Rust concepts:
// - VecDeque: FIFO queue for breadth-first crawling
// - HashSet: O(1) membership for visited / queued URLs
// =============================================================================

use crate::link::CrawlUrl;
use std::collections::{HashSet, VecDeque};

// Represents a page in the crawl queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlItem {
    pub url: CrawlUrl,
    /// The page that linked here; `None` for seeds
    pub referrer: Option<CrawlUrl>,
    /// Seeds are depth 1
    pub depth: usize,
}

impl CrawlItem {
    pub fn seed(url: CrawlUrl) -> Self {
        Self {
            url,
            referrer: None,
            depth: 1,
        }
    }

    pub fn is_seed(&self) -> bool {
        self.referrer.is_none()
    }

    /// The page a finding about this item is credited to.
    pub fn source(&self) -> &CrawlUrl {
        self.referrer.as_ref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlItem>,
    queued: HashSet<CrawlUrl>,
    visited: HashSet<CrawlUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item unless its URL was already visited or is waiting.
    /// Returns whether it was added.
    pub fn push(&mut self, item: CrawlItem) -> bool {
        if self.visited.contains(&item.url) || self.queued.contains(&item.url) {
            return false;
        }
        self.queued.insert(item.url.clone());
        self.queue.push_back(item);
        true
    }

    /// Takes the next item and marks it visited. Items whose URL was visited
    /// in the meantime are skipped.
    pub fn pop(&mut self) -> Option<CrawlItem> {
        while let Some(item) = self.queue.pop_front() {
            self.queued.remove(&item.url);
            if self.visited.insert(item.url.clone()) {
                return Some(item);
            }
        }
        None
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Drops everything still waiting.
    pub fn clear_pending(&mut self) {
        self.queue.clear();
        self.queued.clear();
    }
}

/// Counts findings against a fixed ceiling.
#[derive(Debug, Clone, Copy)]
pub struct ErrorBudget {
    spent: usize,
    ceiling: usize,
}

impl ErrorBudget {
    pub fn new(ceiling: usize) -> Self {
        Self { spent: 0, ceiling }
    }

    /// Counts one finding. Refuses once the ceiling is reached so the count
    /// can never pass it.
    pub fn spend(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.spent += 1;
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.spent >= self.ceiling
    }

    pub fn spent(&self) -> usize {
        self.spent
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}
