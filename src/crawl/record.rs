// src/crawl/record.rs

use crate::checker::Cause;
use crate::link::CrawlUrl;
use serde::{Deserialize, Serialize};

/// One broken link, credited to the page that referenced it.
///
/// For a seed that is itself broken, `source_page` is the seed.
/// Fields are private: a record never changes after it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLinkRecord {
    source_page: CrawlUrl,
    broken_url: CrawlUrl,
    cause: Cause,
}

impl BrokenLinkRecord {
    pub fn new(source_page: CrawlUrl, broken_url: CrawlUrl, cause: Cause) -> Self {
        Self {
            source_page,
            broken_url,
            cause,
        }
    }

    pub fn source_page(&self) -> &CrawlUrl {
        &self.source_page
    }

    pub fn broken_url(&self) -> &CrawlUrl {
        &self.broken_url
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }
}
