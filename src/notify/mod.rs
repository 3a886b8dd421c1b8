// src/notify/mod.rs
// =============================================================================
// This module posts a short run summary to a chat channel.
//
// Submodules:
// - webhook: incoming-webhook notifier ({"text": "..."} payload)
//
// A failed notification is logged by the caller and never fails the run.
// =============================================================================

mod webhook;

pub use webhook::WebhookNotifier;

use crate::crawl::BrokenLinkRecord;
use crate::errors::NotifyError;
use async_trait::async_trait;
use std::fmt::Write;
use tracing::info;

/// Why the crawl stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    Exhausted,
    BudgetTripped,
    Interrupted,
}

/// What the notifier is told about a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub broken_count: usize,
    pub pages_visited: usize,
    pub halt: HaltReason,
    /// Where the full list can be viewed (e.g. the spreadsheet)
    pub detail_link: Option<String>,
    /// The first few records, spelled out in the message
    pub listed: Vec<BrokenLinkRecord>,
}

impl RunSummary {
    pub fn new(
        records: &[BrokenLinkRecord],
        pages_visited: usize,
        halt: HaltReason,
        detail_link: Option<String>,
        max_listed: usize,
    ) -> Self {
        Self {
            broken_count: records.len(),
            pages_visited,
            halt,
            detail_link,
            listed: records.iter().take(max_listed).cloned().collect(),
        }
    }

    /// Human-readable message body.
    pub fn message(&self) -> String {
        let mut msg = String::from("Broken link check results\n\n");
        let _ = writeln!(msg, "Pages crawled: {}", self.pages_visited);
        let _ = writeln!(msg, "Broken links found: {}", self.broken_count);

        match self.halt {
            HaltReason::Exhausted => {}
            HaltReason::BudgetTripped => {
                msg.push_str("Crawl stopped early: error budget reached.\n");
            }
            HaltReason::Interrupted => {
                msg.push_str("Crawl interrupted before finishing; results are partial.\n");
            }
        }

        if let Some(link) = &self.detail_link {
            let _ = writeln!(msg, "Details: {}", link);
        }

        if self.broken_count == 0 {
            msg.push_str("\nNo broken links found!\n");
            return msg;
        }

        msg.push('\n');
        for record in &self.listed {
            let _ = writeln!(msg, "{} [{}]", record.broken_url(), record.cause());
            let _ = writeln!(msg, "Found on: {}\n", record.source_page());
        }

        let unlisted = self.broken_count.saturating_sub(self.listed.len());
        if unlisted > 0 {
            let _ = writeln!(msg, "...and {} more", unlisted);
        }
        msg
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, summary: &RunSummary) -> Result<(), NotifyError>;
}

/// Used when no webhook is configured: the summary only goes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, summary: &RunSummary) -> Result<(), NotifyError> {
        info!(
            broken = summary.broken_count,
            pages = summary.pages_visited,
            "no webhook configured, summary not sent"
        );
        Ok(())
    }
}
