// src/report/mod.rs
// =============================================================================
// This module hands broken-link records to a durable store.
//
// Submodules:
// - sheets: appends rows to a Google spreadsheet
// - console: prints a table or JSON to stdout (no spreadsheet configured)
//
// Sinks are append-only: records go out in discovery order, without dedup,
// and earlier rows are never touched.
// =============================================================================

mod console;
mod sheets;

pub use console::{truncate, ConsoleSink};
pub use sheets::SheetsSink;

use crate::crawl::BrokenLinkRecord;
use crate::errors::SinkError;
use async_trait::async_trait;

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &str;

    /// Appends one row per record, in order.
    async fn append(&self, records: &[BrokenLinkRecord]) -> Result<(), SinkError>;

    /// Where a person can look at the full report, if anywhere.
    fn detail_link(&self) -> Option<String> {
        None
    }
}
