// src/report/console.rs
// =============================================================================
// Prints broken-link records to stdout, either as a human-readable table or
// as JSON (--json). Used when no spreadsheet is configured, and handy in CI
// logs.
//
// Logs go to stderr, so `--json` output on stdout stays machine-readable.
// =============================================================================

use super::ReportSink;
use crate::crawl::BrokenLinkRecord;
use crate::errors::SinkError;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    json: bool,
}

impl ConsoleSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Renders the records the way `append` prints them.
    pub fn render(&self, records: &[BrokenLinkRecord]) -> Result<String, SinkError> {
        if self.json {
            return Ok(serde_json::to_string_pretty(records)?);
        }
        Ok(render_table(records))
    }
}

#[async_trait]
impl ReportSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn append(&self, records: &[BrokenLinkRecord]) -> Result<(), SinkError> {
        println!("{}", self.render(records)?);
        Ok(())
    }
}

fn render_table(records: &[BrokenLinkRecord]) -> String {
    if records.is_empty() {
        return "✅ No broken links found".to_string();
    }

    let mut out = format!("{:<50} {:<50} {:<30}\n", "BROKEN URL", "FOUND ON", "CAUSE");
    out.push_str(&"=".repeat(130));
    out.push('\n');

    for record in records {
        out.push_str(&format!(
            "{:<50} {:<50} {:<30}\n",
            truncate(record.broken_url().as_str(), 50),
            truncate(record.source_page().as_str(), 50),
            record.cause().to_string(),
        ));
    }

    out.push_str(&format!("\n❌ Broken: {}", records.len()));
    out
}

/// Shortens `text` to at most `width` characters, ending in "..." if cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Cause;
    use crate::link::CrawlUrl;

    fn records() -> Vec<BrokenLinkRecord> {
        vec![BrokenLinkRecord::new(
            CrawlUrl::parse("https://example.com/blog/").unwrap(),
            CrawlUrl::parse("https://gone.test/page").unwrap(),
            Cause::HttpStatus(404),
        )]
    }

    #[test]
    fn test_table_lists_each_record() {
        let table = ConsoleSink::new(false).render(&records()).unwrap();
        assert!(table.contains("https://gone.test/page"));
        assert!(table.contains("https://example.com/blog/"));
        assert!(table.contains("HTTP 404"));
        assert!(table.contains("Broken: 1"));
    }

    #[test]
    fn test_json_output_is_an_array_of_records() {
        let json = ConsoleSink::new(true).render(&records()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["broken_url"], "https://gone.test/page");
        assert_eq!(value[0]["source_page"], "https://example.com/blog/");
        assert_eq!(value[0]["cause"]["kind"], "http_status");
        assert_eq!(value[0]["cause"]["detail"], 404);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("https://example.com/very/long", 10), "https:/...");
    }
}
