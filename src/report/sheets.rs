// src/report/sheets.rs
// =============================================================================
// Google Sheets sink.
//
// Uses the `spreadsheets.values.append` endpoint:
//
//   POST {api_base}/v4/spreadsheets/{id}/values/{range}:append
//        ?valueInputOption=RAW&insertDataOption=INSERT_ROWS
//   Authorization: Bearer <access token>
//   { "values": [[brokenURL, sourcePage], ...] }
//
// All rows go out in one request so they land contiguously and in order.
// Getting the access token (service account, OAuth) is somebody else's job;
// we only receive it.
// =============================================================================

use super::ReportSink;
use crate::config::SheetsConfig;
use crate::crawl::BrokenLinkRecord;
use crate::errors::SinkError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;
use url::Url;

pub struct SheetsSink {
    client: Client,
    config: SheetsConfig,
}

impl SheetsSink {
    pub fn new(client: Client, config: SheetsConfig) -> Self {
        Self { client, config }
    }

    fn append_url(&self) -> Result<Url, SinkError> {
        let base = self.config.api_base.trim_end_matches('/');
        let mut url = Url::parse(base)
            .map_err(|e| SinkError::InvalidEndpoint(format!("'{}': {}", base, e)))?;

        // path_segments_mut percent-encodes the range ("Sheet1!A:B")
        url.path_segments_mut()
            .map_err(|_| SinkError::InvalidEndpoint(format!("'{}' cannot take a path", base)))?
            .pop_if_empty()
            .extend(&["v4", "spreadsheets", self.config.spreadsheet_id.as_str(), "values"])
            .push(&format!("{}:append", self.config.range));

        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

fn rows(records: &[BrokenLinkRecord]) -> Vec<[&str; 2]> {
    records
        .iter()
        .map(|r| [r.broken_url().as_str(), r.source_page().as_str()])
        .collect()
}

#[async_trait]
impl ReportSink for SheetsSink {
    fn name(&self) -> &str {
        "sheets"
    }

    async fn append(&self, records: &[BrokenLinkRecord]) -> Result<(), SinkError> {
        if records.is_empty() {
            debug!("no records, nothing to append");
            return Ok(());
        }

        let mut request = self
            .client
            .post(self.append_url()?)
            .json(&json!({ "values": rows(records) }));
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    fn detail_link(&self) -> Option<String> {
        Some(format!(
            "https://docs.google.com/spreadsheets/d/{}",
            self.config.spreadsheet_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Cause;
    use crate::link::CrawlUrl;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(source: &str, broken: &str) -> BrokenLinkRecord {
        BrokenLinkRecord::new(
            CrawlUrl::parse(source).unwrap(),
            CrawlUrl::parse(broken).unwrap(),
            Cause::HttpStatus(404),
        )
    }

    fn sink(server: &MockServer) -> SheetsSink {
        let mut config = SheetsConfig::new("sheet-123");
        config.api_base = server.uri();
        config.access_token = Some("token-abc".into());
        SheetsSink::new(Client::new(), config)
    }

    #[tokio::test]
    async fn test_rows_are_appended_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/sheet-123/values/Sheet1!A:B:append"))
            .and(query_param("valueInputOption", "RAW"))
            .and(header("authorization", "Bearer token-abc"))
            .and(body_json(json!({
                "values": [
                    ["https://gone.test/a", "https://example.com/blog/"],
                    ["https://gone.test/b", "https://example.com/blog/post"],
                ]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let records = vec![
            record("https://example.com/blog/", "https://gone.test/a"),
            record("https://example.com/blog/post", "https://gone.test/b"),
        ];
        sink(&server).append(&records).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_records_means_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        sink(&server).append(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejection_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
            .mount(&server)
            .await;

        let records = vec![record("https://example.com/", "https://gone.test/")];
        match sink(&server).append(&records).await {
            Err(SinkError::Rejected { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "permission denied");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_detail_link_points_at_spreadsheet() {
        let sink = SheetsSink::new(Client::new(), SheetsConfig::new("sheet-123"));
        assert_eq!(
            sink.detail_link().as_deref(),
            Some("https://docs.google.com/spreadsheets/d/sheet-123")
        );
    }
}
