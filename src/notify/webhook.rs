// src/notify/webhook.rs
// =============================================================================
// Chat notifier for incoming webhooks (Teams, Slack and friends all accept
// a JSON object with a "text" field).
//
// 200 and 204 mean delivered; any other status is reported as a failure
// together with the response body, which is where these services explain
// what went wrong.
// =============================================================================

use super::{Notifier, RunSummary};
use crate::errors::NotifyError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;

pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, summary: &RunSummary) -> Result<(), NotifyError> {
        let payload = json!({ "text": summary.message() });

        let response = self.client.post(&self.webhook_url).json(&payload).send().await?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::HaltReason;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summary() -> RunSummary {
        RunSummary::new(&[], 4, HaltReason::Exhausted, None, 20)
    }

    #[tokio::test]
    async fn test_no_content_is_delivered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_string_contains("Pages crawled: 4"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(Client::new(), format!("{}/hook", server.uri()));
        assert!(notifier.notify(&summary()).await.is_ok());
    }

    #[tokio::test]
    async fn test_payload_is_a_text_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("\"text\":"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(Client::new(), server.uri());
        assert!(notifier.notify(&summary()).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_status_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad payload"))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(Client::new(), server.uri());
        match notifier.notify(&summary()).await {
            Err(NotifyError::Rejected { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad payload");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_accepted_is_not_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(Client::new(), server.uri());
        assert!(notifier.notify(&summary()).await.is_err());
    }
}
