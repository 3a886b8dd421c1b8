// src/errors.rs
// =============================================================================
// Typed errors for every fallible boundary of the auditor.
//
// Two very different kinds of failure live here:
// - FetchError is a *finding*: a link we could not verify is reported as
//   broken, with the error text as the cause.
// - SinkError and NotifyError are *operational*: they are logged and the
//   run carries on.
// ConfigError is the only one that stops the program, and only at startup.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Why a network request produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("could not resolve hostname: {0}")]
    Dns(String),
    #[error("TLS certificate error: {0}")]
    Tls(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Sorts a reqwest error into one of our categories.
    ///
    /// reqwest exposes a few predicates (`is_timeout`, `is_redirect`,
    /// `is_connect`); DNS and TLS failures only show up in the message text.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let text = error.to_string();
        let chain = error_chain_text(error);

        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if chain.contains("dns") || chain.contains("failed to lookup address") {
            FetchError::Dns(text)
        } else if chain.contains("certificate") || chain.contains("tls") || chain.contains("ssl") {
            FetchError::Tls(text)
        } else if error.is_connect() {
            FetchError::Connect(text)
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(text)
        } else {
            FetchError::Other(text)
        }
    }
}

// reqwest keeps the interesting part (hyper / io / rustls) in the source chain
fn error_chain_text(error: &(dyn std::error::Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text.to_lowercase()
}

/// Failure to hand records to the reporting sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sink rejected the rows with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid sink endpoint {0}")]
    InvalidEndpoint(String),
    #[error("could not serialize records: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to deliver the run summary.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook answered HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(FetchError::Timeout.to_string(), "request timed out");
        assert_eq!(
            FetchError::Connect("refused".into()).to_string(),
            "connection failed: refused"
        );
    }

    #[test]
    fn test_rejected_sink_message_carries_status() {
        let err = SinkError::Rejected { status: 403, body: "denied".into() };
        assert_eq!(err.to_string(), "sink rejected the rows with HTTP 403: denied");
    }
}
