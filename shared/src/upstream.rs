//! Completion service client.
//!
//! One attempt per call, bounded by the configured deadline. No retries.

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::prompt::GenerateContentRequest;
use crate::{Error, Result};

/// Message used when an error response carries no readable detail.
const GENERIC_UPSTREAM_ERROR: &str = "upstream request failed";

/// Upstream detail longer than this is cut in log lines.
const LOG_DETAIL_CHARS: usize = 200;

/// Result of a single call to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// 2xx with the raw response body
    Ok(String),
    /// Non-2xx status with the service's own message when it sent one
    HttpError { status: u16, message: String },
    /// No response before the deadline; the request was dropped
    Timeout,
    /// Any transport failure other than a timeout
    TransportFailure(String),
}

impl UpstreamOutcome {
    /// Raw body of a successful call, or the matching error.
    pub fn into_body(self) -> Result<String> {
        match self {
            UpstreamOutcome::Ok(body) => Ok(body),
            UpstreamOutcome::HttpError { status, message } => {
                Err(Error::UpstreamRejection { status, message })
            }
            UpstreamOutcome::Timeout => Err(Error::UpstreamTimeout),
            UpstreamOutcome::TransportFailure(message) => Err(Error::UpstreamTransport(message)),
        }
    }
}

/// `generateContent` response body. Only the fields the pipeline reads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Parse a successful response body.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| Error::UpstreamShape(format!("response is not a valid envelope: {}", e)))
    }

    /// Concatenated text of the first candidate, if it carries any string parts.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let texts: Vec<&str> = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(serde_json::Value::as_str))
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// Finish reason of the first candidate.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the completion service.
pub struct CompletionClient {
    http_client: reqwest::Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl CompletionClient {
    /// Create a new completion client.
    pub fn new(http_client: reqwest::Client, url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            http_client,
            url,
            api_key,
            timeout,
        }
    }

    /// Send the request once and classify the result.
    ///
    /// The whole exchange, body read included, runs under the deadline. On
    /// expiry the in-flight future is dropped, which aborts the connection.
    pub async fn invoke(&self, request: &GenerateContentRequest) -> UpstreamOutcome {
        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Completion request timed out");
                UpstreamOutcome::Timeout
            }
        }
    }

    async fn exchange(&self, request: &GenerateContentRequest) -> UpstreamOutcome {
        let response = match self
            .http_client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return transport_outcome(e),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return transport_outcome(e),
        };

        if !status.is_success() {
            let message = upstream_error_message(&body);
            warn!(
                status = status.as_u16(),
                message = %truncate_detail(&message),
                "Completion service rejected request"
            );
            return UpstreamOutcome::HttpError {
                status: status.as_u16(),
                message,
            };
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Completion service responded");
        UpstreamOutcome::Ok(body)
    }
}

fn transport_outcome(e: reqwest::Error) -> UpstreamOutcome {
    if e.is_timeout() {
        warn!("Completion transport timed out: {}", truncate_detail(&e.to_string()));
        UpstreamOutcome::Timeout
    } else {
        warn!("Completion transport failed: {}", truncate_detail(&e.to_string()));
        UpstreamOutcome::TransportFailure(e.to_string())
    }
}

/// Cut upstream detail to [`LOG_DETAIL_CHARS`] characters for logging.
fn truncate_detail(detail: &str) -> String {
    match detail.char_indices().nth(LOG_DETAIL_CHARS) {
        Some((cut, _)) => format!("{}...", &detail[..cut]),
        None => detail.to_string(),
    }
}

/// Extract `error.message` from an error body, else a generic placeholder.
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_UPSTREAM_ERROR.to_string())
}
