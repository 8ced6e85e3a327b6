//! Chat pipeline: normalize, assemble, invoke, gate, extract.
//!
//! Stateless per call. The only suspension point is the upstream request.

use serde_json::Value;
use tracing::{info, instrument};

use crate::extract::extract_reply;
use crate::gate;
use crate::normalize::ChatRequest;
use crate::prompt::{GenerateContentRequest, PERSONA_VERSION};
use crate::upstream::{CompletionClient, GenerateContentResponse};
use crate::{Config, Error, Result, StructuredReply};

/// Turns one inbound body into one [`StructuredReply`].
pub struct CompanionPipeline {
    config: Config,
    http_client: reqwest::Client,
}

impl CompanionPipeline {
    /// Create a pipeline from injected configuration and a shared HTTP client.
    pub fn new(config: Config, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline for one inbound JSON body.
    #[instrument(skip_all, fields(persona = PERSONA_VERSION))]
    pub async fn respond(&self, body: &Value) -> Result<StructuredReply> {
        let request = ChatRequest::from_body(body)?;
        let api_key = self.config.api_key()?;

        info!(chars = request.char_count(), "Processing chat request");

        let upstream_request = GenerateContentRequest::build(&request, &self.config);
        let client = CompletionClient::new(
            self.http_client.clone(),
            self.config.generate_url(),
            api_key.to_string(),
            self.config.request_timeout,
        );

        let raw = client.invoke(&upstream_request).await.into_body()?;
        let response = GenerateContentResponse::parse(&raw)?;

        if let Some(reason) = gate::block_reason(&response) {
            return Ok(gate::safety_reply(&reason));
        }

        let text = response
            .text()
            .ok_or_else(|| Error::UpstreamShape("candidate has no text part".to_string()))?;

        let reply = gate::finalize(extract_reply(&text));
        info!(
            escalation = %reply.escalation,
            feeling = %reply.feeling_label,
            crisis = reply.crisis_flag(),
            "Chat reply ready"
        );

        Ok(reply)
    }
}
