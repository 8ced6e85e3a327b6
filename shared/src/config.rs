//! Configuration management for Lambda functions.

use std::env;
use std::time::Duration;

use crate::{Error, Result};

/// Hard deadline for one call to the completion service.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Application configuration, built once at cold start and injected into the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Completion service API key
    pub api_key: Option<String>,
    /// ARN of a secret holding the API key, used when `api_key` is absent
    pub api_key_secret_arn: Option<String>,
    /// Why the API key could not be resolved at cold start
    pub api_key_error: Option<String>,
    /// Completion model name
    pub model: String,
    /// Base URL of the completion service
    pub api_base: String,
    /// Deadline for the upstream call
    pub request_timeout: Duration,
    /// Expose upstream error detail to callers
    pub development: bool,
    /// Attach the reply schema to the upstream request as a hint
    pub attach_response_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_secret_arn: None,
            api_key_error: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: UPSTREAM_TIMEOUT,
            development: false,
            attach_response_schema: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let development = matches!(
            env::var("APP_ENV").as_deref(),
            Ok("development") | Ok("dev")
        );
        let attach_response_schema = !matches!(
            env::var("GEMINI_RESPONSE_SCHEMA").as_deref(),
            Ok("false") | Ok("0")
        );

        Self {
            api_key: non_empty_var("GEMINI_API_KEY"),
            api_key_secret_arn: non_empty_var("GEMINI_API_KEY_SECRET_ARN"),
            api_key_error: None,
            model: non_empty_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: non_empty_var("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            request_timeout: UPSTREAM_TIMEOUT,
            development,
            attach_response_schema,
        }
    }

    /// The completion service credential, or a configuration error when absent.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::Config(
                self.api_key_error
                    .clone()
                    .unwrap_or_else(|| "GEMINI_API_KEY not set".to_string()),
            )
        })
    }

    /// Keep a cold-start credential failure so requests report the real cause.
    pub fn record_api_key_error(&mut self, error: &Error) {
        self.api_key = None;
        self.api_key_error = Some(format!("API key secret could not be resolved: {}", error));
    }

    /// Full URL of the `generateContent` method for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
