//! Shared library for the wellbeing companion Lambda functions.
//!
//! This crate provides configuration, error types, HTTP helpers and the chat
//! pipeline that turns a student's message into a UI-ready reply.

pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod http;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod secrets;
pub mod upstream;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{Escalation, FeelingLabel, StructuredReply};
pub use normalize::ChatRequest;
pub use pipeline::CompanionPipeline;
pub use secrets::{get_secret, resolve_api_key};
pub use upstream::{CompletionClient, UpstreamOutcome};
